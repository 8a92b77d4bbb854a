//! Scene art catalog loader.

use std::path::Path;

use game_core::{ArtAsset, ArtBody, ArtKey};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// One keyed scene entry as written in RON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneEntry {
    pub key: ArtKey,
    pub title: String,
    pub body: ArtBody,
}

/// Scene art catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneCatalog {
    pub scenes: Vec<SceneEntry>,
}

/// Loader for the scene art catalog.
pub struct ArtLoader;

impl ArtLoader {
    pub fn parse(content: &str) -> LoadResult<Vec<(ArtKey, ArtAsset)>> {
        let catalog: SceneCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scene art RON: {}", e))?;

        Ok(catalog
            .scenes
            .into_iter()
            .map(|entry| {
                // Art blocks are written as raw strings with framing newlines;
                // trim so placeholders and assets render alike.
                let body = match entry.body {
                    ArtBody::Ascii(text) => {
                        ArtBody::Ascii(text.trim_matches('\n').to_string())
                    }
                    other => other,
                };
                (
                    entry.key,
                    ArtAsset {
                        title: entry.title,
                        body,
                    },
                )
            })
            .collect())
    }

    pub fn load(path: &Path) -> LoadResult<Vec<(ArtKey, ArtAsset)>> {
        Self::parse(&read_file(path)?)
    }
}
