//! Helpers for constructing the oracle bundle consumed by the runtime.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use game_content::{ContentBundle, ContentFactory};
use runtime::OracleManager;

/// Build oracles from a data directory, or from the content compiled into
/// `game-content` when no directory is given.
pub fn build_oracles(data_dir: Option<&Path>) -> anyhow::Result<Arc<OracleManager>> {
    let bundle = match data_dir {
        Some(dir) => {
            anyhow::ensure!(
                dir.exists(),
                "content data directory not found: {} (unset CONTENT_DATA_DIR to use built-in content)",
                dir.display()
            );
            ContentFactory::new(dir)
                .load_all()
                .with_context(|| format!("loading content from {}", dir.display()))?
        }
        None => ContentBundle::builtin().context("parsing built-in content")?,
    };

    Ok(Arc::new(OracleManager::from_bundle(bundle)))
}
