//! Thin terminal shell over the session runtime.
//!
//! Reads one command per line, submits it as a turn, and renders the
//! structured payload: styled screen spans, scene art, a status line, and
//! the recommended actions. Session mechanics all live in `runtime`; this
//! binary is presentation only.
//!
//! Meta commands handled by the shell rather than the game: `:reset`,
//! `:export <file>`, `:import <file>`, `:quit`.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use tracing_subscriber::EnvFilter;

use client_bootstrap::SessionBuilder;
use game_core::ArtBody;
use runtime::{ArtSelection, Session, TextStyle, TurnPayload};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let setup = SessionBuilder::from_env()
        .build()
        .context("session setup failed")?;
    let mut session = setup.session;

    if let Some(notice) = &setup.notice {
        println!("[{notice}]");
    }
    if setup.restored {
        println!("[Resumed your saved game.]");
    }

    let payload = session.start().context("initial turn failed")?;
    render(&payload)?;

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(done) = handle_meta(&mut session, line)? {
            if done {
                break;
            }
            continue;
        }

        match session.submit_command(line) {
            Ok(payload) => {
                let game_over = payload.game_over;
                render(&payload)?;
                if game_over {
                    println!("[Game over. `:reset` starts a new game, `:quit` exits.]");
                }
            }
            Err(err) => {
                // No automatic retry: the turn was not committed.
                println!("[Command failed: {err}. Nothing was saved; try again.]");
            }
        }
    }

    Ok(())
}

/// Returns `Some(true)` to exit, `Some(false)` when a meta command was
/// handled, `None` for ordinary game commands.
fn handle_meta(session: &mut Session, line: &str) -> anyhow::Result<Option<bool>> {
    let (command, argument) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        ":quit" => Ok(Some(true)),
        ":reset" => {
            let payload = session.reset(rand::random()).context("reset failed")?;
            println!("[New game started.]");
            render(&payload)?;
            Ok(Some(false))
        }
        ":export" => {
            if argument.is_empty() {
                println!("[Usage: :export <file>]");
                return Ok(Some(false));
            }
            let document = session.export_snapshot();
            std::fs::write(argument, serde_json::to_string_pretty(&document)?)
                .with_context(|| format!("writing snapshot to {argument}"))?;
            println!("[Snapshot exported to {argument}.]");
            Ok(Some(false))
        }
        ":import" => {
            if argument.is_empty() {
                println!("[Usage: :import <file>]");
                return Ok(Some(false));
            }
            let text = std::fs::read_to_string(argument)
                .with_context(|| format!("reading snapshot from {argument}"))?;
            match session.import_snapshot_str(&text, rand::random()) {
                Ok(payload) => {
                    println!("[Snapshot imported.]");
                    render(&payload)?;
                }
                Err(err) => println!("[Import rejected ({}): {err}]", err.code()),
            }
            Ok(Some(false))
        }
        _ => Ok(None),
    }
}

fn render(payload: &TurnPayload) -> io::Result<()> {
    let mut out = io::stdout();

    render_art(&mut out, &payload.art)?;

    for span in &payload.screen_text.spans {
        match span.style {
            Some(style) => {
                crossterm::queue!(out, SetForegroundColor(terminal_color(style)))?;
                write!(out, "{}", span.text)?;
                crossterm::queue!(out, ResetColor)?;
            }
            None => write!(out, "{}", span.text)?,
        }
    }
    writeln!(out)?;

    let status = &payload.status_summary;
    writeln!(
        out,
        "[HP {}/{} | ATK {} | DEF {} | {} gold | {} sp]",
        status.hp, status.max_hp, status.attack, status.defense, status.gold, status.skill_points
    )?;

    if !payload.hints.is_empty() {
        writeln!(out, "Recommended:")?;
        for hint in &payload.hints {
            crossterm::queue!(out, SetForegroundColor(Color::Cyan))?;
            write!(out, "  {}", hint.command)?;
            crossterm::queue!(out, ResetColor)?;
            writeln!(out, " - {}", hint.reason)?;
        }
    }

    out.flush()
}

fn render_art(out: &mut impl Write, art: &ArtSelection) -> io::Result<()> {
    writeln!(out, "--[ {} ]--", art.title)?;
    match &art.body {
        ArtBody::Ascii(text) => writeln!(out, "{text}"),
        ArtBody::ImageRef(reference) => writeln!(out, "(image: {reference})"),
    }
}

fn terminal_color(style: TextStyle) -> Color {
    match style {
        TextStyle::Blue => Color::AnsiValue(39),
        TextStyle::Yellow => Color::Yellow,
        TextStyle::Orange => Color::AnsiValue(208),
        TextStyle::Red => Color::Red,
        TextStyle::Green => Color::Green,
        TextStyle::HealthGreen => Color::AnsiValue(82),
        TextStyle::ItemGreen => Color::AnsiValue(120),
        TextStyle::Purple => Color::Magenta,
        TextStyle::Pink => Color::AnsiValue(213),
    }
}
