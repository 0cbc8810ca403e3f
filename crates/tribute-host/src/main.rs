//! Terminal host for the tribute page.
//!
//! Stands in for the rendering layer: it mounts one view, turns stdin
//! lines into interaction events and music toggles, and prints the page
//! as it changes. Logs go to stderr so stdout carries only the page.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `TRIBUTE_CONFIG` or `tribute-config.yaml`
//! 2. Initialize structured logging (tracing) at the configured level
//! 3. Mount the view against the system clock and a silent audio backend
//! 4. Start the snapshot presenter
//! 5. Read commands until `quit`, EOF, or Ctrl-C
//! 6. Tear the view down

mod error;
mod input;
mod presenter;

use std::ffi::OsString;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tribute_core::config::TributeConfig;
use tribute_core::music::SilentBackend;
use tribute_core::time_source::{SystemTimeSource, TimeSource};
use tribute_core::view::{InteractionOutcome, ViewContext};

use crate::error::HostError;
use crate::input::Command;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "TRIBUTE_CONFIG";

/// Config file looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "tribute-config.yaml";

/// Application entry point for the terminal host.
///
/// # Errors
///
/// Returns an error if configuration, mounting, or stdio fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("tribute-host starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }

    // 3. Mount the view.
    let time: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
    let view = ViewContext::mount(&config, &SilentBackend::new(), time)
        .await
        .map_err(HostError::from)?;

    // 4. Start the presenter and show the first page.
    let presenter = presenter::spawn(view.subscribe(), view.content().clone());
    print_text(&presenter::render(view.content(), &view.snapshot()))?;

    // 5. Read commands.
    let result = run(&view).await;

    // 6. Tear down.
    presenter.abort();
    view.teardown().await;
    info!("tribute-host shutdown complete");

    result?;
    Ok(())
}

/// Read stdin commands until `quit`, EOF, or Ctrl-C.
async fn run(view: &ViewContext) -> Result<(), HostError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received");
                return Ok(());
            }
        };
        let Some(line) = line else {
            info!("stdin closed");
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match input::parse_command(line) {
            Ok(Command::Quit) => return Ok(()),
            Ok(command) => execute(view, &command).await?,
            Err(e) => {
                warn!(error = %e, line, "ignoring command");
                print_text(&format!("? {e}\n"))?;
            }
        }
    }
}

/// Apply one parsed command to the view.
async fn execute(view: &ViewContext, command: &Command) -> Result<(), HostError> {
    if let Some(event) = command.interaction() {
        if view.record_interaction(&event).await == InteractionOutcome::Ignored {
            info!("interaction ignored");
        }
        return Ok(());
    }

    match command {
        Command::Music => {
            if let Err(e) = view.toggle_music().await {
                warn!(error = %e, "music toggle failed");
                print_text(&format!("? {e}\n"))?;
            }
        }
        Command::Status => print_text(&presenter::render(view.content(), &view.snapshot()))?,
        Command::Json => {
            let json = serde_json::to_string_pretty(&view.snapshot())?;
            print_text(&format!("{json}\n"))?;
        }
        Command::Tap(_) | Command::Touch(_) | Command::Quit => {}
    }
    Ok(())
}

/// Load configuration from the file named by `TRIBUTE_CONFIG`, falling back
/// to `tribute-config.yaml` in the working directory.
fn load_config() -> Result<(TributeConfig, Option<PathBuf>), HostError> {
    resolve_config(std::env::var_os(CONFIG_ENV), Path::new(DEFAULT_CONFIG_PATH))
}

/// Pick the config source: `env_path` if set (the file must exist), else
/// `fallback` if present, else defaults. Returns the path that was read.
fn resolve_config(
    env_path: Option<OsString>,
    fallback: &Path,
) -> Result<(TributeConfig, Option<PathBuf>), HostError> {
    if let Some(path) = env_path.map(PathBuf::from) {
        let config = TributeConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }
    if fallback.exists() {
        let config = TributeConfig::from_file(fallback)?;
        Ok((config, Some(fallback.to_path_buf())))
    } else {
        Ok((TributeConfig::default(), None))
    }
}

fn print_text(text: &str) -> Result<(), HostError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
