use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use quake_common::observability::init_logging;
use quake_config::{QuakeConfig, QuakeConfigLoader};
use quake_core::{LoadOutcome, LoaderEvent, QuakeLoader};
use tokio::sync::broadcast::{self, error::RecvError};

mod cli;
mod report;

use cli::Cli;

const DEFAULT_CONFIG_FILE: &str = "quake.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins, flags win over both)
    let mut cfg = load_config(&cli)?;
    if cli.large {
        cfg.use_large = true;
    }
    if cli.log_stderr {
        cfg.log.stderr = true;
    }

    let log_path = init_logging("quake", &cfg.log)?;
    tracing::info!(log = %log_path.display(), "quake.start");

    // 2) Kick off the load and wait for the observer signal
    let loader = Arc::new(QuakeLoader::from_config(&cfg).context("building loader")?);
    let mut events = loader.subscribe();
    let mut task = loader.spawn_load();

    let waited = tokio::time::timeout(Duration::from_secs(cli.wait_secs), async {
        tokio::select! {
            loaded = wait_for_loaded(&mut events) => loaded,
            outcome = &mut task => matches!(outcome, Ok(LoadOutcome::Loaded { .. })),
        }
    })
    .await;

    if !matches!(waited, Ok(true)) {
        task.abort();
        bail!(
            "no earthquakes loaded from {} within {}s (see {})",
            loader.current_url(),
            cli.wait_secs,
            log_path.display()
        );
    }

    // 3) Render
    let earthquakes = loader.earthquakes().await;
    let stdout = std::io::stdout();
    let ansi = stdout.is_terminal();
    let mut out = stdout.lock();
    if cli.json {
        report::write_json(&mut out, &earthquakes)?;
    } else {
        report::write_table(&mut out, &earthquakes, ansi)?;
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<QuakeConfig> {
    let loader = match &cli.config {
        Some(path) => QuakeConfigLoader::new().with_file(path),
        None => QuakeConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    loader.load().context("loading configuration")
}

async fn wait_for_loaded(events: &mut broadcast::Receiver<LoaderEvent>) -> bool {
    loop {
        match events.recv().await {
            Ok(LoaderEvent::Loaded) => return true,
            Ok(LoaderEvent::Refreshing) => tracing::debug!("quake.refreshing"),
            Err(RecvError::Lagged(skipped)) => tracing::debug!(skipped, "quake.events.lagged"),
            Err(RecvError::Closed) => return false,
        }
    }
}
