//! Basis quoting bot entry point.
//!
//! The live venue session layer is an external component; this binary wires
//! the decision core either to it (when linked in) or to a JSONL capture of
//! exchange events for offline replay.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use basis_bot::{AppConfig, Application};
use basis_core::{ExchangeCommand, ExchangeEvent};

/// Basis quoting bot.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via BASIS_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Replay a JSONL capture of exchange events instead of trading live
    #[arg(long)]
    replay: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    basis_bot::logging::init_logging();

    let args = Args::parse();

    info!("Starting basis bot v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    let Some(replay_path) = args.replay else {
        bail!("no live venue transport is linked into this build; use --replay <events.jsonl>");
    };

    let (event_tx, event_rx) = mpsc::channel::<ExchangeEvent>(1024);
    let (command_tx, mut command_rx) = mpsc::channel::<ExchangeCommand>(1024);

    // Feed captured events through the session at full speed.
    let feeder = tokio::spawn(async move {
        let file = tokio::fs::File::open(&replay_path)
            .await
            .with_context(|| format!("opening {}", replay_path.display()))?;
        let mut lines = BufReader::new(file).lines();
        let mut count = 0u64;
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let event: ExchangeEvent =
                serde_json::from_str(&line).with_context(|| format!("parsing event: {line}"))?;
            if event_tx.send(event).await.is_err() {
                warn!("session stopped before replay finished");
                break;
            }
            count += 1;
        }
        info!(events = count, "replay feed complete");
        Ok::<_, anyhow::Error>(())
    });

    let sink = tokio::spawn(async move {
        while let Some(command) = command_rx.recv().await {
            info!(?command, "outbound");
        }
    });

    Application::new(config).run(event_rx, command_tx).await?;

    feeder.await??;
    sink.await?;
    Ok(())
}
