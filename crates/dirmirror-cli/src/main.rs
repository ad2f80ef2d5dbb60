//! dirmirror - periodic one-directional folder mirroring
//!
//! Synchronizes a target folder to mirror a source folder once per interval,
//! using content digests to decide what to copy and deleting target files
//! absent from the source. Every copy, delete, and failure is logged to the
//! console and appended to the configured log file.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use dirmirror_sync::SyncEngine;
use dirmirror_types::{Error, MirrorConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Periodic one-directional folder mirroring
#[derive(Parser)]
#[command(
    name = "dirmirror",
    version = env!("CARGO_PKG_VERSION"),
    about = "Periodic one-directional folder mirroring",
    long_about = "dirmirror keeps a target folder identical to a source folder.\n\
                  Once per interval it compares the two trees by content digest,\n\
                  copies new and changed files with verified, retrying copies,\n\
                  and deletes target files that no longer exist in the source."
)]
struct Cli {
    /// Source folder treated as ground truth
    source: PathBuf,

    /// Target folder rewritten to mirror the source
    target: PathBuf,

    /// Synchronization interval in whole seconds
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Log file receiving timestamped per-file entries
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&cli.log_file)?;

    let config = MirrorConfig::new(&cli.source, &cli.target);
    config
        .validate()
        .map_err(|message| anyhow::anyhow!(message))
        .context("invalid mirror configuration")?;

    println!(
        "{} folder synchronization from {} to {}",
        style("Starting").green().bold(),
        style(cli.source.display()).cyan(),
        style(cli.target.display()).cyan()
    );
    println!("Synchronization interval: {} seconds", cli.interval);
    println!("Log file: {}", cli.log_file.display());

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            signal_token.cancel();
        }
    });

    let engine = SyncEngine::new(config).with_cancellation(cancel.clone());
    run_scheduler(&engine, Duration::from_secs(cli.interval), &cancel).await;

    info!("dirmirror stopped");
    Ok(())
}

/// Run passes until cancelled, sleeping the interval between them
///
/// A pass-level error is logged and the loop continues; the next pass
/// retries naturally. Per-file failures are already recorded inside the
/// pass result and never surface here as errors.
async fn run_scheduler(engine: &SyncEngine, interval: Duration, cancel: &CancellationToken) {
    loop {
        match engine.run_pass().await {
            Ok(result) => {
                info!(
                    "Synchronization succeeded ({} copied, {} deleted, {} failure(s)). \
                     Next synchronization in {} seconds",
                    result.files_copied,
                    result.files_deleted,
                    result.failures.len(),
                    interval.as_secs()
                );
            }
            Err(Error::Cancelled) => break,
            Err(e) => error!("Synchronization error: {}", e),
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = cancel.cancelled() => break,
        }
    }
}

/// Initialize console and append-only file logging
///
/// The returned guard must stay alive for the duration of the process so
/// buffered log lines are flushed on shutdown.
fn init_logging(log_file: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    if let Some(parent) = log_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create log directory '{}'", parent.display()))?;
        }
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file '{}'", log_file.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .expect("static filter directive is valid");

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_target(false).with_ansi(false).with_writer(writer))
        .init();

    Ok(guard)
}
