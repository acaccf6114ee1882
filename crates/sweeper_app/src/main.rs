mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use sweep_logging::{sweep_info, sweep_warn};
use sweeper_engine::{write_report, FetchSettings, ScanRequest, Scanner};
use tokio_util::sync::CancellationToken;

use crate::cli::{Args, ScanTarget};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    sweep_logging::initialize(level, args.log_file.as_deref());

    let target = ScanTarget::from_file_url(&args.url).map_err(anyhow::Error::msg)?;
    let count = args.num_files.min(target.start_id.saturating_sub(1));
    if count < args.num_files {
        sweep_warn!("Only {} IDs exist below {}; scanning those", count, target.start_id);
    }
    sweep_info!(
        "Scanning - start_id={}, count={}, workers={}",
        target.start_id,
        count,
        args.workers
    );

    let interrupt = CancellationToken::new();
    spawn_interrupt_listener(interrupt.clone());

    let request = ScanRequest {
        start_id: target.start_id,
        count,
        worker_count: usize::from(args.workers),
        base_url: target.base_url,
        session_credential: args.canvas_session,
    };
    let hits = Scanner::new(FetchSettings::default())
        .with_interrupt(interrupt)
        .scan(&request)
        .await
        .context("scan could not start")?;

    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
    let path = write_report(&args.output_dir, &hits, &timestamp)
        .with_context(|| format!("failed to write report to {:?}", args.output_dir))?;
    sweep_info!("Saved {} records -> {}", hits.len(), path.display());
    Ok(())
}

fn spawn_interrupt_listener(interrupt: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            sweep_warn!("Interrupted - partial results will be saved.");
            interrupt.cancel();
        }
    });
}
