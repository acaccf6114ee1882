use sweep_logging::{sweep_error, sweep_info};

use crate::{FailureKind, ScanEvent};

/// Receives scan events as they happen; called from worker tasks.
pub trait ScanObserver: Send + Sync {
    fn emit(&self, event: ScanEvent);
}

/// Writes every event to the global logger.
#[derive(Debug, Default)]
pub struct LogObserver;

impl ScanObserver for LogObserver {
    fn emit(&self, event: ScanEvent) {
        match event {
            ScanEvent::Hit(record) => sweep_info!("FOUND: {}", record.url),
            ScanEvent::Fatal { id, error } => match error.kind {
                FailureKind::HttpStatus(code) => sweep_error!("HTTP {} for file-ID {}", code, id),
                _ => sweep_error!("Unexpected error for file-ID {} -> {}", id, error),
            },
            ScanEvent::Finished(summary) => sweep_info!(
                "Scan stopped ({}): probed={} hits={} misses={}",
                summary.stop,
                summary.probed,
                summary.hits,
                summary.misses
            ),
        }
    }
}
