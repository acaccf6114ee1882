//! Scan coordinator: keeps a bounded set of probe tasks in flight, drains
//! them in completion order and stops early on the first fatal probe or on
//! caller interruption.

use std::sync::Arc;

use sweep_logging::{sweep_error, sweep_warn};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::classify::Classifier;
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::ids::id_stream;
use crate::observer::{LogObserver, ScanObserver};
use crate::probe::probe;
use crate::{FileId, FileRecord, ProbeOutcome, ScanError, ScanEvent, ScanSummary, StopReason};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Exclusive upper bound; the first probed ID is `start_id - 1`.
    pub start_id: FileId,
    pub count: u64,
    pub worker_count: usize,
    /// Collection address without a trailing slash, e.g. `https://host/files`.
    pub base_url: String,
    pub session_credential: String,
}

impl ScanRequest {
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.start_id == 0 {
            return Err(ScanError::ZeroStartId);
        }
        if self.worker_count == 0 {
            return Err(ScanError::NoWorkers);
        }
        if self.count >= self.start_id {
            return Err(ScanError::RangeExhausted {
                start_id: self.start_id,
                count: self.count,
            });
        }

        let invalid = |reason: &str| ScanError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: reason.to_string(),
        };
        let parsed = Url::parse(&self.base_url).map_err(|err| invalid(&err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
            return Err(invalid("expected an http(s) url with a host"));
        }
        if self.base_url.ends_with('/') {
            return Err(invalid("trailing slash"));
        }
        Ok(())
    }
}

pub struct Scanner {
    settings: FetchSettings,
    observer: Arc<dyn ScanObserver>,
    interrupt: CancellationToken,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(FetchSettings::default())
    }
}

impl Scanner {
    pub fn new(settings: FetchSettings) -> Self {
        Self {
            settings,
            observer: Arc::new(LogObserver),
            interrupt: CancellationToken::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Cancelling `interrupt` ends the scan with whatever was collected so far.
    pub fn with_interrupt(mut self, interrupt: CancellationToken) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Runs a scan with a fresh authenticated HTTP client.
    pub async fn scan(&self, request: &ScanRequest) -> Result<Vec<FileRecord>, ScanError> {
        request.validate()?;
        let fetcher = ReqwestFetcher::new(&self.settings, &request.session_credential)?;
        self.scan_with(Arc::new(fetcher), request).await
    }

    /// Runs a scan through an existing fetcher.
    pub async fn scan_with(
        &self,
        fetcher: Arc<dyn Fetcher>,
        request: &ScanRequest,
    ) -> Result<Vec<FileRecord>, ScanError> {
        request.validate()?;

        let cancel = CancellationToken::new();
        let classifier = Arc::new(Classifier::default());
        let base_url: Arc<str> = Arc::from(request.base_url.as_str());
        let mut ids = id_stream(request.start_id, request.count);
        let mut tasks: JoinSet<Option<ProbeOutcome>> = JoinSet::new();

        let mut spawn_next = |tasks: &mut JoinSet<Option<ProbeOutcome>>| -> bool {
            let Some(id) = ids.next() else {
                return false;
            };
            let fetcher = fetcher.clone();
            let classifier = classifier.clone();
            let cancel = cancel.clone();
            let observer = self.observer.clone();
            let base_url = base_url.clone();
            tasks.spawn(async move {
                probe(
                    id,
                    &base_url,
                    fetcher.as_ref(),
                    classifier.as_ref(),
                    &cancel,
                    observer.as_ref(),
                )
                .await
            });
            true
        };

        while tasks.len() < request.worker_count && spawn_next(&mut tasks) {}

        let mut records = Vec::new();
        let mut summary = ScanSummary {
            probed: 0,
            hits: 0,
            misses: 0,
            stop: StopReason::Exhausted,
        };

        let stop = loop {
            let joined = tokio::select! {
                biased;
                _ = self.interrupt.cancelled() => {
                    sweep_warn!("Scan interrupted; keeping {} partial results", records.len());
                    break StopReason::Interrupted;
                }
                joined = tasks.join_next() => joined,
            };
            let Some(joined) = joined else {
                break StopReason::Exhausted;
            };
            // The failing probe raises `cancel` before it completes, so this
            // also covers its own Fatal outcome; later hits are discarded.
            if cancel.is_cancelled() {
                break StopReason::Fatal;
            }
            summary.probed += 1;

            match joined {
                Ok(Some(ProbeOutcome::Hit(record))) => {
                    summary.hits += 1;
                    records.push(record);
                }
                Ok(Some(ProbeOutcome::Miss)) => summary.misses += 1,
                // Fatal outcomes are reported by the probe itself and raise
                // `cancel` first, so they end the loop above.
                Ok(Some(ProbeOutcome::Fatal(_))) | Ok(None) => {}
                Err(err) => {
                    sweep_error!("Probe task failed: {}", err);
                    cancel.cancel();
                    break StopReason::Fatal;
                }
            }

            spawn_next(&mut tasks);
        };
        summary.stop = stop;

        // Outstanding probes are abandoned; their results are discarded.
        tasks.shutdown().await;

        records.sort_by(|a, b| b.id.cmp(&a.id));
        self.observer.emit(ScanEvent::Finished(summary));
        Ok(records)
    }
}

/// Scans with default settings, logging through the global logger.
pub async fn scan(request: &ScanRequest) -> Result<Vec<FileRecord>, ScanError> {
    Scanner::default().scan(request).await
}
