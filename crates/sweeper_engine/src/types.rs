use std::fmt;

use serde::{Deserialize, Serialize};

pub type FileId = u64;

/// One file that resolved successfully during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub url: String,
    pub display_name: Option<String>,
    pub created_at: Option<String>,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Hit(FileRecord),
    Miss,
    Fatal(ProbeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every generated ID was probed.
    Exhausted,
    /// A probe failed and the cancellation signal was raised.
    Fatal,
    /// The caller interrupted the scan.
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Exhausted => write!(f, "exhausted"),
            StopReason::Fatal => write!(f, "fatal error"),
            StopReason::Interrupted => write!(f, "interrupted"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// Completions drained before the scan stopped.
    pub probed: u64,
    pub hits: u64,
    pub misses: u64,
    pub stop: StopReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Hit(FileRecord),
    Fatal { id: FileId, error: ProbeError },
    Finished(ScanSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeError {
    pub kind: FailureKind,
    pub message: String,
}

impl ProbeError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ProbeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnexpectedContentType { content_type: String },
    Parse,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnexpectedContentType { content_type } => {
                write!(f, "unexpected content type {content_type:?}")
            }
            FailureKind::Parse => write!(f, "parse error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Problems with the scan request itself; no probe is issued when one occurs.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("start id must be greater than zero")]
    ZeroStartId,
    #[error("worker count must be at least 1")]
    NoWorkers,
    #[error("cannot scan {count} ids below {start_id} without reaching zero")]
    RangeExhausted { start_id: FileId, count: u64 },
    #[error("session credential is not a valid header value")]
    InvalidCredential,
    #[error("failed to build http client: {0}")]
    Client(String),
}
