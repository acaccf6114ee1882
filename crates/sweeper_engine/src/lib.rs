//! Sweeper engine: concurrent probing of sequential file IDs.
mod classify;
mod decode;
mod fetch;
mod ids;
mod observer;
mod persist;
mod probe;
mod scan;
mod types;

pub use classify::{
    Classifier, ClassifyError, FileMeta, HtmlLandingPage, JsonPayload, PayloadParser,
};
pub use decode::{decode_body, DecodedBody};
pub use fetch::{
    FetchReply, FetchSettings, Fetcher, RawResponse, ReqwestFetcher, DEFAULT_SESSION_COOKIE,
    DEFAULT_USER_AGENT,
};
pub use ids::id_stream;
pub use observer::{LogObserver, ScanObserver};
pub use persist::{
    ensure_output_dir, render_report, report_filename, write_report, AtomicFileWriter,
    PersistError,
};
pub use probe::probe;
pub use scan::{scan, ScanRequest, Scanner};
pub use types::{
    FailureKind, FileId, FileRecord, ProbeError, ProbeOutcome, ScanError, ScanEvent, ScanSummary,
    StopReason,
};
