use tokio_util::sync::CancellationToken;
use url::Url;

use crate::classify::{Classifier, FileMeta};
use crate::decode::decode_body;
use crate::fetch::{FetchReply, Fetcher};
use crate::observer::ScanObserver;
use crate::{FailureKind, FileId, FileRecord, ProbeError, ProbeOutcome, ScanEvent};

/// Probes one candidate ID.
///
/// Returns `None` without touching the network when `cancel` is already set.
/// Any failure other than 404 raises `cancel` before it is returned.
pub async fn probe(
    id: FileId,
    base_url: &str,
    fetcher: &dyn Fetcher,
    classifier: &Classifier,
    cancel: &CancellationToken,
    observer: &dyn ScanObserver,
) -> Option<ProbeOutcome> {
    if cancel.is_cancelled() {
        return None;
    }

    let url = format!("{base_url}/{id}");
    let outcome = match resolve(&url, fetcher, classifier).await {
        Ok(Some(meta)) => {
            let record = FileRecord {
                id,
                url,
                display_name: meta.display_name,
                created_at: meta.created_at,
                download_url: meta.download_url,
            };
            observer.emit(ScanEvent::Hit(record.clone()));
            ProbeOutcome::Hit(record)
        }
        Ok(None) => ProbeOutcome::Miss,
        Err(error) => {
            cancel.cancel();
            observer.emit(ScanEvent::Fatal {
                id,
                error: error.clone(),
            });
            ProbeOutcome::Fatal(error)
        }
    };
    Some(outcome)
}

async fn resolve(
    url: &str,
    fetcher: &dyn Fetcher,
    classifier: &Classifier,
) -> Result<Option<FileMeta>, ProbeError> {
    let target =
        Url::parse(url).map_err(|err| ProbeError::new(FailureKind::InvalidUrl, err.to_string()))?;

    let response = match fetcher.fetch(&target).await? {
        FetchReply::NotFound => return Ok(None),
        FetchReply::Found(response) => response,
    };

    let content_type = response.content_type.as_deref();
    let body = decode_body(&response.bytes, content_type);
    let meta = classifier.classify(content_type, &body.text, &response.final_url)?;
    Ok(Some(meta))
}
