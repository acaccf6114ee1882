use crate::FileId;

/// Candidate IDs below `start` (exclusive), highest first, `count` of them.
///
/// Yields exactly `count` IDs unless that would reach 0: when `count >= start`
/// the stream ends after 1. `ScanRequest::validate` rejects such ranges.
pub fn id_stream(start: FileId, count: u64) -> impl Iterator<Item = FileId> + Clone {
    let floor = start.saturating_sub(count).max(1);
    (floor..start).rev()
}
