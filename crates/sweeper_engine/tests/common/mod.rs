#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sweeper_engine::{FetchReply, Fetcher, ProbeError, RawResponse, ScanEvent, ScanObserver};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SESSION: &str = "test-session";

#[derive(Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<ScanEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<ScanEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ScanObserver for RecordingObserver {
    fn emit(&self, event: ScanEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// In-memory host keyed by the last path segment; unknown IDs are 404.
#[derive(Default)]
pub struct FakeFetcher {
    replies: HashMap<u64, Result<FetchReply, ProbeError>>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, id: u64, name: &str) -> Self {
        let final_url = Url::parse(&format!("https://h/files/{id}")).unwrap();
        let body = format!(
            r#"{{"display_name":"{name}","created_at":"2024-01-01T00:00:00Z","url":"https://h/files/{id}/download?download_frd=1"}}"#
        );
        self.replies.insert(
            id,
            Ok(FetchReply::Found(RawResponse {
                final_url,
                content_type: Some("application/json".to_string()),
                bytes: body.into_bytes(),
            })),
        );
        self
    }

    pub fn with_error(mut self, id: u64, error: ProbeError) -> Self {
        self.replies.insert(id, Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchReply, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let id = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|last| last.parse::<u64>().ok())
            .unwrap_or_default();
        self.replies
            .get(&id)
            .cloned()
            .unwrap_or(Ok(FetchReply::NotFound))
    }
}

pub fn json_hit(id: u64, name: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            r#"{{"display_name":"{name}","created_at":"2024-03-0{}T10:00:00Z","url":"https://h/files/{id}/download?download_frd=1"}}"#,
            id % 9 + 1
        ),
        "application/json",
    )
}

pub fn html_hit(id: u64, name: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            r#"<html><body><h2>{name}</h2><a href="/courses/3/files/{id}/download?wrap=1">Download {name}</a></body></html>"#
        ),
        "text/html; charset=utf-8",
    )
}

/// Mounts `template` for `/files/{id}`, requiring the session cookie.
pub async fn mount_file(server: &MockServer, id: u64, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/files/{id}")))
        .and(header("cookie", format!("canvas_session={SESSION}").as_str()))
        .respond_with(template)
        .mount(server)
        .await;
}
