//! Turns one successful response into file metadata.
//!
//! The host answers with a JSON description for some sessions and with an
//! HTML landing page for others; both mean the file exists.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::{FailureKind, ProbeError};

const DOWNLOAD_SUFFIX: &str = "/download?download_frd=1";

static DOWNLOAD_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Download (.*?)</a>").expect("valid label pattern"));
static FILE_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a href="([^"]*?/files/\d+)"#).expect("valid href pattern"));

/// Metadata extracted from a response, before it is tied to a file ID.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FileMeta {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "url")]
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("unexpected content type: {0:?}")]
    UnexpectedContentType(String),
    #[error("invalid json payload: {0}")]
    Json(String),
    #[error("unable to parse html response: {0}")]
    Html(&'static str),
}

impl From<ClassifyError> for ProbeError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::UnexpectedContentType(content_type) => ProbeError::new(
                FailureKind::UnexpectedContentType { content_type },
                String::new(),
            ),
            other => ProbeError::new(FailureKind::Parse, other.to_string()),
        }
    }
}

/// One strategy for reading file metadata out of a response body.
pub trait PayloadParser: Send + Sync {
    fn accepts(&self, content_type: &str) -> bool;
    fn parse(&self, body: &str, final_url: &Url) -> Result<FileMeta, ClassifyError>;
}

/// Structured description returned by the files API.
#[derive(Debug, Default)]
pub struct JsonPayload;

impl PayloadParser for JsonPayload {
    fn accepts(&self, content_type: &str) -> bool {
        content_type.contains("application/json")
    }

    fn parse(&self, body: &str, _final_url: &Url) -> Result<FileMeta, ClassifyError> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|err| ClassifyError::Json(err.to_string()))?;
        if !value.is_object() {
            return Err(ClassifyError::Json("expected a json object".to_string()));
        }
        serde_json::from_value(value).map_err(|err| ClassifyError::Json(err.to_string()))
    }
}

/// Rendered file landing page with a "Download <name>" link.
#[derive(Debug, Default)]
pub struct HtmlLandingPage;

impl PayloadParser for HtmlLandingPage {
    fn accepts(&self, content_type: &str) -> bool {
        content_type.contains("text/html")
    }

    fn parse(&self, body: &str, final_url: &Url) -> Result<FileMeta, ClassifyError> {
        let name = DOWNLOAD_LABEL
            .captures(body)
            .and_then(|caps| caps.get(1))
            .ok_or(ClassifyError::Html("download label not found"))?;
        let href = FILE_HREF
            .captures(body)
            .and_then(|caps| caps.get(1))
            .ok_or(ClassifyError::Html("file link not found"))?;

        // Absolute hrefs only contribute their path; the host is always the
        // one that served the page.
        let file_path = final_url
            .join(href.as_str())
            .map(|resolved| resolved.path().to_string())
            .map_err(|_| ClassifyError::Html("file link is not a valid url"))?;

        Ok(FileMeta {
            display_name: Some(name.as_str().to_string()),
            created_at: Some(String::new()),
            download_url: Some(format!(
                "{}{}{}",
                final_url.origin().ascii_serialization(),
                file_path,
                DOWNLOAD_SUFFIX
            )),
        })
    }
}

/// Picks the parser matching the declared content type.
pub struct Classifier {
    parsers: Vec<Box<dyn PayloadParser>>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            parsers: vec![Box::new(JsonPayload), Box::new(HtmlLandingPage)],
        }
    }
}

impl Classifier {
    pub fn classify(
        &self,
        content_type: Option<&str>,
        body: &str,
        final_url: &Url,
    ) -> Result<FileMeta, ClassifyError> {
        let content_type = content_type.unwrap_or_default();
        let parser = self
            .parsers
            .iter()
            .find(|parser| parser.accepts(content_type))
            .ok_or_else(|| ClassifyError::UnexpectedContentType(content_type.to_string()))?;
        parser.parse(body, final_url)
    }
}
