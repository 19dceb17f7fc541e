//! Remote data fetching: dataset CSV, README document and raw downloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("population-dashboard/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid README payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to decode README content: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("README is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Unsupported README encoding: {0}")]
    Encoding(String),
    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

/// GitHub contents API response for a single file.
#[derive(Debug, Deserialize)]
struct ContentsPayload {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Blocking HTTP client for static resources.
#[derive(Clone)]
pub struct RemoteSource {
    client: Client,
}

impl RemoteSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!(url, "GET");
        let resp = self.client.get(url).send()?.error_for_status()?;
        let bytes = resp.bytes()?;
        info!(url, bytes = bytes.len(), "fetched");
        Ok(bytes.to_vec())
    }

    pub fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let bytes = self.fetch_bytes(url)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Fetch the README, either from the GitHub contents API or as raw markdown.
    pub fn fetch_readme(&self, url: &str) -> Result<String, FetchError> {
        let body = self.fetch_text(url)?;
        decode_readme(&body)
    }

    /// Fetch `url` and write the body to `path`. Returns the number of bytes written.
    pub fn download_to(&self, url: &str, path: &std::path::Path) -> Result<usize, FetchError> {
        let bytes = self.fetch_bytes(url)?;
        std::fs::write(path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "download saved");
        Ok(bytes.len())
    }
}

/// Decode a README body. JSON objects are read as contents API payloads,
/// anything else is returned unchanged.
pub fn decode_readme(body: &str) -> Result<String, FetchError> {
    if !body.trim_start().starts_with('{') {
        return Ok(body.to_string());
    }

    let payload: ContentsPayload = serde_json::from_str(body)?;
    match payload.encoding.as_deref() {
        Some("base64") => {
            // The API wraps base64 content at 60 columns
            let compact: String = payload
                .content
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            let decoded = STANDARD.decode(compact)?;
            Ok(String::from_utf8(decoded)?)
        }
        None | Some("") | Some("utf-8") => Ok(payload.content),
        Some(other) => Err(FetchError::Encoding(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_contents_payload() {
        let encoded = STANDARD.encode("# City population\n\nData for 2022.\n");
        let (head, tail) = encoded.split_at(10);
        let body = format!(
            r#"{{"name":"README.md","content":"{}\n{}\n","encoding":"base64"}}"#,
            head, tail
        );
        assert_eq!(
            decode_readme(&body).unwrap(),
            "# City population\n\nData for 2022.\n"
        );
    }

    #[test]
    fn test_decode_raw_markdown() {
        let body = "# Title\n\nplain text";
        assert_eq!(decode_readme(body).unwrap(), body);
    }

    #[test]
    fn test_decode_rejects_unknown_encoding() {
        let body = r#"{"content":"abc","encoding":"rot13"}"#;
        assert!(matches!(
            decode_readme(body).unwrap_err(),
            FetchError::Encoding(e) if e == "rot13"
        ));
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let body = r#"{"content":"not base64!!","encoding":"base64"}"#;
        assert!(matches!(
            decode_readme(body).unwrap_err(),
            FetchError::Base64(_)
        ));
    }

    #[test]
    fn test_decode_rejects_bad_json() {
        assert!(matches!(
            decode_readme("{ not json").unwrap_err(),
            FetchError::Json(_)
        ));
    }
}
