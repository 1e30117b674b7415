//! YouTube transcripts
//!
//! Transcripts are fetched as plain text from a third-party transcript API
//! and then fed to the study material generators like any other text.

use std::{fmt, sync::LazyLock, time::Duration};

use garde::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    REDACTED,
    youtube::{API_KEY_VAR, DEFAULT_VIDEO_TITLE, TIMEOUT_SECONDS, TRANSCRIPT_ENDPOINT},
};

static WATCH_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([\w-]+)")
        .expect("valid watch url pattern")
});

static SHORT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?youtu\.be/([\w-]+)").expect("valid short url pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Errors that can occur when fetching a transcript
#[derive(Error, Debug)]
pub enum Error {
    /// The link is not a recognized video link
    #[error("not a YouTube video link")]
    InvalidUrl,
    /// The request could not be sent or its body could not be read
    #[error("transcript request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The transcript API answered with a non-success status
    #[error("transcript API answered with status {0}")]
    Status(u16),
    /// The answer was not JSON
    #[error("malformed transcript response: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Credentials are missing or invalid
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<garde::Report> for Error {
    fn from(report: garde::Report) -> Self {
        Self::Config(report.to_string())
    }
}

/// Pulls the video id out of a `youtube.com/watch?v=` or `youtu.be/` link
///
/// # Errors
///
/// Returns `Error::InvalidUrl` for anything else.
pub fn extract_video_id(url: &str) -> Result<&str, Error> {
    WATCH_URL
        .captures(url)
        .or_else(|| SHORT_URL.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
        .ok_or(Error::InvalidUrl)
}

/// Plain-text transcript of a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    /// Transcript text with whitespace collapsed
    pub text: String,
    /// Id of the video
    pub video_id: String,
    /// Title of the video
    pub video_title: String,
}

#[derive(Deserialize)]
struct Segment {
    #[serde(default)]
    text: String,
}

impl Transcript {
    /// Builds a transcript from the transcript API's answer
    ///
    /// The text is taken from `content` if it is a string, else from
    /// `transcript`, else from the `segments` texts joined by spaces. If
    /// none is present the whole answer is used as text.
    pub fn from_response(response: &serde_json::Value, video_id: &str) -> Self {
        let text = if let Some(content) = response.get("content").and_then(|c| c.as_str()) {
            content.to_owned()
        } else if let Some(transcript) = response.get("transcript").filter(|t| is_truthy(t)) {
            transcript
                .as_str()
                .map_or_else(|| transcript.to_string(), str::to_owned)
        } else if let Some(segments) = response
            .get("segments")
            .and_then(|s| serde_json::from_value::<Vec<Segment>>(s.clone()).ok())
        {
            segments
                .into_iter()
                .map(|s| s.text)
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            response.to_string()
        };

        let video_title = response
            .get("title")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_VIDEO_TITLE);

        Self {
            text: WHITESPACE.replace_all(&text, " ").trim().to_owned(),
            video_id: video_id.to_owned(),
            video_title: video_title.to_owned(),
        }
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.),
        _ => true,
    }
}

fn default_endpoint() -> String {
    TRANSCRIPT_ENDPOINT.to_owned()
}

fn default_timeout() -> u64 {
    TIMEOUT_SECONDS
}

/// Connection settings for the transcript API
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Key sent in the `x-api-key` header
    #[garde(length(min = 1))]
    pub api_key: String,
    /// Transcript endpoint
    #[garde(url)]
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds
    #[garde(range(min = 1, max = 600))]
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Config {
    /// Settings for the default endpoint with the given key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout(),
        }
    }

    /// Reads the key from `SUPADATA_API_KEY`
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the key is missing or empty.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| Error::Config(format!("{API_KEY_VAR} is not set")))?;
        let config = Self::new(api_key);
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &REDACTED)
            .field("endpoint", &self.endpoint)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// A blocking client for the transcript API
#[derive(Debug, Clone)]
pub struct TranscriptClient {
    client: reqwest::blocking::Client,
    config: Config,
}

impl TranscriptClient {
    /// Builds a client from validated settings
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for invalid settings, or `Error::Transport`
    /// if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetches the plain-text transcript of the video behind `url`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` before any request is made if the link is
    /// not a video link, and otherwise any transport or status error.
    pub fn fetch(&self, url: &str) -> Result<Transcript, Error> {
        let video_id = extract_video_id(url)?;
        tracing::info!(video_id, "fetching transcript");

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[("videoId", video_id), ("text", "true")])
            .header("x-api-key", &self.config.api_key)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(video_id, status = status.as_u16(), "transcript request refused");
            return Err(Error::Status(status.as_u16()));
        }
        let body: serde_json::Value = serde_json::from_str(&response.text()?)?;
        Ok(Transcript::from_response(&body, video_id))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_extract_video_id() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtube.com/watch?v=dQw4w9WgXcQ&t=42",
            "youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "youtu.be/dQw4w9WgXcQ?si=share",
        ] {
            assert_eq!(extract_video_id(url).unwrap(), "dQw4w9WgXcQ", "url: {url}");
        }
    }

    #[test]
    fn test_extract_video_id_invalid() {
        for url in ["", "https://vimeo.com/123", "https://youtube.com/channel/abc"] {
            assert!(matches!(extract_video_id(url), Err(Error::InvalidUrl)), "url: {url}");
        }
    }

    #[test]
    fn test_transcript_prefers_content() {
        let response = json!({
            "content": "  Hello\n\n  world ",
            "transcript": "ignored",
            "title": "Greetings",
        });
        let transcript = Transcript::from_response(&response, "abc");

        assert_eq!(transcript.text, "Hello world");
        assert_eq!(transcript.video_id, "abc");
        assert_eq!(transcript.video_title, "Greetings");
    }

    #[test]
    fn test_transcript_falls_back_to_transcript_field() {
        let transcript = Transcript::from_response(&json!({ "transcript": "Some  text" }), "abc");
        assert_eq!(transcript.text, "Some text");
        assert_eq!(transcript.video_title, DEFAULT_VIDEO_TITLE);
    }

    #[test]
    fn test_transcript_joins_segments() {
        let response = json!({
            "segments": [{ "text": "one" }, { "text": "two", "offset": 1 }, {}],
        });
        assert_eq!(Transcript::from_response(&response, "abc").text, "one two");
    }

    #[test]
    fn test_transcript_uses_raw_response_last() {
        let response = json!({ "unexpected": true });
        assert_eq!(
            Transcript::from_response(&response, "abc").text,
            r#"{"unexpected":true}"#
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::new("key").validate().is_ok());
        assert!(matches!(
            TranscriptClient::new(Config::new("")),
            Err(Error::Config(_))
        ));

        let mut config = Config::new("key");
        config.timeout_seconds = 0;
        assert!(matches!(TranscriptClient::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = serde_json::from_str(r#"{"api_key": "key"}"#).unwrap();
        assert_eq!(config.endpoint, TRANSCRIPT_ENDPOINT);
        assert_eq!(config.timeout_seconds, TIMEOUT_SECONDS);

        let config: Config =
            serde_json::from_str(r#"{"api_key": "key", "timeout_seconds": 5}"#).unwrap();
        assert_eq!(config.timeout_seconds, 5);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = Config::new("top-secret-key");
        assert!(!format!("{config:?}").contains("top-secret-key"));

        let client = TranscriptClient::new(config).unwrap();
        let printed = format!("{client:?}");
        assert!(!printed.contains("top-secret-key"));
        assert!(printed.contains(REDACTED));
    }
}
