//! Client for the Gemini `generateContent` API

use std::{fmt, time::Duration};

use garde::Validate;
use serde::{Deserialize, Serialize};

use super::common::{Error, TextGenerator};
use crate::constants::{
    REDACTED,
    gemini::{API_KEY_VAR, DEFAULT_ENDPOINT, ENDPOINT_VAR, TIMEOUT_SECONDS},
};

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_owned()
}

fn default_timeout() -> u64 {
    TIMEOUT_SECONDS
}

/// Connection settings for the generation API
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// API key sent as the `key` query parameter
    #[garde(length(min = 1))]
    pub api_key: String,
    /// Full URL of the `generateContent` endpoint
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

    /// Reads settings from `GEMINI_API_KEY` and, optionally, `GEMINI_API_URL`
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the key is missing or a setting is invalid.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| Error::Config(format!("{API_KEY_VAR} is not set")))?;
        let mut config = Self::new(api_key);
        if let Ok(endpoint) = std::env::var(ENDPOINT_VAR) {
            config.endpoint = endpoint;
        }
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

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Request<'a> {
    contents: [Content<'a>; 1],
}

impl<'a> Request<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        }
    }
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Picks the generated text out of a `generateContent` response body
///
/// # Errors
///
/// Returns `Error::Malformed` if the body is not a response object, or
/// `Error::MissingField` if it holds no candidate text.
pub fn parse_response(body: &str) -> Result<String, Error> {
    let response: Response = serde_json::from_str(body)?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or(Error::MissingField("candidate text"))
}

/// A blocking client for the generation API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    config: Config,
}

impl GeminiClient {
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

    /// The settings the client was built with
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, Error> {
        tracing::debug!(
            endpoint = %self.config.endpoint,
            prompt_len = prompt.len(),
            "requesting generation"
        );
        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", &self.config.api_key)])
            .json(&Request::new(prompt))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "generation request refused");
            return Err(Error::Status(status.as_u16()));
        }
        parse_response(&response.text()?)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(Request::new("hello")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "contents": [{ "parts": [{ "text": "hello" }] }] })
        );
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "generated" }, { "text": "ignored" }] }
            }]
        }"#;
        assert_eq!(parse_response(body).unwrap(), "generated");
    }

    #[test]
    fn test_parse_response_without_candidates() {
        assert!(matches!(
            parse_response(r#"{"candidates": []}"#),
            Err(Error::MissingField(_))
        ));
        assert!(matches!(
            parse_response(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#),
            Err(Error::MissingField(_))
        ));
        assert!(matches!(
            parse_response("not json"),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = serde_json::from_str(r#"{"api_key": "secret"}"#).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_seconds, TIMEOUT_SECONDS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::new("").validate().is_err());

        let mut config = Config::new("secret");
        config.endpoint = "not a url".to_owned();
        assert!(config.validate().is_err());

        let mut config = Config::new("secret");
        config.timeout_seconds = 0;
        assert!(matches!(GeminiClient::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = Config::new("top-secret-key");
        let printed = format!("{config:?}");
        assert!(!printed.contains("top-secret-key"));
        assert!(printed.contains(REDACTED));
        assert!(printed.contains(DEFAULT_ENDPOINT));

        let client = GeminiClient::new(config).unwrap();
        assert!(!format!("{client:?}").contains("top-secret-key"));
    }
}
