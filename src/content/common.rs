//! Pieces shared by every kind of generated content

use thiserror::Error;

/// Errors that can occur while generating content
#[derive(Error, Debug)]
pub enum Error {
    /// The request could not be sent or its body could not be read
    #[error("request to the generation service failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-success status
    #[error("generation service answered with status {0}")]
    Status(u16),
    /// The answer did not contain the expected JSON
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The answer was well formed but lacked a required part
    #[error("response is missing the {0}")]
    MissingField(&'static str),
    /// Credentials or endpoint settings are missing or invalid
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}

impl From<garde::Report> for Error {
    fn from(report: garde::Report) -> Self {
        Self::Config(report.to_string())
    }
}

/// A single-turn text generation service
pub trait TextGenerator {
    /// Sends a prompt and returns the generated text
    ///
    /// # Errors
    ///
    /// Returns an error if the service could not be reached, refused the
    /// request or answered with something that carries no text.
    fn generate(&self, prompt: &str) -> Result<String, Error>;
}

fn between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (start < end).then(|| &text[start..=end])
}

/// Returns the span from the first `{` to the last `}`
///
/// Generated answers often wrap their JSON in prose or code fences.
pub fn extract_json_object(text: &str) -> Option<&str> {
    between(text, '{', '}')
}

/// Returns the span from the first `[` to the last `]`
pub fn extract_json_array(text: &str) -> Option<&str> {
    between(text, '[', ']')
}
