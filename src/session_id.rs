//! Quiz session identifiers
//!
//! Session identifiers are issued by the external session store and are
//! opaque to this library. They appear in share links, realtime filters and
//! the host route, so they must be non-empty and free of whitespace and
//! path separators.

use std::{fmt::Display, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// Identifier of a hosted quiz session
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct SessionId(String);

/// Errors that can occur when parsing a session identifier
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The identifier is empty or only whitespace
    #[error("session id cannot be empty")]
    Empty,
    /// The identifier contains whitespace, a slash or a query character
    #[error("session id contains an illegal character")]
    IllegalCharacter,
}

impl SessionId {
    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = Error;

    /// Parses a session identifier, trimming surrounding whitespace
    ///
    /// # Errors
    ///
    /// * `Error::Empty` - nothing is left after trimming
    /// * `Error::IllegalCharacter` - the identifier contains whitespace,
    ///   `/`, `?` or `#`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::Empty);
        }
        if s
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#'))
        {
            return Err(Error::IllegalCharacter);
        }
        Ok(Self(s.to_owned()))
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_from_str() {
        let id = SessionId::from_str("abc123").unwrap();
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(id.to_string(), "abc123");
    }

    #[test]
    fn test_session_id_trims_whitespace() {
        let id = SessionId::from_str("  abc123\n").unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_session_id_rejects_empty() {
        assert_eq!(SessionId::from_str(""), Err(Error::Empty));
        assert_eq!(SessionId::from_str("   "), Err(Error::Empty));
    }

    #[test]
    fn test_session_id_rejects_illegal_characters() {
        assert_eq!(SessionId::from_str("abc 123"), Err(Error::IllegalCharacter));
        assert_eq!(SessionId::from_str("quiz/abc"), Err(Error::IllegalCharacter));
        assert_eq!(SessionId::from_str("abc?x=1"), Err(Error::IllegalCharacter));
    }

    #[test]
    fn test_session_id_serialization() {
        let id = SessionId::from_str("3f2a-91").unwrap();
        let serialized = serde_json::to_string(&id).unwrap();
        assert_eq!(serialized, "\"3f2a-91\"");

        let deserialized: SessionId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn test_session_id_deserialization_error() {
        let result: Result<SessionId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
