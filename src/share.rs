//! Canonical share links
//!
//! Links are always issued against [`CANONICAL_BASE_URL`], whatever host the
//! application happens to be served from, so anything that looks like an
//! origin is stripped from the input first.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::constants::share::{CANONICAL_BASE_URL, LEARN_SEGMENT, QUIZ_SEGMENT};

/// Matches a leading `scheme://host` origin
static ORIGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://[^/]*").expect("valid origin pattern")
});

/// Errors that can occur when building a share link
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Nothing usable was left of the identifier after stripping
    #[error("identifier is empty")]
    InvalidArgument,
}

/// Removes a leading origin and all leading slashes
fn strip_origin(input: &str) -> &str {
    let input = input.trim();
    let rest = ORIGIN.find(input).map_or(input, |m| &input[m.end()..]);
    rest.trim_start_matches('/')
}

/// Formats an arbitrary path as a link on the canonical host
///
/// Any scheme and host on the input are replaced and the path is given
/// exactly one leading slash.
pub fn format_share_link(path: &str) -> String {
    format!("{CANONICAL_BASE_URL}/{}", strip_origin(path))
}

/// Reduces user input to the bare identifier under `segment`
fn identifier<'a>(input: &'a str, segment: &str) -> Result<&'a str, Error> {
    let rest = strip_origin(input);
    let rest = rest
        .strip_prefix(segment)
        .and_then(|r| r.strip_prefix('/'))
        .unwrap_or(rest)
        .trim_start_matches('/')
        .trim_end_matches('/');

    if rest.is_empty() || rest.chars().any(char::is_whitespace) {
        Err(Error::InvalidArgument)
    } else {
        Ok(rest)
    }
}

/// Builds the join link for a hosted quiz session
///
/// Accepts a bare identifier, a path, or a link issued on another host:
/// `"abc123"`, `"/abc123"` and `"https://old-host/abc123"` all give
/// `https://learnflow.com/quiz/abc123`.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if the identifier is empty or contains
/// whitespace once the origin and slashes are removed.
///
/// # Examples
///
/// ```rust
/// use learnflow::share::quiz_link;
///
/// assert_eq!(
///     quiz_link("https://old-host/abc123").unwrap(),
///     "https://learnflow.com/quiz/abc123"
/// );
/// ```
pub fn quiz_link(session_id: &str) -> Result<String, Error> {
    let id = identifier(session_id, QUIZ_SEGMENT)?;
    Ok(format_share_link(&format!("/{QUIZ_SEGMENT}/{id}")))
}

/// Builds the share link for a saved learning item
///
/// # Errors
///
/// Returns `Error::InvalidArgument` under the same conditions as
/// [`quiz_link`].
pub fn learning_item_link(item_id: &str) -> Result<String, Error> {
    let id = identifier(item_id, LEARN_SEGMENT)?;
    Ok(format_share_link(&format!("/{LEARN_SEGMENT}/{id}")))
}
