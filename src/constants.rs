//! Configuration constants for the LearnFlow library
//!
//! This module contains the limits and fixed values used throughout the
//! library so that authoring validation, the host view and the remote
//! service clients agree on the same boundaries.

/// Placeholder printed in place of credentials
pub const REDACTED: &str = "<redacted>";

/// Public share-link configuration
pub mod share {
    /// Canonical origin that every share link points at
    pub const CANONICAL_BASE_URL: &str = "https://learnflow.com";
    /// Path segment under which hosted quizzes are joined
    pub const QUIZ_SEGMENT: &str = "quiz";
    /// Path segment under which learning items are shared
    pub const LEARN_SEGMENT: &str = "learn";
}

/// Quiz authoring constants
pub mod quiz {
    /// Number of answer options every question carries
    pub const OPTION_COUNT: usize = 4;
    /// Maximum length of a quiz title in characters
    pub const MAX_TITLE_LENGTH: usize = 200;
    /// Maximum number of questions in a single quiz session
    pub const MAX_QUESTION_COUNT: usize = 100;
    /// Maximum length of a question's text
    pub const MAX_QUESTION_LENGTH: usize = 500;
    /// Maximum length of a single answer option
    pub const MAX_OPTION_LENGTH: usize = 200;
    /// Number of questions requested from the generator when unspecified
    pub const DEFAULT_QUESTION_COUNT: usize = 5;
}

/// Host view constants
pub mod host {
    /// Number of entries kept in the "recently joined" log
    pub const RECENT_JOINS_LIMIT: usize = 5;
    /// Number of standings rows sent to the view
    pub const STANDINGS_LIMIT: usize = 50;
    /// Route the error panel sends the host back to
    pub const RECOVERY_ROUTE: &str = "/quizzes";
}

/// Realtime channel constants
pub mod realtime {
    /// Table holding participant rows
    pub const PARTICIPANTS_TABLE: &str = "participants";
    /// Column that scopes participant rows to a quiz session
    pub const SESSION_COLUMN: &str = "quiz_id";
}

/// Flowchart generation constants
pub mod flowchart {
    /// Header every sanitized diagram starts with
    pub const HEADER: &str = "graph TD";
    /// Title used when the generator omits one
    pub const DEFAULT_TITLE: &str = "Generated Flowchart";
    /// Title of the diagram returned when generation fails
    pub const FALLBACK_TITLE: &str = "Simple Fallback Flowchart";
    /// Diagram returned when generation fails
    pub const FALLBACK_CODE: &str =
        "graph TD\n    A[Main Topic] --> B[Subtopic]\n    B --> C[Details]";
}

/// Text generation API constants
pub mod gemini {
    /// Default `generateContent` endpoint
    pub const DEFAULT_ENDPOINT: &str =
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
    /// Request timeout in seconds
    pub const TIMEOUT_SECONDS: u64 = 60;
    /// Environment variable holding the API key
    pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
    /// Environment variable overriding the endpoint
    pub const ENDPOINT_VAR: &str = "GEMINI_API_URL";
}

/// YouTube transcript constants
pub mod youtube {
    /// Plain-text transcript endpoint
    pub const TRANSCRIPT_ENDPOINT: &str = "https://api.supadata.ai/v1/youtube/transcript";
    /// Title used when the transcript API does not report one
    pub const DEFAULT_VIDEO_TITLE: &str = "YouTube Video";
    /// Request timeout in seconds
    pub const TIMEOUT_SECONDS: u64 = 30;
    /// Environment variable holding the API key
    pub const API_KEY_VAR: &str = "SUPADATA_API_KEY";
}
