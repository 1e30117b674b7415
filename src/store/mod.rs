//! Session store and realtime channel interfaces
//!
//! The hosted database that persists quiz sessions and participants, and
//! its realtime change feed, are external services. This module defines
//! the narrow interfaces the host coordinator needs from them, together
//! with the wire shapes of the change notifications.

use std::fmt::Display;

use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::realtime::{PARTICIPANTS_TABLE, SESSION_COLUMN},
    participant::Participant,
    quiz::QuizSession,
    session_id::SessionId,
};

pub mod memory;

/// Errors reported by the session store
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Error {
    /// The session identifier does not resolve to a session
    #[error("quiz session {0} could not be found")]
    NotFound(SessionId),
    /// Transport or decoding failure while talking to the store
    #[error("failed to load from the session store: {0}")]
    LoadFailure(String),
}

/// Read access to persisted quiz sessions and their participants
pub trait SessionStore {
    /// Loads a quiz session with its questions
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no session has this identifier, or
    /// `Error::LoadFailure` if the store could not be reached or read.
    fn quiz_session(&self, id: &SessionId) -> Result<QuizSession, Error>;

    /// Loads the participants of a session, best score first
    ///
    /// The ordering is the store's; callers display it as delivered.
    ///
    /// # Errors
    ///
    /// Returns `Error::LoadFailure` if the store could not be reached or read.
    fn leaderboard(&self, id: &SessionId) -> Result<Vec<Participant>, Error>;
}

/// Kind of row change carried by the realtime channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    /// A row was inserted
    Insert,
    /// A row was updated
    Update,
    /// A row was deleted
    Delete,
}

/// A row-level change notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// What happened to the row
    #[serde(rename = "eventType")]
    pub kind: ChangeKind,
    /// Table the row lives in
    pub table: String,
    /// The row after the change (empty for deletions)
    #[serde(default)]
    pub new: serde_json::Value,
}

impl ChangeEvent {
    /// Name of the participant in the changed row, if it carries one
    ///
    /// Only the name is read; the rest of the row may have any shape.
    pub fn participant_name(&self) -> Option<&str> {
        self.new
            .get("name")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Scope of a realtime subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelFilter {
    /// Table to watch
    pub table: &'static str,
    /// Column the filter compares
    pub column: &'static str,
    /// Session whose rows are of interest
    pub session_id: SessionId,
}

impl ChannelFilter {
    /// Filter for the participant rows of one session
    pub fn participants(session_id: SessionId) -> Self {
        Self {
            table: PARTICIPANTS_TABLE,
            column: SESSION_COLUMN,
            session_id,
        }
    }

    /// Whether a change event falls inside this filter
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        event.table == self.table
            && event
                .new
                .get(self.column)
                .and_then(serde_json::Value::as_str)
                .is_some_and(|id| id == self.session_id.as_str())
    }
}

impl Display for ChannelFilter {
    /// Formats the filter in the store's `column=eq.value` syntax
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}=eq.{}", self.column, self.session_id)
    }
}

/// A push channel of row-level change notifications
///
/// Implementations hand every notification they receive to
/// [`crate::host::Host::receive_change`]; the channel itself only manages
/// registrations.
pub trait RealtimeChannel {
    /// Token identifying one registration
    type Handle;

    /// Registers interest in the change kinds set in `interest`
    ///
    /// # Errors
    ///
    /// Returns `Error::LoadFailure` if the registration was refused.
    fn subscribe(
        &self,
        filter: &ChannelFilter,
        interest: &EnumMap<ChangeKind, bool>,
    ) -> Result<Self::Handle, Error>;

    /// Releases a registration
    fn remove(&self, handle: Self::Handle);
}
