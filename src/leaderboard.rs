//! Leaderboard state held by the host
//!
//! The external store is the only source of truth for scores. The host
//! keeps the last roster it fetched and replaces it wholesale on every
//! refresh; nothing is ever merged. Refreshes may overlap, so each one is
//! issued a [`Ticket`] and only the most recently issued ticket is allowed
//! to land.

use std::collections::VecDeque;

use rustrict::CensorStr;
use serde::Serialize;

use super::{
    TruncatedVec,
    constants::host::{RECENT_JOINS_LIMIT, STANDINGS_LIMIT},
    participant::Participant,
};

/// Sequence number attached to one leaderboard fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Ticket(u64);

/// Outcome of completing a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The roster was replaced
    Replaced,
    /// A newer fetch was issued after this one; the result was dropped
    Stale,
}

/// Rolling log of recently joined participant names, newest first
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecentJoins(VecDeque<String>);

impl RecentJoins {
    /// Records a join, evicting the oldest entry past the limit
    pub fn record(&mut self, name: &str) {
        self.0.push_front(name.censor());
        self.0.truncate(RECENT_JOINS_LIMIT);
    }

    /// The log rendered for display, e.g. `"Ada joined"`
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|name| format!("{name} joined")).collect()
    }

    /// Number of entries in the log
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nobody has joined since the log was created
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Leaderboard information sent to the host view
#[derive(Debug, Serialize, Clone)]
pub struct LeaderboardMessage {
    /// Participant count for display
    pub count: String,
    /// Standings as `(display name, score)` pairs
    pub standings: TruncatedVec<(String, u64)>,
    /// Recent joins, newest first
    pub recent_joins: Vec<String>,
}

/// The host's view of the participants of a session
#[derive(Debug, Default)]
pub struct Leaderboard {
    participants: Vec<Participant>,
    issued: u64,
    recent_joins: RecentJoins,
}

impl Leaderboard {
    /// Creates a leaderboard seeded with the roster loaded with the session
    pub fn with_participants(participants: Vec<Participant>) -> Self {
        Self {
            participants,
            ..Self::default()
        }
    }

    /// Issues the ticket for a new fetch
    ///
    /// Any ticket issued earlier becomes stale.
    pub fn begin_refresh(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Lands the result of a fetch
    ///
    /// The roster is replaced only if `ticket` is the most recently issued
    /// one; otherwise the result is dropped.
    pub fn complete_refresh(
        &mut self,
        ticket: Ticket,
        participants: Vec<Participant>,
    ) -> Applied {
        if ticket.0 != self.issued {
            tracing::warn!(
                ticket = ticket.0,
                latest = self.issued,
                "dropping stale leaderboard response"
            );
            return Applied::Stale;
        }
        self.participants = participants;
        Applied::Replaced
    }

    /// Records a join in the recent joins log
    pub fn record_join(&mut self, name: &str) {
        self.recent_joins.record(name);
    }

    /// The recent joins log
    pub fn recent_joins(&self) -> &RecentJoins {
        &self.recent_joins
    }

    /// Participants in the order the store delivered them
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Number of participants
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether nobody has joined yet
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participant count for display, e.g. `"1 player"` or `"3 players"`
    pub fn participant_count_label(&self) -> String {
        pluralizer::pluralize("player", self.participants.len() as isize, true)
    }

    /// Standings as `(display name, score)` pairs, truncated for display
    pub fn standings(&self) -> TruncatedVec<(String, u64)> {
        TruncatedVec::new(
            self.participants
                .iter()
                .map(|p| (p.display_name(), p.score)),
            STANDINGS_LIMIT,
            self.participants.len(),
        )
    }

    /// Everything the host view shows about the participants
    pub fn message(&self) -> LeaderboardMessage {
        LeaderboardMessage {
            count: self.participant_count_label(),
            standings: self.standings(),
            recent_joins: self.recent_joins.messages(),
        }
    }

}
