//! Participants of a hosted quiz
//!
//! Participants are created when a player joins (outside this library) and
//! updated whenever they submit an answer. The host only ever sees them
//! through leaderboard fetches and realtime change rows, so this module
//! holds the participant shape and the identifier type shared with
//! questions and generated items.

use std::{collections::HashMap, convert::Infallible, fmt::Display, str::FromStr};

use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use uuid::Uuid;

/// An opaque identifier for participants, questions and generated items
///
/// Identifiers come from the store, from hand-written quizzes and from
/// earlier saved libraries, so any string is accepted as is. Identifiers
/// minted here are random UUIDs.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(String);

impl Id {
    /// Creates a new random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Id {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A player taking part in a hosted quiz
///
/// The score is maintained by the external store. It is expected to only
/// grow, but nothing here relies on that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Identifier assigned by the store on join
    pub id: Id,
    /// Name the player chose when joining
    pub name: String,
    /// Total points earned so far
    #[serde(default)]
    pub score: u64,
    /// Submitted answer text keyed by question id
    #[serde(default)]
    pub answers: HashMap<Id, String>,
}

impl Participant {
    /// Creates a participant with no score and no answers
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
            answers: HashMap::new(),
        }
    }

    /// Returns the name with inappropriate content masked
    pub fn display_name(&self) -> String {
        self.name.as_str().censor()
    }

    /// Returns the answer submitted for a question, if any
    pub fn answer_for(&self, question_id: &Id) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip_through_string() {
        let id = Id::new();
        let parsed = Id::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_accepts_any_string() {
        for raw in ["custom-1700000000000", "p-42", "1"] {
            let id: Id = serde_json::from_str(&format!("\"{raw}\"")).unwrap();
            assert_eq!(id.as_str(), raw);
            assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{raw}\""));
        }
    }

    #[test]
    fn test_new_ids_are_distinct() {
        assert_ne!(Id::new(), Id::new());
    }

    #[test]
    fn test_participant_defaults_missing_fields() {
        let id = Id::new();
        let json = format!(r#"{{"id":"{id}","name":"Ada"}}"#);
        let participant: Participant = serde_json::from_str(&json).unwrap();

        assert_eq!(participant.name, "Ada");
        assert_eq!(participant.score, 0);
        assert!(participant.answers.is_empty());
    }

    #[test]
    fn test_participant_answer_lookup() {
        let question = Id::new();
        let mut participant = Participant::new(Id::new(), "Ada");
        participant.answers.insert(question.clone(), "Paris".to_owned());

        assert_eq!(participant.answer_for(&question), Some("Paris"));
        assert_eq!(participant.answer_for(&Id::new()), None);
    }

    #[test]
    fn test_display_name_censors() {
        let participant = Participant::new(Id::new(), "shit");
        assert_ne!(participant.display_name(), "shit");

        let participant = Participant::new(Id::new(), "Grace");
        assert_eq!(participant.display_name(), "Grace");
    }

    #[test]
    fn test_participant_with_hand_written_ids() {
        let json = r#"{
            "id": "p-42",
            "name": "Ada",
            "score": 10,
            "answers": { "custom-1700000000000": "Paris" }
        }"#;
        let participant: Participant = serde_json::from_str(json).unwrap();

        assert_eq!(participant.id.as_str(), "p-42");
        assert_eq!(
            participant.answer_for(&Id::from("custom-1700000000000")),
            Some("Paris")
        );
    }
}
