//! Saved learning items
//!
//! A learning item bundles everything generated from one source text. The
//! library keeps them newest first and only ever hands out copies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    content::{flowchart::Flowchart, study::Flashcard},
    participant::Id,
    share,
};

/// Study materials generated from one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningItem {
    /// Identifier of the item
    pub id: Id,
    /// Title shown in the library
    pub title: String,
    /// The source text
    pub content: String,
    /// Generated flashcards
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
    /// Generated flowchart
    #[serde(default)]
    pub flowchart: Option<Flowchart>,
    /// Generated key points
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Generated notes as display paragraphs
    #[serde(default)]
    pub notes: Vec<String>,
    /// When the item was created
    pub created_at: DateTime<Utc>,
}

impl LearningItem {
    /// Bundles generated materials into a new item
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        flashcards: Vec<Flashcard>,
        flowchart: Option<Flowchart>,
        key_points: Vec<String>,
        notes: Vec<String>,
    ) -> Self {
        Self {
            id: Id::new(),
            title: title.into(),
            content: content.into(),
            flashcards,
            flowchart,
            key_points,
            notes,
            created_at: Utc::now(),
        }
    }

    /// Link to this item on the canonical host
    ///
    /// # Errors
    ///
    /// Fails for ids that cannot appear in a link, as reported by
    /// [`share::learning_item_link`].
    pub fn share_link(&self) -> Result<String, share::Error> {
        share::learning_item_link(self.id.as_str())
    }
}

/// Saved learning items, newest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LearningLibrary {
    items: Vec<LearningItem>,
}

impl LearningLibrary {
    /// Creates an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a library saved with [`LearningLibrary::to_json`]
    ///
    /// Unreadable data gives an empty library, which is logged.
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|error| {
            tracing::warn!(%error, "discarding unreadable learning library");
            Self::default()
        })
    }

    /// Serializes the library for storage
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Saves an item in front of all others
    pub fn save(&mut self, item: LearningItem) {
        self.items.insert(0, item);
    }

    /// Copies of every item, newest first
    pub fn all(&self) -> Vec<LearningItem> {
        self.items.clone()
    }

    /// A copy of the item with this id
    pub fn get(&self, id: &Id) -> Option<LearningItem> {
        self.items.iter().find(|item| &item.id == id).cloned()
    }

    /// Removes the item with this id, returning it
    pub fn delete(&mut self, id: &Id) -> Option<LearningItem> {
        let position = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(position))
    }

    /// Number of saved items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been saved
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::content::flowchart::fallback;

    fn item(title: &str) -> LearningItem {
        LearningItem::new(
            title,
            "source text",
            Vec::new(),
            Some(fallback("source text")),
            vec!["point".to_owned()],
            vec!["note".to_owned()],
        )
    }

    #[test]
    fn test_save_prepends() {
        let mut library = LearningLibrary::new();
        library.save(item("first"));
        library.save(item("second"));

        let titles: Vec<String> = library.all().into_iter().map(|i| i.title).collect();
        assert_eq!(titles, ["second", "first"]);
    }

    #[test]
    fn test_get_and_delete() {
        let mut library = LearningLibrary::new();
        let saved = item("first");
        let id = saved.id.clone();
        library.save(saved);

        assert_eq!(library.get(&id).unwrap().title, "first");
        assert_eq!(library.delete(&id).unwrap().title, "first");
        assert!(library.get(&id).is_none());
        assert!(library.delete(&id).is_none());
        assert!(library.is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let mut library = LearningLibrary::new();
        library.save(item("first"));
        let json = library.to_json().unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"keyPoints\""));

        let restored = LearningLibrary::from_json(&json);
        assert_eq!(restored.all(), library.all());
    }

    #[test]
    fn test_restores_library_with_string_ids() {
        let json = r#"[{
            "id": "learning-1700000000000",
            "title": "Cells",
            "content": "Cells are small.",
            "flashcards": [
                {"id": "1", "question": "What is a cell?", "answer": "A unit of life"},
                {"id": "2", "question": "Who saw one first?", "answer": "Hooke"}
            ],
            "keyPoints": ["Cells are small"],
            "notes": ["Cells are small."],
            "createdAt": "2024-05-01T12:00:00Z"
        }]"#;
        let library = LearningLibrary::from_json(json);

        assert_eq!(library.len(), 1);
        let item = library.get(&Id::from("learning-1700000000000")).unwrap();
        assert_eq!(item.flashcards[1].id.as_str(), "2");
        assert_eq!(
            item.share_link().unwrap(),
            "https://learnflow.com/learn/learning-1700000000000"
        );
    }

    #[test]
    fn test_unreadable_json_is_empty() {
        assert!(LearningLibrary::from_json("not json").is_empty());
    }

    #[test]
    fn test_share_link() {
        let item = item("first");
        assert_eq!(
            item.share_link().unwrap(),
            format!("https://learnflow.com/learn/{}", item.id)
        );
    }
}
