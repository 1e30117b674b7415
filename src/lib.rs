//! # LearnFlow
//!
//! Core logic for a study-material generator and live quiz host.
//!
//! The centre of the crate is [`host::Host`], the coordinator behind the
//! host screen of a live quiz: it loads the session from a
//! [`store::SessionStore`], follows participant changes over a
//! [`store::RealtimeChannel`], drives the [`navigation::Navigator`] and
//! keeps the [`leaderboard::Leaderboard`] current. Around it sit the
//! generators for flashcards, notes, quizzes and flowcharts in [`content`],
//! transcript fetching in [`youtube`] and the saved [`learning`] library.
//!
//! Nothing here owns an event loop. Remote services are reached through
//! traits and results are fed back in through plain method calls.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

use derive_where::derive_where;
use itertools::Itertools;
use serde::Serialize;

pub mod constants;

pub mod content;
pub mod host;
pub mod leaderboard;
pub mod learning;
pub mod navigation;
pub mod participant;
pub mod quiz;
pub mod realtime;
pub mod session;
pub mod session_id;
pub mod share;
pub mod store;
pub mod youtube;

pub use host::{SyncMessage, UpdateMessage};

/// A list cut down for display that remembers how long it was
///
/// The host screen shows the first few standings but still reports how
/// many participants there are in total.
#[derive(Debug, Clone, Serialize)]
#[derive_where(Default)]
pub struct TruncatedVec<T> {
    exact_count: usize,
    items: Vec<T>,
}

impl<T> TruncatedVec<T> {
    /// Keeps at most `limit` items of `list`, recording `exact_count` as
    /// the full length
    ///
    /// # Arguments
    ///
    /// * `list` - Iterator over the items in display order
    /// * `limit` - Maximum number of items to keep
    /// * `exact_count` - Length of the full list
    pub fn new<I: Iterator<Item = T>>(list: I, limit: usize, exact_count: usize) -> Self {
        Self {
            exact_count,
            items: list.take(limit).collect_vec(),
        }
    }

    /// The full length before truncation
    pub fn exact_count(&self) -> usize {
        self.exact_count
    }

    /// The kept items
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether items were cut off
    pub fn is_truncated(&self) -> bool {
        self.items.len() < self.exact_count
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_vec_new() {
        let truncated = TruncatedVec::new(1..=5, 3, 5);

        assert_eq!(truncated.exact_count(), 5);
        assert_eq!(truncated.items(), &[1, 2, 3]);
        assert!(truncated.is_truncated());
    }

    #[test]
    fn test_truncated_vec_under_limit() {
        let truncated = TruncatedVec::new(["Ada", "Grace"].into_iter(), 50, 2);

        assert_eq!(truncated.items(), &["Ada", "Grace"]);
        assert!(!truncated.is_truncated());
    }

    #[test]
    fn test_truncated_vec_default() {
        let truncated: TruncatedVec<String> = TruncatedVec::default();
        assert_eq!(truncated.exact_count(), 0);
        assert!(truncated.items().is_empty());
    }

    #[test]
    fn test_truncated_vec_serializes() {
        let truncated = TruncatedVec::new([("Ada", 30)].into_iter(), 50, 1);
        assert_eq!(
            serde_json::to_string(&truncated).unwrap(),
            r#"{"exact_count":1,"items":[["Ada",30]]}"#
        );
    }
}
