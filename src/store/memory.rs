//! In-process session store and realtime channel
//!
//! These implementations keep everything in memory on the current thread.
//! They back local development and the test suite; production wiring uses
//! the hosted database.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use enum_map::EnumMap;
use itertools::Itertools;

use super::{ChangeKind, ChannelFilter, Error, RealtimeChannel, SessionStore};
use crate::{participant::Participant, quiz::QuizSession, session_id::SessionId};

/// A session store backed by hash maps
#[derive(Debug, Default)]
pub struct InMemoryStore {
    sessions: RefCell<HashMap<SessionId, QuizSession>>,
    participants: RefCell<HashMap<SessionId, Vec<Participant>>>,
    unavailable: Cell<bool>,
}

impl InMemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a session, replacing any with the same identifier
    pub fn insert_session(&self, session: QuizSession) {
        self.participants
            .borrow_mut()
            .entry(session.id.clone())
            .or_default()
            .extend(session.participants.iter().cloned());
        self.sessions.borrow_mut().insert(session.id.clone(), session);
    }

    /// Inserts a participant or replaces the one with the same id
    pub fn upsert_participant(&self, session_id: &SessionId, participant: Participant) {
        let mut participants = self.participants.borrow_mut();
        let roster = participants.entry(session_id.clone()).or_default();
        match roster.iter_mut().find(|p| p.id == participant.id) {
            Some(existing) => *existing = participant,
            None => roster.push(participant),
        }
    }

    /// Makes every subsequent read fail with `Error::LoadFailure`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    fn check_available(&self) -> Result<(), Error> {
        if self.unavailable.get() {
            Err(Error::LoadFailure("store unavailable".to_owned()))
        } else {
            Ok(())
        }
    }
}

impl SessionStore for InMemoryStore {
    fn quiz_session(&self, id: &SessionId) -> Result<QuizSession, Error> {
        self.check_available()?;
        let mut session = self
            .sessions
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        session.participants = self.leaderboard(id)?;
        Ok(session)
    }

    fn leaderboard(&self, id: &SessionId) -> Result<Vec<Participant>, Error> {
        self.check_available()?;
        Ok(self
            .participants
            .borrow()
            .get(id)
            .map(|roster| {
                roster
                    .iter()
                    .sorted_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)))
                    .cloned()
                    .collect_vec()
            })
            .unwrap_or_default())
    }
}

/// A realtime channel that only tracks registrations
#[derive(Debug, Default)]
pub struct InMemoryChannel {
    next_handle: Cell<u64>,
    registrations: RefCell<HashMap<u64, (ChannelFilter, EnumMap<ChangeKind, bool>)>>,
}

impl InMemoryChannel {
    /// Creates a channel with no registrations
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registrations that have not been removed
    pub fn active_count(&self) -> usize {
        self.registrations.borrow().len()
    }

    /// Whether some live registration would receive this kind of change
    /// for the given session
    pub fn is_listening(&self, session_id: &SessionId, kind: ChangeKind) -> bool {
        self.registrations
            .borrow()
            .values()
            .any(|(filter, interest)| filter.session_id == *session_id && interest[kind])
    }
}

impl RealtimeChannel for InMemoryChannel {
    type Handle = u64;

    fn subscribe(
        &self,
        filter: &ChannelFilter,
        interest: &EnumMap<ChangeKind, bool>,
    ) -> Result<Self::Handle, Error> {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        self.registrations
            .borrow_mut()
            .insert(handle, (filter.clone(), *interest));
        Ok(handle)
    }

    fn remove(&self, handle: Self::Handle) {
        self.registrations.borrow_mut().remove(&handle);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::{participant::Id, quiz::tests::session};

    #[test]
    fn test_missing_session_is_not_found() {
        let store = InMemoryStore::new();
        let id = SessionId::from_str("nope").unwrap();
        assert_eq!(store.quiz_session(&id).unwrap_err(), Error::NotFound(id));
    }

    #[test]
    fn test_unavailable_store_fails_to_load() {
        let store = InMemoryStore::new();
        store.insert_session(session("abc123", 2));
        store.set_unavailable(true);

        let id = SessionId::from_str("abc123").unwrap();
        assert!(matches!(store.quiz_session(&id), Err(Error::LoadFailure(_))));
        assert!(matches!(store.leaderboard(&id), Err(Error::LoadFailure(_))));
    }

    #[test]
    fn test_leaderboard_orders_by_score() {
        let store = InMemoryStore::new();
        let id = SessionId::from_str("abc123").unwrap();

        let mut ada = Participant::new(Id::new(), "Ada");
        ada.score = 10;
        let mut grace = Participant::new(Id::new(), "Grace");
        grace.score = 30;
        store.upsert_participant(&id, ada.clone());
        store.upsert_participant(&id, grace);

        let names = |store: &InMemoryStore| {
            store
                .leaderboard(&id)
                .unwrap()
                .into_iter()
                .map(|p| p.name)
                .collect_vec()
        };
        assert_eq!(names(&store), ["Grace", "Ada"]);

        ada.score = 50;
        store.upsert_participant(&id, ada);
        assert_eq!(names(&store), ["Ada", "Grace"]);
    }

    #[test]
    fn test_channel_registrations() {
        let channel = InMemoryChannel::new();
        let id = SessionId::from_str("abc123").unwrap();
        let filter = ChannelFilter::participants(id.clone());
        let mut interest = EnumMap::default();
        interest[ChangeKind::Insert] = true;

        let handle = channel.subscribe(&filter, &interest).unwrap();
        assert_eq!(channel.active_count(), 1);
        assert!(channel.is_listening(&id, ChangeKind::Insert));
        assert!(!channel.is_listening(&id, ChangeKind::Delete));

        channel.remove(handle);
        assert_eq!(channel.active_count(), 0);
    }
}
