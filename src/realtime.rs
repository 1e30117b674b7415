//! Realtime participant subscription
//!
//! A [`ParticipantSync`] owns the registration on the realtime channel for
//! one session. It only decides which change events are relevant; acting on
//! them (re-fetching the leaderboard, logging joins) is the host's job.

use enum_map::{EnumMap, enum_map};

use crate::{
    session_id::SessionId,
    store::{ChangeEvent, ChangeKind, ChannelFilter, Error, RealtimeChannel},
};

/// A live subscription to participant changes of one session
///
/// The subscription must be given back with [`ParticipantSync::release`].
/// Dropping it while still registered leaks the registration on the
/// channel, which is logged.
#[derive(Debug)]
pub struct ParticipantSync<H> {
    filter: ChannelFilter,
    interest: EnumMap<ChangeKind, bool>,
    handle: Option<H>,
}

impl<H> ParticipantSync<H> {
    /// Registers for inserted and updated participant rows of a session
    ///
    /// # Errors
    ///
    /// Returns the channel's error if the registration was refused.
    pub fn subscribe<C: RealtimeChannel<Handle = H>>(
        channel: &C,
        session_id: SessionId,
    ) -> Result<Self, Error> {
        let filter = ChannelFilter::participants(session_id);
        let interest = enum_map! {
            ChangeKind::Insert | ChangeKind::Update => true,
            ChangeKind::Delete => false,
        };
        let handle = channel.subscribe(&filter, &interest)?;
        tracing::info!(filter = %filter, "subscribed to participant changes");
        Ok(Self {
            filter,
            interest,
            handle: Some(handle),
        })
    }

    /// Whether an event belongs to this subscription
    pub fn accepts(&self, event: &ChangeEvent) -> bool {
        self.handle.is_some() && self.interest[event.kind] && self.filter.matches(event)
    }

    /// The session this subscription follows
    pub fn session_id(&self) -> &SessionId {
        &self.filter.session_id
    }

    /// Removes the registration from the channel
    pub fn release<C: RealtimeChannel<Handle = H>>(mut self, channel: &C) {
        if let Some(handle) = self.handle.take() {
            channel.remove(handle);
            tracing::info!(filter = %self.filter, "released participant subscription");
        }
    }
}

impl<H> Drop for ParticipantSync<H> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            tracing::warn!(
                filter = %self.filter,
                "participant subscription dropped without being released"
            );
        }
    }
}
