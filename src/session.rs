//! Communication with the host view
//!
//! The coordinator never renders anything. Everything the host's screen
//! needs is pushed through a [`Tunnel`], so the same coordinator can sit
//! behind a web page, a terminal client or a test recorder.

use super::{SyncMessage, UpdateMessage};

/// Trait for sending messages to the host view
///
/// Implementations might write to a WebSocket, post to a UI thread or
/// simply record what was sent.
pub trait Tunnel {
    /// Sends an update message to the view
    ///
    /// Update messages describe a single change, such as a new question
    /// being displayed or a participant joining.
    fn send_message(&self, message: &UpdateMessage);

    /// Sends a state synchronization message to the view
    ///
    /// Sync messages carry everything needed to redraw the view from
    /// scratch, typically after it connects or reconnects.
    fn send_state(&self, state: &SyncMessage);

    /// Closes the tunnel once the host leaves the session
    fn close(self);
}
