//! Live quiz host coordinator
//!
//! The [`Host`] ties together everything the host screen of a live quiz
//! needs: it loads the session from the store, keeps the participant list in
//! step with the realtime channel, drives question navigation and pushes
//! every visible change through a [`Tunnel`].
//!
//! The coordinator is sans-IO. Leaderboard fetches are split into issuing a
//! [`Ticket`] and completing it, so callers can run the fetch however they
//! like and feed the result back in any order; only the latest ticket lands.

use serde::Serialize;
use serde_with::skip_serializing_none;

use super::{
    constants::host::RECOVERY_ROUTE,
    leaderboard::{Applied, Leaderboard, LeaderboardMessage, Ticket},
    navigation::{self, Cursor, Event, Navigator, State},
    participant::Participant,
    quiz::{QuizQuestion, QuizSession},
    realtime::ParticipantSync,
    session::Tunnel,
    session_id::SessionId,
    share,
    store::{self, ChangeEvent, ChangeKind, RealtimeChannel, SessionStore},
};

/// Progress of loading the quiz session
#[derive(Debug, Clone)]
pub enum Load {
    /// The session has not arrived yet
    Loading,
    /// The session could not be loaded; the view shows an error panel
    Failed(store::Error),
    /// The session is available
    Loaded(QuizSession),
}

/// One answer option as shown on the host screen
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct OptionView {
    /// Letter labelling the option, starting at `A`
    pub letter: char,
    /// The option text
    pub text: String,
    /// Whether this is the correct answer
    pub correct: bool,
}

/// The question currently displayed to the host
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct QuestionView {
    /// Index of the question
    pub index: usize,
    /// Total number of questions
    pub count: usize,
    /// Percentage of the quiz reached
    pub progress: f64,
    /// The question text
    pub question: String,
    /// Options in display order
    pub options: Vec<OptionView>,
    /// Letter of the correct option, absent if the correct answer matches
    /// none of the options
    pub correct_letter: Option<char>,
}

impl QuestionView {
    fn new(question: &QuizQuestion, navigator: &Navigator) -> Self {
        let options: Vec<OptionView> = question
            .options
            .iter()
            .zip('A'..)
            .map(|(text, letter)| OptionView {
                letter,
                text: text.clone(),
                correct: question.is_correct(text),
            })
            .collect();
        let correct_letter = options.iter().find(|o| o.correct).map(|o| o.letter);

        Self {
            index: navigator.index(),
            count: navigator.question_count(),
            progress: navigator.progress_percent(),
            question: question.question.clone(),
            options,
            correct_letter,
        }
    }
}

/// Update messages sent to the host view
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// The session was loaded and is ready to start
    Loaded {
        /// Title of the quiz
        title: String,
        /// Number of questions
        question_count: usize,
        /// Link participants use to join
        share_link: Option<String>,
    },
    /// The session could not be loaded
    LoadFailed {
        /// What went wrong
        error: store::Error,
        /// Where the error panel's recovery action leads
        recovery_route: &'static str,
    },
    /// The quiz was started or resumed
    Started {
        /// Whether a paused quiz was resumed
        resumed: bool,
    },
    /// The quiz was paused
    Paused,
    /// The last question was passed
    Completed,
    /// A question is now displayed
    Question(QuestionView),
    /// The participant list changed
    Leaderboard {
        /// The leaderboard data to display
        leaderboard: LeaderboardMessage,
    },
    /// Someone joined; the recent joins log, newest first
    RecentJoins(Vec<String>),
}

impl From<Event> for UpdateMessage {
    fn from(event: Event) -> Self {
        match event {
            Event::Started { resumed } => Self::Started { resumed },
            Event::Paused => Self::Paused,
            Event::Completed => Self::Completed,
        }
    }
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Sync messages that let the host view redraw from scratch
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// The session is still loading
    Loading,
    /// The session could not be loaded
    Failed {
        /// What went wrong
        error: store::Error,
        /// Where the error panel's recovery action leads
        recovery_route: &'static str,
    },
    /// The session is loaded
    Session {
        /// Title of the quiz
        title: String,
        /// Link participants use to join
        share_link: Option<String>,
        /// Navigation phase
        state: State,
        /// Navigation cursor
        cursor: Cursor,
        /// The displayed question, absent before the start and after the end
        question: Option<QuestionView>,
        /// The leaderboard data to display
        leaderboard: LeaderboardMessage,
    },
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

fn rejected(error: &navigation::Error) {
    tracing::debug!(%error, "navigation rejected");
}

/// Coordinator for the host screen of one live quiz session
///
/// `H` is the registration handle type of the realtime channel in use.
#[derive(Debug)]
pub struct Host<H> {
    session_id: SessionId,
    load: Load,
    navigator: Navigator,
    leaderboard: Leaderboard,
    sync: Option<ParticipantSync<H>>,
    left: bool,
}

impl<H> Host<H> {
    /// Creates a coordinator for a session that has not been loaded yet
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            load: Load::Loading,
            navigator: Navigator::new(),
            leaderboard: Leaderboard::default(),
            sync: None,
            left: false,
        }
    }

    /// Loads (or reloads) the session from the store
    ///
    /// A reload puts navigation back to [`State::Ready`]. On failure the
    /// view is sent an error panel pointing at the quiz list and navigation
    /// stays unavailable.
    ///
    /// # Errors
    ///
    /// Returns the store's error after reporting it to the view.
    pub fn load<S: SessionStore, T: Tunnel>(
        &mut self,
        store: &S,
        tunnel: &T,
    ) -> Result<(), store::Error> {
        self.navigator.unload();
        self.load = Load::Loading;

        match store.quiz_session(&self.session_id) {
            Ok(session) => {
                tracing::info!(
                    session = %self.session_id,
                    questions = session.len(),
                    "quiz session loaded"
                );
                self.navigator.load(session.len());

                // The loaded roster supersedes any fetch still in flight.
                let ticket = self.leaderboard.begin_refresh();
                self.leaderboard
                    .complete_refresh(ticket, session.participants.clone());

                tunnel.send_message(&UpdateMessage::Loaded {
                    title: session.title.clone(),
                    question_count: session.len(),
                    share_link: self.share_link().ok(),
                });
                tunnel.send_message(&UpdateMessage::Leaderboard {
                    leaderboard: self.leaderboard.message(),
                });
                self.load = Load::Loaded(session);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(session = %self.session_id, %error, "failed to load quiz session");
                tunnel.send_message(&UpdateMessage::LoadFailed {
                    error: error.clone(),
                    recovery_route: RECOVERY_ROUTE,
                });
                self.load = Load::Failed(error.clone());
                Err(error)
            }
        }
    }

    /// Subscribes to participant changes of the session
    ///
    /// Returns the ticket of the initial leaderboard fetch the caller should
    /// run and hand to [`Host::complete_refresh`].
    ///
    /// # Errors
    ///
    /// Returns the channel's error if the registration was refused.
    pub fn connect<C: RealtimeChannel<Handle = H>>(
        &mut self,
        channel: &C,
    ) -> Result<Ticket, store::Error> {
        if self.sync.is_none() {
            self.sync = Some(ParticipantSync::subscribe(
                channel,
                self.session_id.clone(),
            )?);
        }
        Ok(self.leaderboard.begin_refresh())
    }

    /// Handles a change notification from the realtime channel
    ///
    /// Returns the ticket of the leaderboard fetch the event calls for, or
    /// `None` if the event is ignored. Every accepted event calls for a
    /// fetch. Inserted rows that carry a name are added to the recent joins
    /// log right away; the roster itself only changes when the fetch
    /// completes.
    ///
    /// # Arguments
    ///
    /// * `event` - The notification as delivered by the channel
    /// * `tunnel` - Where the updated recent joins log is sent
    pub fn receive_change<T: Tunnel>(
        &mut self,
        event: &ChangeEvent,
        tunnel: &T,
    ) -> Option<Ticket> {
        if !self.sync.as_ref().is_some_and(|sync| sync.accepts(event)) {
            tracing::debug!(
                kind = ?event.kind,
                table = %event.table,
                "ignoring change event"
            );
            return None;
        }

        if event.kind == ChangeKind::Insert {
            if let Some(name) = event.participant_name() {
                self.leaderboard.record_join(name);
                tunnel.send_message(&UpdateMessage::RecentJoins(
                    self.leaderboard.recent_joins().messages(),
                ));
            } else {
                tracing::debug!("inserted row has no participant name");
            }
        }

        Some(self.leaderboard.begin_refresh())
    }

    /// Lands the result of a leaderboard fetch
    ///
    /// Returns whether the participant list was replaced. Failed fetches,
    /// stale tickets and anything arriving after [`Host::leave`] are logged
    /// and dropped.
    ///
    /// # Arguments
    ///
    /// * `ticket` - The ticket issued when the fetch was started
    /// * `result` - What the store returned
    /// * `tunnel` - Where the new leaderboard is sent
    pub fn complete_refresh<T: Tunnel>(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Participant>, store::Error>,
        tunnel: &T,
    ) -> bool {
        if self.left {
            tracing::debug!("leaderboard response after leaving");
            return false;
        }

        let participants = match result {
            Ok(participants) => participants,
            Err(error) => {
                tracing::warn!(session = %self.session_id, %error, "leaderboard refresh failed");
                return false;
            }
        };

        if self.leaderboard.complete_refresh(ticket, participants) == Applied::Stale {
            return false;
        }

        if let Load::Loaded(session) = &mut self.load {
            session.participants = self.leaderboard.participants().to_vec();
        }
        tunnel.send_message(&UpdateMessage::Leaderboard {
            leaderboard: self.leaderboard.message(),
        });
        true
    }

    /// Fetches the leaderboard from the store and lands it immediately
    pub fn refresh<S: SessionStore, T: Tunnel>(&mut self, store: &S, tunnel: &T) -> bool {
        let ticket = self.leaderboard.begin_refresh();
        let result = store.leaderboard(&self.session_id);
        self.complete_refresh(ticket, result, tunnel)
    }

    /// Starts or resumes the quiz
    ///
    /// # Errors
    ///
    /// Returns `navigation::Error::InvalidTransition`, changing nothing, if
    /// the quiz is neither ready nor paused.
    pub fn start<T: Tunnel>(&mut self, tunnel: &T) -> Result<(), navigation::Error> {
        let event = self.navigator.start().inspect_err(rejected)?;
        tracing::info!(session = %self.session_id, ?event, "quiz started");
        tunnel.send_message(&event.into());
        self.send_question(tunnel);
        Ok(())
    }

    /// Pauses the quiz
    ///
    /// # Errors
    ///
    /// Returns `navigation::Error::InvalidTransition`, changing nothing, if
    /// the quiz is not running.
    pub fn pause<T: Tunnel>(&mut self, tunnel: &T) -> Result<(), navigation::Error> {
        let event = self.navigator.pause().inspect_err(rejected)?;
        tunnel.send_message(&event.into());
        Ok(())
    }

    /// Moves to the next question, or to the final leaderboard after the
    /// last one
    ///
    /// # Errors
    ///
    /// Returns `navigation::Error::InvalidTransition`, changing nothing, if
    /// the quiz is not running.
    pub fn next<T: Tunnel>(&mut self, tunnel: &T) -> Result<(), navigation::Error> {
        match self.navigator.next().inspect_err(rejected)? {
            Some(event) => {
                tracing::info!(session = %self.session_id, "quiz completed");
                tunnel.send_message(&event.into());
                tunnel.send_message(&UpdateMessage::Leaderboard {
                    leaderboard: self.leaderboard.message(),
                });
            }
            None => self.send_question(tunnel),
        }
        Ok(())
    }

    /// Moves back one question; does nothing at the first one
    ///
    /// # Errors
    ///
    /// Returns `navigation::Error::InvalidTransition` if no session is
    /// loaded or the quiz has finished.
    pub fn previous<T: Tunnel>(&mut self, tunnel: &T) -> Result<(), navigation::Error> {
        self.navigator.previous().inspect_err(rejected)?;
        self.send_question(tunnel);
        Ok(())
    }

    fn send_question<T: Tunnel>(&self, tunnel: &T) {
        if let Some(view) = self.question_view() {
            tunnel.send_message(&UpdateMessage::Question(view));
        }
    }

    /// Releases the realtime subscription and closes the tunnel
    ///
    /// Fetch results arriving afterwards are ignored.
    pub fn leave<C: RealtimeChannel<Handle = H>, T: Tunnel>(&mut self, channel: &C, tunnel: T) {
        if let Some(sync) = self.sync.take() {
            sync.release(channel);
        }
        self.left = true;
        tunnel.close();
    }

    /// The session this coordinator hosts
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Loading progress of the session
    pub fn load_state(&self) -> &Load {
        &self.load
    }

    /// The navigation state machine
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// The participant list and recent joins
    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Link participants use to join this session
    ///
    /// # Errors
    ///
    /// Returns `share::Error::InvalidArgument` if the identifier cannot be
    /// turned into a link.
    pub fn share_link(&self) -> Result<String, share::Error> {
        share::quiz_link(self.session_id.as_str())
    }

    /// The question being displayed, if the quiz is underway
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        match (&self.load, self.navigator.state()) {
            (Load::Loaded(session), State::Ready | State::Running | State::Paused) => {
                session.questions.get(self.navigator.index())
            }
            _ => None,
        }
    }

    /// The displayed question as the host screen shows it
    pub fn question_view(&self) -> Option<QuestionView> {
        self.current_question()
            .map(|question| QuestionView::new(question, &self.navigator))
    }

    /// Everything the view needs to redraw
    pub fn state_message(&self) -> SyncMessage {
        match &self.load {
            Load::Loading => SyncMessage::Loading,
            Load::Failed(error) => SyncMessage::Failed {
                error: error.clone(),
                recovery_route: RECOVERY_ROUTE,
            },
            Load::Loaded(session) => SyncMessage::Session {
                title: session.title.clone(),
                share_link: self.share_link().ok(),
                state: self.navigator.state(),
                cursor: self.navigator.cursor(),
                question: self.question_view(),
                leaderboard: self.leaderboard.message(),
            },
        }
    }
}
