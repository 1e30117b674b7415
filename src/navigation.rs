//! Host-side question navigation
//!
//! The navigator decides which question the host is displaying, whether
//! the quiz is progressing, and when the final leaderboard takes over. It
//! knows nothing about rendering or the session store: it only needs the
//! number of questions in the loaded session.
//!
//! ```text
//! Idle --load--> Ready --start--> Running --next (last)--> Finished
//!                                  |    ^
//!                              pause    start
//!                                  v    |
//!                                  Paused
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The phase of the host's quiz flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    /// No session is loaded
    #[default]
    Idle,
    /// A session is loaded and has not been started
    Ready,
    /// The quiz is progressing
    Running,
    /// The quiz was started and is currently held
    Paused,
    /// The final leaderboard is showing; no further navigation happens
    Finished,
}

/// A navigation request made by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Start or resume the quiz
    Start,
    /// Hold the quiz
    Pause,
    /// Move to the following question or finish
    Next,
    /// Move to the preceding question
    Previous,
}

/// Notifications produced by successful transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// The quiz began accepting progression
    Started {
        /// Whether this continued a paused quiz rather than a first start
        resumed: bool,
    },
    /// The quiz was paused
    Paused,
    /// The last question was passed and the final results are showing
    Completed,
}

/// Errors that can occur when navigating
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The action is not allowed in the current state
    #[error("cannot {action:?} while {state:?}")]
    InvalidTransition {
        /// The rejected action
        action: Action,
        /// The state the navigator was in
        state: State,
    },
}

/// Snapshot of the navigation cursor sent to the view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cursor {
    /// Index of the displayed question
    pub index: usize,
    /// Whether the quiz is accepting live progression
    pub active: bool,
    /// Whether the final leaderboard is showing
    pub showing_leaderboard: bool,
    /// Percentage of the quiz reached, see [`Navigator::progress_percent`]
    pub progress: f64,
}

/// The question navigation state machine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Navigator {
    state: State,
    index: usize,
    question_count: usize,
}

impl Navigator {
    /// Creates an idle navigator with no session loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads (or reloads) a session with the given number of questions
    ///
    /// This is the only way out of [`State::Finished`].
    pub fn load(&mut self, question_count: usize) {
        *self = Self {
            state: State::Ready,
            index: 0,
            question_count,
        };
    }

    /// Forgets the loaded session
    pub fn unload(&mut self) {
        *self = Self::default();
    }

    /// Starts the quiz, or resumes it after a pause
    ///
    /// A first start always begins at question zero; a resume keeps the
    /// index the quiz was paused at.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the navigator is
    /// [`State::Ready`] or [`State::Paused`].
    pub fn start(&mut self) -> Result<Event, Error> {
        match self.state {
            State::Ready => {
                self.index = 0;
                self.state = State::Running;
                Ok(Event::Started { resumed: false })
            }
            State::Paused => {
                self.state = State::Running;
                Ok(Event::Started { resumed: true })
            }
            state => Err(Error::InvalidTransition {
                action: Action::Start,
                state,
            }),
        }
    }

    /// Pauses a running quiz
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the navigator is
    /// [`State::Running`].
    pub fn pause(&mut self) -> Result<Event, Error> {
        match self.state {
            State::Running => {
                self.state = State::Paused;
                Ok(Event::Paused)
            }
            state => Err(Error::InvalidTransition {
                action: Action::Pause,
                state,
            }),
        }
    }

    /// Advances to the next question, finishing after the last one
    ///
    /// Returns `Some(Event::Completed)` when this call moved the quiz to
    /// [`State::Finished`], otherwise `None`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the navigator is
    /// [`State::Running`].
    pub fn next(&mut self) -> Result<Option<Event>, Error> {
        if self.state != State::Running {
            return Err(Error::InvalidTransition {
                action: Action::Next,
                state: self.state,
            });
        }

        if self.is_last() {
            self.state = State::Finished;
            Ok(Some(Event::Completed))
        } else {
            self.index += 1;
            Ok(None)
        }
    }

    /// Steps back one question
    ///
    /// At the first question this does nothing and is not an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` when no session is loaded or the
    /// quiz has finished.
    pub fn previous(&mut self) -> Result<(), Error> {
        match self.state {
            State::Idle | State::Finished => Err(Error::InvalidTransition {
                action: Action::Previous,
                state: self.state,
            }),
            _ => {
                self.index = self.index.saturating_sub(1);
                Ok(())
            }
        }
    }

    /// The current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Index of the displayed question
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of questions in the loaded session
    pub fn question_count(&self) -> usize {
        self.question_count
    }

    /// Whether the quiz is accepting live progression
    pub fn is_active(&self) -> bool {
        self.state == State::Running
    }

    /// Whether the final leaderboard is showing
    pub fn is_showing_leaderboard(&self) -> bool {
        self.state == State::Finished
    }

    /// Whether the displayed question is the last one
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.question_count
    }

    /// Percentage of the quiz reached: `(index + 1) / question_count * 100`
    ///
    /// Sessions without questions report zero.
    pub fn progress_percent(&self) -> f64 {
        if self.question_count == 0 {
            return 0.;
        }
        (self.index + 1) as f64 / self.question_count as f64 * 100.
    }

    /// Snapshot of the cursor for the view
    pub fn cursor(&self) -> Cursor {
        Cursor {
            index: self.index,
            active: self.is_active(),
            showing_leaderboard: self.is_showing_leaderboard(),
            progress: self.progress_percent(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn loaded(count: usize) -> Navigator {
        let mut navigator = Navigator::new();
        navigator.load(count);
        navigator
    }

    fn expected_progress(index: usize, count: usize) -> f64 {
        (index + 1) as f64 / count as f64 * 100.
    }

    #[test]
    fn test_new_is_idle() {
        let mut navigator = Navigator::new();
        assert_eq!(navigator.state(), State::Idle);
        assert!(navigator.start().is_err());
        assert!(navigator.next().is_err());
        assert!(navigator.previous().is_err());
    }

    #[test]
    fn test_load_is_ready() {
        let navigator = loaded(3);
        assert_eq!(navigator.state(), State::Ready);
        assert_eq!(navigator.index(), 0);
        assert!(!navigator.is_active());
        assert!(!navigator.is_showing_leaderboard());
    }

    #[test]
    fn test_three_question_scenario() {
        let mut navigator = loaded(3);

        assert_eq!(navigator.start(), Ok(Event::Started { resumed: false }));
        assert_eq!(navigator.index(), 0);
        assert!(navigator.is_active());

        assert_eq!(navigator.next(), Ok(None));
        assert_eq!(navigator.index(), 1);

        assert_eq!(navigator.next(), Ok(None));
        assert_eq!(navigator.index(), 2);

        assert_eq!(navigator.next(), Ok(Some(Event::Completed)));
        assert_eq!(navigator.index(), 2);
        assert_eq!(navigator.state(), State::Finished);
        assert!(navigator.is_showing_leaderboard());
        assert!(!navigator.is_active());

        assert!(navigator.next().is_err());
        assert_eq!(navigator.index(), 2);
        assert_eq!(navigator.state(), State::Finished);
    }

    #[test]
    fn test_finishes_exactly_once_for_any_length() {
        for count in 1..=8 {
            let mut navigator = loaded(count);
            navigator.start().unwrap();

            let completions = (0..count + 3)
                .filter_map(|_| navigator.next().ok().flatten())
                .filter(|event| *event == Event::Completed)
                .count();

            assert_eq!(completions, 1, "count {count}");
            assert_eq!(navigator.index(), count - 1);
            assert!(navigator.is_showing_leaderboard());
        }
    }

    #[test]
    fn test_progress_after_k_steps() {
        let count = 7;
        let mut navigator = loaded(count);
        navigator.start().unwrap();

        for k in 0..count {
            assert_eq!(navigator.progress_percent(), expected_progress(k, count));
            navigator.next().unwrap();
        }
        assert_eq!(navigator.progress_percent(), 100.);
    }

    #[test]
    fn test_progress_bounds_once_ready() {
        let navigator = loaded(4);
        assert_eq!(navigator.progress_percent(), 25.);
        assert_eq!(Navigator::new().progress_percent(), 0.);
    }

    #[test]
    fn test_previous_at_zero_is_idempotent() {
        let mut navigator = loaded(3);
        navigator.start().unwrap();

        let before = navigator.cursor();
        assert_eq!(navigator.previous(), Ok(()));
        assert_eq!(navigator.previous(), Ok(()));
        assert_eq!(navigator.cursor(), before);
        assert_eq!(navigator.state(), State::Running);
    }

    #[test]
    fn test_previous_keeps_flags() {
        let mut navigator = loaded(3);
        navigator.start().unwrap();
        navigator.next().unwrap();
        navigator.next().unwrap();
        navigator.pause().unwrap();

        navigator.previous().unwrap();
        assert_eq!(navigator.index(), 1);
        assert_eq!(navigator.state(), State::Paused);
    }

    #[test]
    fn test_pause_then_start_resumes() {
        let mut navigator = loaded(5);
        navigator.start().unwrap();
        navigator.next().unwrap();
        navigator.next().unwrap();

        assert_eq!(navigator.pause(), Ok(Event::Paused));
        assert_eq!(navigator.index(), 2);
        assert!(!navigator.is_active());

        assert_eq!(navigator.start(), Ok(Event::Started { resumed: true }));
        assert_eq!(navigator.index(), 2);
        assert!(navigator.is_active());
    }

    #[test]
    fn test_pause_outside_running_is_rejected() {
        let mut navigator = loaded(2);
        assert_eq!(
            navigator.pause(),
            Err(Error::InvalidTransition {
                action: Action::Pause,
                state: State::Ready,
            })
        );

        navigator.start().unwrap();
        navigator.pause().unwrap();
        assert!(navigator.pause().is_err());
        assert_eq!(navigator.state(), State::Paused);
    }

    #[test]
    fn test_next_while_paused_is_rejected() {
        let mut navigator = loaded(3);
        navigator.start().unwrap();
        navigator.pause().unwrap();

        assert!(navigator.next().is_err());
        assert_eq!(navigator.index(), 0);
    }

    #[test]
    fn test_finished_is_terminal_until_reload() {
        let mut navigator = loaded(1);
        navigator.start().unwrap();
        navigator.next().unwrap();

        assert!(navigator.start().is_err());
        assert!(navigator.pause().is_err());
        assert!(navigator.previous().is_err());
        assert_eq!(navigator.state(), State::Finished);

        navigator.load(1);
        assert_eq!(navigator.state(), State::Ready);
        assert_eq!(navigator.index(), 0);
    }

    #[test]
    fn test_leaderboard_implies_inactive() {
        let mut navigator = loaded(2);
        navigator.start().unwrap();
        for _ in 0..4 {
            let cursor = navigator.cursor();
            assert!(!cursor.showing_leaderboard || !cursor.active);
            let _ = navigator.next();
        }
    }

    #[test]
    fn test_empty_session_finishes_on_first_next() {
        let mut navigator = loaded(0);
        navigator.start().unwrap();
        assert_eq!(navigator.next(), Ok(Some(Event::Completed)));
        assert_eq!(navigator.progress_percent(), 0.);
    }

    #[test]
    fn test_error_display() {
        let error = Error::InvalidTransition {
            action: Action::Pause,
            state: State::Ready,
        };
        assert_eq!(error.to_string(), "cannot Pause while Ready");
    }
}
