//! Quiz sessions and questions
//!
//! A quiz session is authored ahead of time (by hand or from generated
//! questions), stored externally and then loaded read-mostly by the host.
//! Questions are checked when they are edited; nothing here re-validates
//! them while a quiz is being played.

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::quiz::{
        MAX_OPTION_LENGTH, MAX_QUESTION_COUNT, MAX_QUESTION_LENGTH, MAX_TITLE_LENGTH, OPTION_COUNT,
    },
    participant::{Id, Participant},
    session_id::SessionId,
};

/// A single multiple choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// Identifier of the question
    #[garde(skip)]
    pub id: Id,
    /// The question text shown to players
    #[garde(length(max = MAX_QUESTION_LENGTH))]
    pub question: String,
    /// Answer options in display order
    #[garde(length(min = OPTION_COUNT, max = OPTION_COUNT), inner(length(max = MAX_OPTION_LENGTH)))]
    pub options: Vec<String>,
    /// The option text that is correct
    #[garde(length(max = MAX_OPTION_LENGTH))]
    pub correct_answer: String,
}

/// A hosted quiz with its questions and current roster
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizSession {
    /// Identifier issued by the session store
    #[garde(skip)]
    pub id: SessionId,
    /// Title shown at the top of the host view
    #[garde(length(max = MAX_TITLE_LENGTH))]
    pub title: String,
    /// Questions in the order they are presented
    #[garde(length(max = MAX_QUESTION_COUNT), dive)]
    pub questions: Vec<QuizQuestion>,
    /// Participants known when the session was loaded
    #[garde(skip)]
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// When the session was created
    #[garde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Errors reported when a question or quiz fails authoring checks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A length or count limit was exceeded
    #[error("{0}")]
    Limits(String),
    /// The question text is empty
    #[error("question text cannot be empty")]
    BlankQuestion,
    /// An option is empty
    #[error("option {} cannot be empty", .0 + 1)]
    BlankOption(usize),
    /// The correct answer is not one of the options
    #[error("correct answer must be one of the options")]
    CorrectAnswerNotAnOption,
    /// The quiz has no title
    #[error("quiz title cannot be empty")]
    BlankTitle,
    /// The quiz has no questions
    #[error("quiz must contain at least one question")]
    NoQuestions,
}

impl From<garde::Report> for Error {
    fn from(report: garde::Report) -> Self {
        Self::Limits(report.to_string())
    }
}

impl QuizQuestion {
    /// Creates a question with a fresh identifier
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: Id::new(),
            question: question.into(),
            options,
            correct_answer: correct_answer.into(),
        }
    }

    /// Checks the question the way the authoring view does before saving
    ///
    /// # Errors
    ///
    /// * `Error::BlankQuestion` - the question text is blank
    /// * `Error::BlankOption` - one of the options is blank
    /// * `Error::Limits` - wrong number of options or a text is too long
    /// * `Error::CorrectAnswerNotAnOption` - the correct answer is blank or
    ///   does not match any option
    pub fn check(&self) -> Result<(), Error> {
        if self.question.trim().is_empty() {
            return Err(Error::BlankQuestion);
        }
        if let Some(position) = self.options.iter().position(|o| o.trim().is_empty()) {
            return Err(Error::BlankOption(position));
        }
        self.validate()?;
        if self.correct_answer.trim().is_empty() || !self.options.contains(&self.correct_answer) {
            return Err(Error::CorrectAnswerNotAnOption);
        }
        Ok(())
    }

    /// Returns the index of the correct option, if it is present
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_answer)
    }

    /// Returns whether the given answer text is the correct one
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

impl QuizSession {
    /// Number of questions in the session
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the session has no questions
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Checks the session before it is handed to the store for hosting
    ///
    /// # Errors
    ///
    /// Returns `Error::BlankTitle` or `Error::NoQuestions` for an incomplete
    /// session, `Error::Limits` when a limit is exceeded, and otherwise the
    /// first error reported by [`QuizQuestion::check`].
    pub fn check(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::BlankTitle);
        }
        if self.questions.is_empty() {
            return Err(Error::NoQuestions);
        }
        self.validate()?;
        self.questions.iter().try_for_each(QuizQuestion::check)
    }
}
