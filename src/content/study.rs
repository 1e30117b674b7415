//! Flashcards, notes, key points and quiz questions
//!
//! Each kind of material has a prompt and a parser for the generation
//! service's answer. The parsers are lenient about the prose around the
//! JSON but strict about what ends up in the returned values.

use serde::{Deserialize, Serialize};

use super::common::{Error, extract_json_array};
use crate::{participant::Id, quiz::QuizQuestion};

/// A question and answer pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    /// Identifier of the card
    pub id: Id,
    /// Front of the card
    pub question: String,
    /// Back of the card
    pub answer: String,
}

/// A titled section of structured notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesItem {
    /// Identifier of the section
    pub id: Id,
    /// Section heading
    pub title: String,
    /// Section body
    pub content: String,
}

/// Notes as produced by the generation service
///
/// The service answers either with free text or with titled sections; which
/// one it was is decided once, when the answer is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "notes")]
pub enum Notes {
    /// Free text, paragraphs separated by blank lines
    PlainText(String),
    /// Titled sections
    StructuredNotes(Vec<NotesItem>),
}

impl Notes {
    /// The notes as display paragraphs
    ///
    /// Free text is split on blank lines; structured notes give one
    /// paragraph per section body.
    pub fn paragraphs(&self) -> Vec<String> {
        match self {
            Self::PlainText(text) => text
                .split("\n\n")
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect(),
            Self::StructuredNotes(items) => items.iter().map(|i| i.content.clone()).collect(),
        }
    }

    /// Whether there is nothing to show
    pub fn is_empty(&self) -> bool {
        self.paragraphs().is_empty()
    }
}

impl Default for Notes {
    fn default() -> Self {
        Self::PlainText(String::new())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: String,
}

#[derive(Deserialize)]
struct GeneratedFlashcard {
    question: String,
    answer: String,
}

#[derive(Deserialize)]
struct GeneratedNote {
    #[serde(default)]
    title: String,
    content: String,
}

/// Prompt asking for `count` multiple choice questions about `text`
pub fn quiz_prompt(text: &str, count: usize) -> String {
    format!(
        r#"Create {count} multiple choice quiz questions based on the following content. Respond with a JSON array only. Each element must be an object with the fields "question", "options" (an array of exactly 4 distinct answer strings) and "correctAnswer" (one of the options, copied exactly).

Content: {text}"#
    )
}

/// Prompt asking for flashcards about `text`
pub fn flashcards_prompt(text: &str) -> String {
    format!(
        r#"Create study flashcards from the following content. Respond with a JSON array only. Each element must be an object with the fields "question" and "answer". Keep answers short.

Content: {text}"#
    )
}

/// Prompt asking for study notes about `text`
pub fn notes_prompt(text: &str) -> String {
    format!(
        r#"Write concise study notes for the following content. Respond with a JSON array only. Each element must be an object with the fields "title" (a short heading) and "content" (one paragraph).

Content: {text}"#
    )
}

/// Prompt asking for the key points of `text`
pub fn key_points_prompt(text: &str) -> String {
    format!(
        r#"List the key points of the following content. Respond with a JSON array of strings only, one point per element.

Content: {text}"#
    )
}

/// Prompt asking for a summary of `text`
pub fn summary_prompt(text: &str) -> String {
    format!(
        "Summarize the following content in a few short paragraphs of plain \
         text.\n\nContent: {text}"
    )
}

fn array<'a>(response: &'a str, what: &'static str) -> Result<&'a str, Error> {
    extract_json_array(response).ok_or(Error::MissingField(what))
}

/// Reads generated quiz questions, keeping at most `count` usable ones
///
/// Questions that fail [`QuizQuestion::check`] are dropped.
///
/// # Arguments
///
/// * `response` - The raw answer of the generation service
/// * `count` - The number of questions that were asked for
///
/// # Errors
///
/// Returns `Error::MissingField` if the answer has no JSON array,
/// `Error::Malformed` if it cannot be read, or if no question survives.
pub fn parse_quiz_questions(response: &str, count: usize) -> Result<Vec<QuizQuestion>, Error> {
    let generated: Vec<GeneratedQuestion> =
        serde_json::from_str(array(response, "question list")?)?;
    let questions: Vec<QuizQuestion> = generated
        .into_iter()
        .map(|g| QuizQuestion::new(g.question.trim(), g.options, g.correct_answer))
        .filter(|q| match q.check() {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(%error, question = %q.question, "dropping generated question");
                false
            }
        })
        .take(count)
        .collect();

    if questions.is_empty() {
        return Err(Error::Malformed("no usable questions".to_owned()));
    }
    Ok(questions)
}

/// Reads generated flashcards, dropping cards with a blank side
///
/// # Errors
///
/// Returns `Error::MissingField` if the answer has no JSON array, or
/// `Error::Malformed` if it cannot be read.
pub fn parse_flashcards(response: &str) -> Result<Vec<Flashcard>, Error> {
    let generated: Vec<GeneratedFlashcard> =
        serde_json::from_str(array(response, "flashcard list")?)?;
    Ok(generated
        .into_iter()
        .filter(|g| !g.question.trim().is_empty() && !g.answer.trim().is_empty())
        .map(|g| Flashcard {
            id: Id::new(),
            question: g.question.trim().to_owned(),
            answer: g.answer.trim().to_owned(),
        })
        .collect())
}

/// Reads generated notes
///
/// * a JSON array of objects gives [`Notes::StructuredNotes`]
/// * a JSON array of strings gives [`Notes::PlainText`], joined by blank
///   lines
/// * a JSON string, or any other text, gives [`Notes::PlainText`]
///
/// # Errors
///
/// Returns `Error::Malformed` if an array mixes strings and objects, or
/// `Error::MissingField` if the answer is blank.
pub fn parse_notes(response: &str) -> Result<Notes, Error> {
    if let Some(json) = extract_json_array(response) {
        if let Ok(paragraphs) = serde_json::from_str::<Vec<String>>(json) {
            return Ok(Notes::PlainText(paragraphs.join("\n\n")));
        }
        let generated: Vec<GeneratedNote> = serde_json::from_str(json)?;
        return Ok(Notes::StructuredNotes(
            generated
                .into_iter()
                .map(|g| NotesItem {
                    id: Id::new(),
                    title: g.title,
                    content: g.content,
                })
                .collect(),
        ));
    }

    let text = serde_json::from_str::<String>(response.trim())
        .unwrap_or_else(|_| response.trim().to_owned());
    if text.trim().is_empty() {
        return Err(Error::MissingField("notes"));
    }
    Ok(Notes::PlainText(text))
}

/// Reads generated key points
///
/// A JSON array of strings is preferred. Without one, each non-empty line
/// of the answer is a point, with list markers removed.
///
/// # Errors
///
/// Returns `Error::Malformed` if an array is present but is not a list of
/// strings, or `Error::MissingField` if no point was found.
pub fn parse_key_points(response: &str) -> Result<Vec<String>, Error> {
    let points: Vec<String> = match extract_json_array(response) {
        Some(json) => serde_json::from_str(json)?,
        None => response
            .lines()
            .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
            .map(str::to_owned)
            .collect(),
    };
    let points: Vec<String> = points
        .into_iter()
        .map(|p| p.trim().to_owned())
        .filter(|p| !p.is_empty())
        .collect();

    if points.is_empty() {
        return Err(Error::MissingField("key points"));
    }
    Ok(points)
}
