//! Generating study materials from source text

use serde::Serialize;

use super::{
    common::{Error, TextGenerator},
    flowchart::{self, Flowchart},
    study::{self, Flashcard, Notes},
};
use crate::{constants::quiz::DEFAULT_QUESTION_COUNT, quiz::QuizQuestion};

/// Flashcards and notes generated together from one text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyMaterials {
    /// Question and answer cards
    pub flashcards: Vec<Flashcard>,
    /// Study notes
    pub notes: Notes,
}

/// Summary and key points of a video transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptDigest {
    /// Short plain-text summary
    pub summary: String,
    /// The main points, in order
    pub key_points: Vec<String>,
}

/// Produces study materials through a text generation service
#[derive(Debug, Clone)]
pub struct Generator<G> {
    generator: G,
}

impl<G: TextGenerator> Generator<G> {
    /// Wraps a text generation service
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// The wrapped service
    pub fn inner(&self) -> &G {
        &self.generator
    }

    /// Generates a flowchart of `text`
    ///
    /// Never fails: if the service cannot be reached or its answer cannot be
    /// read, the fixed fallback diagram is returned instead.
    pub fn flowchart(&self, text: &str) -> Flowchart {
        let result = self
            .generator
            .generate(&flowchart::prompt(text))
            .and_then(|response| flowchart::parse_response(&response, text));

        result.unwrap_or_else(|error| {
            tracing::warn!(%error, "flowchart generation failed, using fallback");
            flowchart::fallback(text)
        })
    }

    /// Generates a flowchart from previously extracted key points
    pub fn flowchart_from_key_points(&self, key_points: &[String]) -> Flowchart {
        self.flowchart(&key_points.join("\n\n"))
    }

    /// Generates up to `count` checked quiz questions about `text`
    ///
    /// # Errors
    ///
    /// Returns the service's error, or a parse error if no usable question
    /// came back.
    pub fn quiz(&self, text: &str, count: usize) -> Result<Vec<QuizQuestion>, Error> {
        let response = self.generator.generate(&study::quiz_prompt(text, count))?;
        let questions = study::parse_quiz_questions(&response, count)?;
        if questions.len() < count {
            tracing::info!(
                requested = count,
                usable = questions.len(),
                "fewer quiz questions than requested"
            );
        }
        Ok(questions)
    }

    /// Generates the usual number of quiz questions about `text`
    ///
    /// # Errors
    ///
    /// As for [`Generator::quiz`].
    pub fn default_quiz(&self, text: &str) -> Result<Vec<QuizQuestion>, Error> {
        self.quiz(text, DEFAULT_QUESTION_COUNT)
    }

    /// Generates flashcards about `text`
    ///
    /// # Errors
    ///
    /// Returns the service's error or a parse error.
    pub fn flashcards(&self, text: &str) -> Result<Vec<Flashcard>, Error> {
        let response = self.generator.generate(&study::flashcards_prompt(text))?;
        study::parse_flashcards(&response)
    }

    /// Generates study notes about `text`
    ///
    /// # Errors
    ///
    /// Returns the service's error or a parse error.
    pub fn notes(&self, text: &str) -> Result<Notes, Error> {
        let response = self.generator.generate(&study::notes_prompt(text))?;
        study::parse_notes(&response)
    }

    /// Generates the key points of `text`
    ///
    /// # Errors
    ///
    /// Returns the service's error or a parse error.
    pub fn key_points(&self, text: &str) -> Result<Vec<String>, Error> {
        let response = self.generator.generate(&study::key_points_prompt(text))?;
        study::parse_key_points(&response)
    }

    /// Generates a plain-text summary of `text`
    ///
    /// # Errors
    ///
    /// Returns the service's error, or `Error::MissingField` for a blank
    /// answer.
    pub fn summary(&self, text: &str) -> Result<String, Error> {
        let response = self.generator.generate(&study::summary_prompt(text))?;
        let summary = response.trim();
        if summary.is_empty() {
            return Err(Error::MissingField("summary"));
        }
        Ok(summary.to_owned())
    }

    /// Generates flashcards and notes for the same text
    ///
    /// # Errors
    ///
    /// Returns the first error from either generation.
    pub fn study_materials(&self, text: &str) -> Result<StudyMaterials, Error> {
        Ok(StudyMaterials {
            flashcards: self.flashcards(text)?,
            notes: self.notes(text)?,
        })
    }

    /// Generates the summary and key points of a transcript
    ///
    /// # Errors
    ///
    /// Returns the first error from either generation.
    pub fn transcript_digest(&self, transcript: &str) -> Result<TranscriptDigest, Error> {
        Ok(TranscriptDigest {
            summary: self.summary(transcript)?,
            key_points: self.key_points(transcript)?,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::content::common::tests::Scripted;

    #[test]
    fn test_flowchart_generated() {
        let generator = Generator::new(Scripted::answering(&[
            r#"{"title": "Water Cycle", "mermaidCode": "A --> B"}"#,
        ]));
        let chart = generator.flowchart("evaporation and rain");

        assert_eq!(chart.title, "Water Cycle");
        assert_eq!(chart.mermaid_code, "graph TD\nA[A] --> B[B]");
        assert!(generator.inner().prompts.borrow()[0].ends_with("Content: evaporation and rain"));
    }

    #[test]
    fn test_flowchart_falls_back_on_service_error() {
        let generator = Generator::new(Scripted::new([Err(Error::Status(500))]));
        let chart = generator.flowchart("anything");

        assert!(chart.is_fallback());
        assert_eq!(chart.content, "anything");
    }

    #[test]
    fn test_flowchart_falls_back_on_unreadable_answer() {
        let generator = Generator::new(Scripted::answering(&["I drew it for you!"]));
        assert!(generator.flowchart("anything").is_fallback());
    }

    #[test]
    fn test_flowchart_from_key_points() {
        let generator = Generator::new(Scripted::answering(&[r#"{"mermaidCode": "graph TD"}"#]));
        generator.flowchart_from_key_points(&["One".to_owned(), "Two".to_owned()]);

        assert!(generator.inner().prompts.borrow()[0].ends_with("Content: One\n\nTwo"));
    }

    #[test]
    fn test_quiz() {
        let generator = Generator::new(Scripted::answering(&[
            r#"[{"question": "2 + 2?", "options": ["3", "4", "5", "6"], "correctAnswer": "4"}]"#,
        ]));
        let questions = generator.quiz("arithmetic", 5).unwrap();

        assert_eq!(questions.len(), 1);
        assert!(questions[0].is_correct("4"));
    }

    #[test]
    fn test_default_quiz_prompt() {
        let generator = Generator::new(Scripted::new([Err(Error::Status(500))]));
        assert!(generator.default_quiz("history").is_err());
        assert!(generator.inner().prompts.borrow()[0].starts_with("Create 5 multiple choice"));
    }

    #[test]
    fn test_quiz_service_error() {
        let generator = Generator::new(Scripted::new([Err(Error::Status(429))]));
        assert!(matches!(
            generator.quiz("arithmetic", 5),
            Err(Error::Status(429))
        ));
    }

    #[test]
    fn test_study_materials() {
        let generator = Generator::new(Scripted::answering(&[
            r#"[{"question": "Q", "answer": "A"}]"#,
            r#"["Note one.", "Note two."]"#,
        ]));
        let materials = generator.study_materials("text").unwrap();

        assert_eq!(materials.flashcards.len(), 1);
        assert_eq!(materials.notes.paragraphs(), ["Note one.", "Note two."]);
    }

    #[test]
    fn test_study_materials_stops_at_first_error() {
        let generator = Generator::new(Scripted::new([Err(Error::Status(500))]));
        assert!(generator.study_materials("text").is_err());
        assert_eq!(generator.inner().prompts.borrow().len(), 1);
    }

    #[test]
    fn test_transcript_digest() {
        let generator = Generator::new(Scripted::answering(&[
            "  A short summary.  ",
            r#"["Point A", "Point B"]"#,
        ]));
        let digest = generator.transcript_digest("transcript").unwrap();

        assert_eq!(digest.summary, "A short summary.");
        assert_eq!(digest.key_points, ["Point A", "Point B"]);
    }

    #[test]
    fn test_blank_summary() {
        let generator = Generator::new(Scripted::answering(&["   "]));
        assert!(matches!(
            generator.summary("text"),
            Err(Error::MissingField(_))
        ));
    }
}
