//! Study material generation
//!
//! Flashcards, notes, key points, quiz questions and flowcharts are all
//! produced by prompting a text generation service and picking the JSON it
//! embeds in its answer. The service sits behind [`TextGenerator`] so the
//! parsing can be exercised without a network.

pub mod common;
pub mod flowchart;
pub mod gemini;
pub mod generate;
pub mod study;

pub use common::{Error, TextGenerator};
pub use generate::Generator;
