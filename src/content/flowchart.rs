//! Generated flowcharts
//!
//! The generation service is asked for a top-down diagram in the renderer's
//! markup. What comes back is often slightly off, so [`sanitize`] applies a
//! handful of textual fixes before the code reaches the renderer. It is a
//! heuristic and nothing more: the markup is never parsed, and anything that
//! goes wrong during generation yields [`fallback`] instead.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::common::{Error, extract_json_object};
use crate::{
    constants::flowchart::{DEFAULT_TITLE, FALLBACK_CODE, FALLBACK_TITLE, HEADER},
    participant::Id,
};

static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").expect("valid label pattern"));

static INDENTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s+").expect("valid indentation pattern"));

/// A generated diagram with the text it was generated from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flowchart {
    /// Identifier of the diagram
    pub id: Id,
    /// Short descriptive title
    pub title: String,
    /// Diagram markup handed to the renderer
    pub mermaid_code: String,
    /// The source text
    pub content: String,
    /// When the diagram was generated
    pub created_at: DateTime<Utc>,
}

impl Flowchart {
    fn new(title: String, mermaid_code: String, content: &str) -> Self {
        Self {
            id: Id::new(),
            title,
            mermaid_code,
            content: content.to_owned(),
            created_at: Utc::now(),
        }
    }

    /// Whether this is the fixed diagram used when generation fails
    pub fn is_fallback(&self) -> bool {
        self.title == FALLBACK_TITLE && self.mermaid_code == FALLBACK_CODE
    }
}

/// The prompt asking for a diagram of `text`
pub fn prompt(text: &str) -> String {
    format!(
        r#"Generate a Mermaid.js flowchart diagram based on the following content. Focus on creating a hierarchical structure with main topics and subtopics. Format your response with a JSON object containing two fields: "title" - a short descriptive title for the flowchart (max 5 words), and "mermaidCode" - the complete Mermaid.js code for the flowchart.

Important guidelines for valid Mermaid.js syntax:
1. Use "graph TD" (top-down) syntax
2. Each node must have a unique ID (like A, B, C or node1, node2)
3. Node text must be wrapped in square brackets: A[Node text]
4. Connections must use -- or --> syntax: A --> B
5. Keep the syntax simple and avoid advanced features
6. DO NOT use parentheses for node labels, use square brackets
7. Each relationship must be on its own line
8. NO line breaks within node text

Example of CORRECT syntax:
graph TD
    A[Main Topic] --> B[Subtopic 1]
    A --> C[Subtopic 2]
    B --> D[Detail 1]
    B --> E[Detail 2]

Content: {text}"#
    )
}

fn bracket(endpoint: &str) -> String {
    if endpoint.contains('[') {
        endpoint.to_owned()
    } else {
        format!("{endpoint}[{endpoint}]")
    }
}

fn fix_line(line: &str) -> String {
    if line.contains('[') && line.contains(']') {
        return line.to_owned();
    }
    match line.split("-->").map(str::trim).collect::<Vec<_>>().as_slice() {
        [source, target] => format!("{} --> {}", bracket(source), bracket(target)),
        _ => line.to_owned(),
    }
}

/// Applies best-effort fixes to generated diagram markup
///
/// In order:
///
/// 1. `(label)` becomes `[label]`
/// 2. indentation after line breaks is removed, which also drops blank lines
/// 3. literal `\n` escapes become spaces
/// 4. surrounding whitespace is trimmed
/// 5. `graph TD` is prepended if missing
/// 6. on lines without brackets, both endpoints of a single `A --> B` edge
///    get a label equal to their id
/// 7. empty lines are dropped
///
/// Lines that already carry brackets are left alone, even if only one
/// endpoint is labelled.
pub fn sanitize(code: &str) -> String {
    let code = PARENTHESIZED.replace_all(code, "[${1}]");
    let code = INDENTATION.replace_all(&code, "\n");
    let code = code.replace("\\n", " ");
    let code = code.trim();

    let code = if code.starts_with(HEADER) {
        code.to_owned()
    } else {
        format!("{HEADER}\n{code}")
    };

    code.lines()
        .filter(|line| !line.trim().is_empty())
        .map(fix_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Generated {
    title: Option<String>,
    mermaid_code: Option<String>,
}

/// Builds a flowchart from the generation service's answer
///
/// A missing title becomes "Generated Flowchart" and missing markup is
/// sanitized from nothing.
///
/// # Arguments
///
/// * `response` - The raw answer, possibly wrapped in prose or code fences
/// * `content` - The text the flowchart was generated from
///
/// # Errors
///
/// Returns `Error::MissingField` if the answer contains no JSON object, or
/// `Error::Malformed` if the object cannot be read.
pub fn parse_response(response: &str, content: &str) -> Result<Flowchart, Error> {
    let json = extract_json_object(response).ok_or(Error::MissingField("diagram object"))?;
    let generated: Generated = serde_json::from_str(json)?;

    Ok(Flowchart::new(
        generated
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
        sanitize(generated.mermaid_code.as_deref().unwrap_or_default()),
        content,
    ))
}

/// The fixed diagram returned when generation fails
pub fn fallback(content: &str) -> Flowchart {
    Flowchart::new(FALLBACK_TITLE.to_owned(), FALLBACK_CODE.to_owned(), content)
}

/// Flowcharts saved during a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowchartRepository {
    flowcharts: Vec<Flowchart>,
}

impl FlowchartRepository {
    /// Creates an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a flowchart and returns a copy of it
    pub fn save(&mut self, flowchart: Flowchart) -> Flowchart {
        self.flowcharts.push(flowchart.clone());
        flowchart
    }

    /// Copies of every stored flowchart, oldest first
    pub fn all(&self) -> Vec<Flowchart> {
        self.flowcharts.clone()
    }

    /// A copy of the flowchart with this id
    pub fn get(&self, id: &Id) -> Option<Flowchart> {
        self.flowcharts.iter().find(|f| &f.id == id).cloned()
    }

    /// Number of stored flowcharts
    pub fn len(&self) -> usize {
        self.flowcharts.len()
    }

    /// Whether nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.flowcharts.is_empty()
    }
}
