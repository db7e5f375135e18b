//! Shared models returned by the exam-document parser.
//!
//! The JSON shape matches what the authoring side consumes:
//! `{ success, questions: [{ id, text, options: [{ id, text, is_correct }] }], error?, total_parsed }`.

use serde::{Deserialize, Serialize};

/// One candidate answer of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Identifier unique within one parse result (e.g. `q3_opt_1`).
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl QuestionOption {
    pub fn new(id: impl Into<String>, text: impl Into<String>, is_correct: bool) -> Self {
        Self { id: id.into(), text: text.into(), is_correct }
    }
}

/// A multiple-choice question with its options in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier unique within one parse result. Not persistent.
    pub id: String,
    /// The stem. Multi-line stems keep their line breaks.
    pub text: String,
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// Position of the first option flagged correct.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.is_correct)
    }

    pub fn correct_option(&self) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.is_correct)
    }
}

/// A question block that was dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedQuestion {
    /// 1-based block ordinal (question blocks) or sheet row number (spreadsheets).
    pub ordinal: usize,
    /// Human-readable reason.
    pub reason: String,
}

/// The single output of one parse call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub success: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub total_parsed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedQuestion>,
}

impl ParseResult {
    /// Result for a file-level failure: no questions, a single message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            questions: Vec::new(),
            error: Some(message.into()),
            total_parsed: 0,
            skipped: Vec::new(),
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
