//! Line grammar shared by the DOCX and plain-text paths.
//!
//! The patterns are compiled once per process and only read afterwards.

use std::sync::OnceLock;

use regex::Regex;

/// `Câu 3:`, `Question 12.`, `Q1:`, `câu hỏi 2.`; case-insensitive, decomposed `â` accepted.
const QUESTION_PATTERN: &str =
    r"(?i)^\s*(?:c(?:â|a\x{0302}|a)u(?:\s+h(?:ỏ|o)i)?|question|q)\s*(\d{1,5})\s*[:.]\s*";

/// `a. `, `B) `, `3. ` followed by whitespace or end of line.
const OPTION_PATTERN: &str = r"^\s*([A-Da-d1-4])[.)](?:\s+|$)";

struct Patterns {
    question: Regex,
    option: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        question: Regex::new(QUESTION_PATTERN).expect("question pattern compiles"),
        option: Regex::new(OPTION_PATTERN).expect("option pattern compiles"),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionMarker {
    pub number: Option<u32>,
    /// Byte offset where the stem text begins.
    pub content_start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionMarker {
    pub label: String,
    /// Byte offset where the option text begins.
    pub content_start: usize,
}

pub fn match_question(line: &str) -> Option<QuestionMarker> {
    let caps = patterns().question.captures(line)?;
    let whole = caps.get(0)?;
    let number = caps.get(1).and_then(|m| m.as_str().parse().ok());
    Some(QuestionMarker { number, content_start: whole.end() })
}

pub fn match_option(line: &str) -> Option<OptionMarker> {
    let caps = patterns().option.captures(line)?;
    let whole = caps.get(0)?;
    let label = caps.get(1)?.as_str().to_string();
    Some(OptionMarker { label, content_start: whole.end() })
}
