use quiz_model::{ParseResult, Question, SkippedQuestion};
use tracing::debug;

use crate::error::GrammarError;

pub const EMPTY_RESULT_MESSAGE: &str = "no valid questions found";

/// Aggregates valid questions and per-question failures into one `ParseResult`.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    questions: Vec<Question>,
    skipped: Vec<SkippedQuestion>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, question: Question) {
        self.questions.push(question);
    }

    pub fn skip(&mut self, ordinal: usize, reason: GrammarError) {
        debug!(ordinal, %reason, "skipping question block");
        self.skipped.push(SkippedQuestion { ordinal, reason: reason.to_string() });
    }

    pub fn record(&mut self, ordinal: usize, outcome: Result<Question, GrammarError>) {
        match outcome {
            Ok(q) => self.accept(q),
            Err(reason) => self.skip(ordinal, reason),
        }
    }

    pub fn finish(self) -> ParseResult {
        let total_parsed = self.questions.len();
        let success = total_parsed > 0;
        let error = if success {
            None
        } else if self.skipped.is_empty() {
            Some(EMPTY_RESULT_MESSAGE.to_string())
        } else {
            Some(format!(
                "{EMPTY_RESULT_MESSAGE}: {} question block(s) skipped, first at #{}: {}",
                self.skipped.len(),
                self.skipped[0].ordinal,
                self.skipped[0].reason
            ))
        };
        ParseResult { success, questions: self.questions, error, total_parsed, skipped: self.skipped }
    }
}
