use quiz_model::{Question, QuestionOption};

use crate::answer_resolver::ResolvedBlock;
use crate::error::GrammarError;

/// Validates resolved blocks and turns them into questions with sequential ids.
/// Ids are only consumed by valid blocks, so they stay dense within one result.
#[derive(Debug, Default)]
pub struct Normalizer {
    issued: usize,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, block: ResolvedBlock) -> Result<Question, GrammarError> {
        let stem = clean_text(&block.stem);
        if stem.is_empty() {
            return Err(GrammarError::MissingStem);
        }
        if block.options.len() < 2 {
            return Err(GrammarError::TooFewOptions { found: block.options.len() });
        }
        let texts: Vec<String> = block.options.iter().map(|o| clean_text(&o.text)).collect();
        if let Some(index) = texts.iter().position(|t| t.is_empty()) {
            return Err(GrammarError::EmptyOption { index });
        }
        match block.options.iter().filter(|o| o.is_correct).count() {
            0 => return Err(GrammarError::NoCorrectAnswer),
            1 => {}
            marked => return Err(GrammarError::AmbiguousAnswer { marked }),
        }

        self.issued += 1;
        let id = format!("q{}", self.issued);
        let options = texts
            .into_iter()
            .zip(block.options.iter())
            .enumerate()
            .map(|(i, (text, o))| QuestionOption::new(format!("{id}_opt_{i}"), text, o.is_correct))
            .collect();
        Ok(Question { id, text: stem, options })
    }
}

/// Per line: non-breaking spaces to spaces, whitespace runs collapsed, ends trimmed.
/// Blank lines are dropped; remaining lines are joined with `\n`.
pub fn clean_text(s: &str) -> String {
    s.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
