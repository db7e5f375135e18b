use crate::error::GrammarError;
use crate::reader_excel::{TabularRow, OPTION_LETTERS};
use crate::text_segmenter::QuestionBlock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOption {
    pub text: String,
    pub is_correct: bool,
}

/// A question block with its correct answer decided, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBlock {
    pub ordinal: usize,
    pub stem: String,
    pub options: Vec<ResolvedOption>,
}

/// Bold (or marker) scan over each option's content: exactly one option must carry it.
pub fn resolve_marked(block: QuestionBlock) -> Result<ResolvedBlock, GrammarError> {
    let flags: Vec<bool> = block
        .options
        .iter()
        .map(|o| o.content.iter().any(|r| r.is_marked()))
        .collect();
    match flags.iter().filter(|&&f| f).count() {
        0 => return Err(GrammarError::NoCorrectAnswer),
        1 => {}
        marked => return Err(GrammarError::AmbiguousAnswer { marked }),
    }

    let options = block
        .options
        .iter()
        .zip(flags)
        .map(|(o, is_correct)| ResolvedOption { text: o.text(), is_correct })
        .collect();
    Ok(ResolvedBlock { ordinal: block.ordinal, stem: block.stem_lines.join("\n"), options })
}

/// Answer-column lookup against the option letters and the literal option text.
///
/// A letter (`B`, `b.`, `b)`) names a column; if the same value is also the text of a
/// different option the answer is rejected. A digit is read as the literal text first
/// and only falls back to a 1-4 position when no option carries that text.
pub fn resolve_tabular(row: TabularRow) -> Result<ResolvedBlock, GrammarError> {
    let raw = row.answer.trim();
    if raw.is_empty() {
        return Err(GrammarError::MissingAnswer);
    }
    let malformed = || GrammarError::MalformedAnswer { value: raw.to_string() };

    let wanted = raw.to_lowercase();
    let literal: Vec<usize> = row
        .options
        .iter()
        .enumerate()
        .filter(|(_, (_, text))| text.trim().to_lowercase() == wanted)
        .map(|(i, _)| i)
        .collect();
    let slot = |letter: char| row.options.iter().position(|(l, _)| *l == letter);

    let correct = match answer_letter(raw) {
        Some(letter) => match (slot(letter), literal.as_slice()) {
            (Some(i), []) => i,
            (Some(i), [j]) if i == *j => i,
            (None, [j]) => *j,
            _ => return Err(malformed()),
        },
        None => match literal.as_slice() {
            [i] => *i,
            [] => answer_position(raw).and_then(slot).ok_or_else(malformed)?,
            _ => return Err(malformed()),
        },
    };

    let options = row
        .options
        .into_iter()
        .enumerate()
        .map(|(i, (_, text))| ResolvedOption { text, is_correct: i == correct })
        .collect();
    Ok(ResolvedBlock { ordinal: row.row_number, stem: row.question, options })
}

/// Single answer character with an optional trailing `.` or `)`.
fn answer_char(raw: &str) -> Option<char> {
    let s = raw.trim_end_matches(|c: char| c == '.' || c == ')').trim();
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

/// `B`, `b`, `B.`, `b)` -> 'B'.
fn answer_letter(raw: &str) -> Option<char> {
    match answer_char(raw)?.to_ascii_uppercase() {
        l @ 'A'..='D' => Some(l),
        _ => None,
    }
}

/// `2`, `2.` -> 'B'.
fn answer_position(raw: &str) -> Option<char> {
    match answer_char(raw)? {
        d @ '1'..='4' => OPTION_LETTERS.get((d as u8 - b'1') as usize).copied(),
        _ => None,
    }
}
