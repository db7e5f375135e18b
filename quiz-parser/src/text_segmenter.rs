use tracing::trace;

use crate::error::ParseError;
use crate::grammar::{match_option, match_question};
use crate::unified_blocks::{Paragraph, TextRun};

/// One option line (plus continuation lines) inside a question block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    pub raw_label: String,
    /// Runs after the label; continuation lines are appended with a separating space.
    pub content: Vec<TextRun>,
    pub source_index: usize,
}

impl OptionEntry {
    pub fn text(&self) -> String {
        self.content.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A question as found in the source, before the answer is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBlock {
    /// 1-based position among the detected blocks.
    pub ordinal: usize,
    /// The number written after the keyword (`Câu 7:` -> 7).
    pub number: Option<u32>,
    pub stem_lines: Vec<String>,
    pub options: Vec<OptionEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekQuestion,
    InStem,
    InOptions,
}

/// Single forward pass over the line stream, partitioning it into question blocks.
///
/// - A question marker closes the open block (whatever the state) and opens a new one.
/// - In the stem, non-option lines extend the stem; the first option line starts the options.
/// - In the options, option lines open a new entry and other lines continue the last entry.
/// - Anything before the first question marker is preamble and ignored.
pub fn segment_paragraphs(paragraphs: &[Paragraph], max_options: usize) -> Result<Vec<QuestionBlock>, ParseError> {
    let mut blocks: Vec<QuestionBlock> = Vec::new();
    let mut current: Option<QuestionBlock> = None;
    let mut state = State::SeekQuestion;

    for para in paragraphs {
        if para.is_blank() {
            continue;
        }
        let text = para.text();

        if let Some(marker) = match_question(&text) {
            if let Some(done) = current.take() {
                close_block(&mut blocks, done);
            }
            let mut block = QuestionBlock {
                ordinal: blocks.len() + 1,
                number: marker.number,
                stem_lines: Vec::new(),
                options: Vec::new(),
            };
            let rest = text[marker.content_start..].trim();
            if !rest.is_empty() {
                block.stem_lines.push(rest.to_string());
            }
            current = Some(block);
            state = State::InStem;
            continue;
        }

        let Some(block) = current.as_mut() else {
            trace!(line = para.source_index, "skipping preamble line");
            continue;
        };

        if let Some(marker) = match_option(&text) {
            if block.options.len() >= max_options {
                return Err(ParseError::limit_exceeded(
                    &format!("option count of question {}", block.ordinal),
                    max_options,
                ));
            }
            block.options.push(OptionEntry {
                raw_label: marker.label,
                content: para.runs_from(marker.content_start),
                source_index: para.source_index,
            });
            state = State::InOptions;
            continue;
        }

        match state {
            State::InStem => block.stem_lines.push(text.trim().to_string()),
            State::InOptions => {
                if let Some(last) = block.options.last_mut() {
                    last.content.push(TextRun::plain(" "));
                    last.content.extend(para.runs.iter().cloned());
                }
            }
            State::SeekQuestion => {}
        }
    }

    if let Some(done) = current.take() {
        close_block(&mut blocks, done);
    }
    Ok(blocks)
}

fn close_block(blocks: &mut Vec<QuestionBlock>, block: QuestionBlock) {
    trace!(
        ordinal = block.ordinal,
        number = ?block.number,
        options = block.options.len(),
        "closed question block"
    );
    blocks.push(block);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<Paragraph> {
        text.lines()
            .enumerate()
            .map(|(i, l)| Paragraph::new(vec![TextRun::plain(l)], i + 1))
            .collect()
    }

    #[test]
    fn blocks_keep_ordinal_and_written_number() {
        let blocks = segment_paragraphs(&lines("intro\nCâu 7: x\na. y\nb. z\nCâu 9: w\n1. v"), 16).expect("segments");
        assert_eq!(blocks.len(), 2);
        assert_eq!((blocks[0].ordinal, blocks[0].number), (1, Some(7)));
        assert_eq!((blocks[1].ordinal, blocks[1].number), (2, Some(9)));
        assert_eq!(blocks[0].options.len(), 2);
        assert_eq!(blocks[1].options[0].raw_label, "1");
    }
}
