/// A span of text with its bold state, as produced by the readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: true }
    }

    /// Bold with at least one visible character.
    pub fn is_marked(&self) -> bool {
        self.bold && !self.text.trim().is_empty()
    }
}

/// A unified representation of one logical line from the DOCX or plain-text readers.
/// Run boundaries are kept as read; text is never merged before bold detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    /// 1-based position in the source (paragraph line for DOCX, line number for text).
    pub source_index: usize,
}

impl Paragraph {
    pub fn new(runs: Vec<TextRun>, source_index: usize) -> Self {
        Self { runs, source_index }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    /// Runs covering `text()[offset..]`. A run straddling `offset` is split there.
    /// `offset` must fall on a char boundary of `text()`.
    pub fn runs_from(&self, offset: usize) -> Vec<TextRun> {
        let mut out = Vec::new();
        let mut start = 0usize;
        for run in &self.runs {
            let end = start + run.text.len();
            if end > offset {
                if start >= offset {
                    out.push(run.clone());
                } else {
                    let cut = offset - start;
                    out.push(TextRun { text: run.text[cut..].to_string(), bold: run.bold });
                }
            }
            start = end;
        }
        out
    }
}
