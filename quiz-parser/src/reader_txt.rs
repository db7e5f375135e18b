use encoding_rs::Encoding;

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::unified_blocks::{Paragraph, TextRun};

/// Paired delimiters that stand in for bold in plain text.
const MARKERS: [&str; 2] = ["**", "__"];

/// Read a plain-text upload into one paragraph per non-blank line.
/// Text wrapped in `**...**` or `__...__` becomes a bold run with the markers removed.
pub fn read_txt_to_paragraphs(bytes: &[u8], config: &ParserConfig) -> Result<Vec<Paragraph>, ParseError> {
    let mut text = decode_text(bytes, config.text_encoding.as_deref())?;
    // Normalize CRLF/CR to LF
    if text.contains('\r') {
        text = text.replace("\r\n", "\n").replace('\r', "\n");
    }

    let mut out: Vec<Paragraph> = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if out.len() >= config.max_paragraphs {
            return Err(ParseError::limit_exceeded("line count", config.max_paragraphs));
        }
        out.push(Paragraph::new(split_marked_runs(line), i + 1));
    }
    Ok(out)
}

/// Decode with an explicit label, else BOM, else UTF-8, else windows-1258.
fn decode_text(bytes: &[u8], encoding: Option<&str>) -> Result<String, ParseError> {
    if let Some(label) = encoding {
        let enc = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| ParseError::format(format!("unknown text encoding {label:?}")))?;
        // decode() still honors a BOM when one is present
        let (cow, _enc_used, _had_errors) = enc.decode(bytes);
        return Ok(cow.into_owned());
    }
    if let Some((enc, bom_len)) = Encoding::for_bom(bytes) {
        let (cow, _had_errors) = enc.decode_without_bom_handling(&bytes[bom_len..]);
        return Ok(cow.into_owned());
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        Err(_) => {
            let (cow, _enc_used, _had_errors) = encoding_rs::WINDOWS_1258.decode(bytes);
            Ok(cow.into_owned())
        }
    }
}

/// Split a line into runs; paired markers delimit bold spans.
/// An opening marker with no partner on the same line is kept as literal text,
/// and a backslash right before a marker (`\**`, `\__`) makes it literal.
pub fn split_marked_runs(line: &str) -> Vec<TextRun> {
    let pieces = tokenize(line);
    let mut runs: Vec<TextRun> = Vec::new();
    let mut plain = String::new();

    let mut i = 0;
    while i < pieces.len() {
        match pieces[i] {
            Piece::Text(ref text) => plain.push_str(text),
            Piece::Marker(marker) => {
                let close = pieces[i + 1..].iter().position(|p| *p == Piece::Marker(marker));
                match close {
                    Some(len) if len > 0 => {
                        if !plain.is_empty() {
                            runs.push(TextRun::plain(std::mem::take(&mut plain)));
                        }
                        let bold: String = pieces[i + 1..i + 1 + len].iter().map(Piece::as_str).collect();
                        runs.push(TextRun::bold(bold));
                        i += len + 2;
                        continue;
                    }
                    _ => plain.push_str(marker),
                }
            }
        }
        i += 1;
    }
    if !plain.is_empty() {
        runs.push(TextRun::plain(plain));
    }
    runs
}

/// Escape every marker in `text` so [`split_marked_runs`] reads it back literally.
pub fn escape_markers(text: &str) -> String {
    MARKERS
        .iter()
        .fold(text.to_string(), |acc, m| acc.replace(m, &format!("{ESCAPE}{m}")))
}

const ESCAPE: char = '\\';

#[derive(Debug, PartialEq, Eq)]
enum Piece {
    Text(String),
    Marker(&'static str),
}

impl Piece {
    fn as_str(&self) -> &str {
        match self {
            Piece::Text(text) => text,
            Piece::Marker(marker) => marker,
        }
    }
}

/// Literal text and unescaped markers, left to right.
fn tokenize(line: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut rest = line;

    while let Some((pos, marker)) = next_marker(rest) {
        let before = &rest[..pos];
        match before.strip_suffix(ESCAPE) {
            Some(literal) => {
                text.push_str(literal);
                text.push_str(marker);
            }
            None => {
                text.push_str(before);
                if !text.is_empty() {
                    pieces.push(Piece::Text(std::mem::take(&mut text)));
                }
                pieces.push(Piece::Marker(marker));
            }
        }
        rest = &rest[pos + marker.len()..];
    }
    text.push_str(rest);
    if !text.is_empty() {
        pieces.push(Piece::Text(text));
    }
    pieces
}

fn next_marker(s: &str) -> Option<(usize, &'static str)> {
    MARKERS
        .iter()
        .filter_map(|m| s.find(m).map(|pos| (pos, *m)))
        .min_by_key(|(pos, _)| *pos)
}
