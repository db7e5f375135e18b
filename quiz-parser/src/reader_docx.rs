use std::collections::HashSet;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::unified_blocks::{Paragraph, TextRun};

const DOCUMENT_MEMBER: &str = "word/document.xml";
const STYLES_MEMBER: &str = "word/styles.xml";

fn local_name<'a>(q: &'a [u8]) -> &'a [u8] {
    match q.iter().position(|&b| b == b':') { Some(i) => &q[i + 1..], None => q }
}

fn attr_val(e: &BytesStart<'_>, key_local: &[u8]) -> Option<String> {
    for a in e.attributes().with_checks(false) {
        if let Ok(attr) = a {
            let k = local_name(attr.key.as_ref());
            if k == key_local {
                return Some(String::from_utf8_lossy(&attr.value).into_owned());
            }
        }
    }
    None
}

/// WML toggle (`w:b`, `w:i`, ...): present without `val`, or with any value but 0/false/off.
fn toggle_on(e: &BytesStart<'_>) -> bool {
    match attr_val(e, b"val") {
        None => true,
        Some(v) => !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off"),
    }
}

/// Opens the zip, parses word/document.xml and yields one paragraph per logical line,
/// each a sequence of runs carrying their bold state.
pub fn read_docx_to_paragraphs(bytes: &[u8], config: &ParserConfig) -> Result<Vec<Paragraph>, ParseError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ParseError::format(format!("not a valid .docx (zip) file: {e}")))?;

    let mut budget = config.max_decompressed_bytes;
    let doc_xml = read_member(&mut zip, DOCUMENT_MEMBER, &mut budget)?
        .ok_or_else(|| ParseError::format(format!("missing {DOCUMENT_MEMBER}")))?;
    let bold_styles = match read_member(&mut zip, STYLES_MEMBER, &mut budget)? {
        Some(styles_xml) => bold_character_styles(&styles_xml),
        None => HashSet::new(),
    };
    debug!(bytes = doc_xml.len(), bold_styles = bold_styles.len(), "loaded document.xml");

    parse_document_xml(&doc_xml, &bold_styles, config.max_paragraphs)
}

/// Read one archive member, charging its inflated size against `budget`.
fn read_member(
    zip: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
    budget: &mut usize,
) -> Result<Option<String>, ParseError> {
    let file = match zip.by_name(name) {
        Ok(f) => f,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(ParseError::format(format!("failed to open {name}: {e}"))),
    };
    if file.size() > *budget as u64 {
        return Err(ParseError::limit_exceeded("decompressed size", *budget));
    }
    // Declared sizes can lie; bound the actual read as well.
    let mut buf: Vec<u8> = Vec::new();
    file.take(*budget as u64 + 1)
        .read_to_end(&mut buf)
        .map_err(|e| ParseError::format(format!("failed to inflate {name}: {e}")))?;
    if buf.len() > *budget {
        return Err(ParseError::limit_exceeded("decompressed size", *budget));
    }
    *budget -= buf.len();
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Ids of character styles whose run properties switch bold on.
fn bold_character_styles(styles_xml: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    let mut reader = Reader::from_str(styles_xml);
    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    // Nesting depth of `rPr`; depth 2 is the previous formatting inside `rPrChange`
    let mut rpr_depth = 0usize;
    let mut bold = false;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"style" => {
                    let is_char = attr_val(&e, b"type").as_deref() == Some("character");
                    current = if is_char { attr_val(&e, b"styleId") } else { None };
                    bold = false;
                }
                b"rPr" => rpr_depth += 1,
                b"b" if rpr_depth == 1 && current.is_some() => bold = toggle_on(&e),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if local_name(e.name().as_ref()) == b"b" && rpr_depth == 1 && current.is_some() {
                    bold = toggle_on(&e);
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"rPr" => rpr_depth = rpr_depth.saturating_sub(1),
                b"style" => {
                    if let Some(id) = current.take() {
                        if bold { out.insert(id); }
                    }
                    bold = false;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            // styles.xml is optional; a broken one only loses style-based bold
            Err(_) => break,
            _ => {}
        }
    }
    out
}

#[derive(Default)]
struct RunState {
    text: String,
    bold: Option<bool>,
    style_bold: bool,
}

struct LineCollector {
    runs: Vec<TextRun>,
    out: Vec<Paragraph>,
    max: usize,
}

impl LineCollector {
    fn push_run(&mut self, run: &mut RunState) {
        if !run.text.is_empty() {
            let bold = run.bold.unwrap_or(run.style_bold);
            self.runs.push(TextRun { text: std::mem::take(&mut run.text), bold });
        }
    }

    fn end_line(&mut self) -> Result<(), ParseError> {
        let runs = std::mem::take(&mut self.runs);
        if runs.iter().all(|r| r.text.trim().is_empty()) {
            return Ok(());
        }
        if self.out.len() >= self.max {
            return Err(ParseError::limit_exceeded("paragraph count", self.max));
        }
        let index = self.out.len() + 1;
        self.out.push(Paragraph::new(runs, index));
        Ok(())
    }
}

fn parse_document_xml(
    doc_xml: &str,
    bold_styles: &HashSet<String>,
    max_paragraphs: usize,
) -> Result<Vec<Paragraph>, ParseError> {
    let mut reader = Reader::from_str(doc_xml);
    reader.trim_text(false);
    let mut buf = Vec::new();

    let mut lines = LineCollector { runs: Vec::new(), out: Vec::new(), max: max_paragraphs };
    let mut run = RunState::default();
    let mut in_p = false;
    let mut in_r = false;
    // Only the run's own `rPr` (depth 1) counts; depth 2 is the tracked old formatting
    let mut rpr_depth = 0usize;
    let mut in_t = false;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                match local_name(e.name().as_ref()) {
                    b"p" => {
                        // Nested paragraphs (text boxes) start a new line
                        if in_p {
                            lines.push_run(&mut run);
                            lines.end_line()?;
                        }
                        in_p = true;
                    }
                    b"r" => { in_r = true; run = RunState::default(); }
                    b"rPr" if in_r => { rpr_depth += 1; }
                    b"b" if in_r && rpr_depth == 1 => { run.bold = Some(toggle_on(&e)); }
                    b"t" if in_r => { in_t = true; }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                match local_name(e.name().as_ref()) {
                    b"b" if in_r && rpr_depth == 1 => { run.bold = Some(toggle_on(&e)); }
                    b"rStyle" if in_r && rpr_depth == 1 => {
                        if let Some(id) = attr_val(&e, b"val") {
                            run.style_bold = bold_styles.contains(&id);
                        }
                    }
                    b"tab" if in_r => { run.text.push('\t'); }
                    b"br" | b"cr" if in_r => {
                        // Soft line breaks split the paragraph into separate lines
                        lines.push_run(&mut run);
                        lines.end_line()?;
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                match local_name(e.name().as_ref()) {
                    b"t" => { in_t = false; }
                    b"rPr" if in_r => { rpr_depth = rpr_depth.saturating_sub(1); }
                    b"r" => {
                        lines.push_run(&mut run);
                        in_r = false;
                        rpr_depth = 0;
                    }
                    b"p" => {
                        if in_p {
                            lines.push_run(&mut run);
                            lines.end_line()?;
                            in_p = false;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                if in_t {
                    let s = t
                        .unescape()
                        .map_err(|e| ParseError::format(format!("malformed text in {DOCUMENT_MEMBER}: {e}")))?;
                    run.text.push_str(&s);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ParseError::format(format!(
                    "malformed {DOCUMENT_MEMBER} at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    lines.push_run(&mut run);
    lines.end_line()?;
    Ok(lines.out)
}
