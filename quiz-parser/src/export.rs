//! Writes questions back into the authoring convention the parser reads,
//! so an edited question set can be downloaded and re-uploaded.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use quiz_model::Question;
use zip::write::FileOptions;

use crate::error::ExportError;
use crate::reader_txt::escape_markers;

const LABELS: [char; 4] = ['a', 'b', 'c', 'd'];

/// Labels are positional when parsed back, so options past the fourth reuse a-d.
fn label(i: usize) -> char {
    LABELS[i % LABELS.len()]
}

/// `Câu N: stem` followed by `a. option` lines; the correct option is wrapped in `**`.
/// Markers already present in the text are escaped.
pub fn to_plain_text(questions: &[Question]) -> String {
    let mut out = String::new();
    for (n, q) in questions.iter().enumerate() {
        if n > 0 {
            out.push('\n');
        }
        out.push_str(&format!("Câu {}: {}\n", n + 1, escape_markers(&q.text)));
        for (i, o) in q.options.iter().enumerate() {
            let mut text = escape_markers(&o.text);
            if o.is_correct {
                // A trailing backslash would escape the closing marker; the space is trimmed on read
                if text.ends_with('\\') {
                    text.push(' ');
                }
                out.push_str(&format!("{}. **{}**\n", label(i), text));
            } else {
                out.push_str(&format!("{}. {}\n", label(i), text));
            }
        }
    }
    out
}

/// A minimal WordprocessingML package; the correct option's text run is bold.
pub fn to_docx(questions: &[Question]) -> Result<Vec<u8>, ExportError> {
    let mut body = String::new();
    for (n, q) in questions.iter().enumerate() {
        let mut lines = q.text.lines();
        let first = lines.next().unwrap_or_default();
        let heading = format!("Câu {}: {}", n + 1, first);
        body.push_str(&paragraph(&[(heading.as_str(), false)]));
        for line in lines {
            body.push_str(&paragraph(&[(line, false)]));
        }
        for (i, o) in q.options.iter().enumerate() {
            let marker = format!("{}. ", label(i));
            body.push_str(&paragraph(&[(marker.as_str(), false), (o.text.as_str(), o.is_correct)]));
        }
    }
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}</w:body></w:document>"
    );

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(PACKAGE_RELS.as_bytes())?;
    zip.start_file("word/document.xml", options)?;
    zip.write_all(document.as_bytes())?;
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn paragraph(runs: &[(&str, bool)]) -> String {
    let mut p = String::from("<w:p>");
    for (text, bold) in runs {
        p.push_str("<w:r>");
        if *bold {
            p.push_str("<w:rPr><w:b/></w:rPr>");
        }
        p.push_str("<w:t xml:space=\"preserve\">");
        p.push_str(&escape(*text));
        p.push_str("</w:t></w:r>");
    }
    p.push_str("</w:p>");
    p
}

const CONTENT_TYPES: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>\
<Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
</Types>";

const PACKAGE_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"word/document.xml\"/>\
</Relationships>";
