#![allow(dead_code)]

use std::io::{Cursor, Write};

use rust_xlsxwriter::Workbook;
use zip::write::FileOptions;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// `<w:p>` with one run per `(text, bold)` pair.
pub fn p(runs: &[(&str, bool)]) -> String {
    let mut out = String::from("<w:p>");
    for (text, bold) in runs {
        out.push_str("<w:r>");
        if *bold {
            out.push_str("<w:rPr><w:b/></w:rPr>");
        }
        out.push_str(&format!("<w:t xml:space=\"preserve\">{text}</w:t></w:r>"));
    }
    out.push_str("</w:p>");
    out
}

/// Plain paragraph, no bold.
pub fn line(text: &str) -> String {
    p(&[(text, false)])
}

/// Option paragraph with the content bold, label plain.
pub fn bold_option(label: &str, text: &str) -> String {
    let marker = format!("{label} ");
    p(&[(marker.as_str(), false), (text, true)])
}

pub fn document_xml(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"{W_NS}\"><w:body>{body}</w:body></w:document>"
    )
}

/// Zip package from `(member name, content)` pairs.
pub fn zip_members(members: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in members {
        zip.start_file(*name, FileOptions::default()).expect("start zip member");
        zip.write_all(content.as_bytes()).expect("write zip member");
    }
    zip.finish().expect("finish zip").into_inner()
}

pub fn docx(body: &str) -> Vec<u8> {
    zip_members(&[("word/document.xml", &document_xml(body))])
}

pub fn docx_with_styles(body: &str, styles: &str) -> Vec<u8> {
    let styles_xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:styles xmlns:w=\"{W_NS}\">{styles}</w:styles>"
    );
    zip_members(&[("word/document.xml", &document_xml(body)), ("word/styles.xml", &styles_xml)])
}

/// First sheet filled with string cells; empty strings leave the cell blank.
pub fn xlsx(rows: &[Vec<&str>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(r as u32, c as u16, *value).expect("write cell");
            }
        }
    }
    workbook.save_to_buffer().expect("save workbook")
}

/// Overwrite the uncompressed size recorded for every central-directory entry.
/// The member data is left intact, so inflating still yields the real bytes.
pub fn falsify_declared_sizes(zip_bytes: &mut [u8], size: u32) {
    let eocd = zip_bytes
        .windows(4)
        .rposition(|w| w == b"PK\x05\x06")
        .expect("end of central directory");
    let u16_at = |b: &[u8], at: usize| u16::from_le_bytes([b[at], b[at + 1]]) as usize;
    let u32_at = |b: &[u8], at: usize| u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]]) as usize;

    let entries = u16_at(zip_bytes, eocd + 10);
    let mut pos = u32_at(zip_bytes, eocd + 16);
    for _ in 0..entries {
        assert_eq!(&zip_bytes[pos..pos + 4], b"PK\x01\x02", "central directory header");
        zip_bytes[pos + 24..pos + 28].copy_from_slice(&size.to_le_bytes());
        let name_len = u16_at(zip_bytes, pos + 28);
        let extra_len = u16_at(zip_bytes, pos + 30);
        let comment_len = u16_at(zip_bytes, pos + 32);
        pos += 46 + name_len + extra_len + comment_len;
    }
}

pub fn option_texts(q: &quiz_parser::Question) -> Vec<&str> {
    q.options.iter().map(|o| o.text.as_str()).collect()
}

pub fn correct_flags(q: &quiz_parser::Question) -> Vec<bool> {
    q.options.iter().map(|o| o.is_correct).collect()
}
