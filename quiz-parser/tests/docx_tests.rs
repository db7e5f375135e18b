mod common;

use common::{bold_option, correct_flags, docx, docx_with_styles, line, option_texts, p, zip_members};
use quiz_parser::{parse, parse_with_config, try_parse, ParseError, ParserConfig};

fn sample_body(correct: &[usize]) -> String {
    let mut body = String::new();
    for (n, &c) in correct.iter().enumerate() {
        body.push_str(&line(&format!("Câu {}: question {}", n + 1, n + 1)));
        for (i, label) in ["a.", "b.", "c.", "d."].iter().enumerate() {
            let text = format!("option {}{}", n + 1, label.trim_end_matches('.'));
            if i == c {
                body.push_str(&bold_option(label, &text));
            } else {
                body.push_str(&line(&format!("{label} {text}")));
            }
        }
    }
    body
}

#[test]
fn each_question_keeps_its_bold_option() {
    let correct = [2, 0, 3, 1];
    let result = parse(&docx(&sample_body(&correct)), "exam.docx");

    assert!(result.success);
    assert_eq!(result.total_parsed, correct.len());
    for (q, &c) in result.questions.iter().zip(correct.iter()) {
        assert_eq!(q.options.iter().filter(|o| o.is_correct).count(), 1);
        assert_eq!(q.correct_index(), Some(c));
    }
    assert_eq!(result.questions[2].text, "question 3");
    assert_eq!(option_texts(&result.questions[2]), vec!["option 3a", "option 3b", "option 3c", "option 3d"]);
}

#[test]
fn run_split_mid_word_keeps_bold() {
    let body = [
        line("Câu 1: Thủ đô của Việt Nam?"),
        line("A. Huế"),
        p(&[("B. Hà ", false), ("N", true), ("ội", true)]),
        line("C. Đà Nẵng"),
    ]
    .concat();
    let result = parse(&docx(&body), "exam.docx");

    let q = &result.questions[0];
    assert_eq!(option_texts(q), vec!["Huế", "Hà Nội", "Đà Nẵng"]);
    assert_eq!(correct_flags(q), vec![false, true, false]);
}

#[test]
fn bold_labels_alone_do_not_mark_answers() {
    let body = [
        line("Câu 1: styling"),
        p(&[("a.", true), (" x", false)]),
        p(&[("b.", true), (" y", true)]),
        p(&[("c.", true), (" z", false)]),
    ]
    .concat();
    let result = parse(&docx(&body), "exam.docx");

    assert_eq!(result.total_parsed, 1);
    assert_eq!(result.questions[0].correct_index(), Some(1));
}

#[test]
fn zero_and_multiple_bold_questions_are_excluded() {
    let mut body = sample_body(&[0, 1, 2]);
    body.push_str(&line("Câu 4: nothing bold"));
    body.push_str(&line("a. x"));
    body.push_str(&line("b. y"));
    body.push_str(&line("Câu 5: everything bold"));
    body.push_str(&bold_option("a.", "x"));
    body.push_str(&bold_option("b.", "y"));
    let result = parse(&docx(&body), "exam.docx");

    assert!(result.success);
    assert_eq!(result.total_parsed, 3);
    assert_eq!(result.skipped.iter().map(|s| s.ordinal).collect::<Vec<_>>(), vec![4, 5]);
}

#[test]
fn bold_toggled_off_and_whitespace_bold_are_ignored() {
    let body = format!(
        "{}{}{}{}",
        line("Câu 1: toggles"),
        "<w:p><w:r><w:t xml:space=\"preserve\">a. </w:t></w:r>\
         <w:r><w:rPr><w:b w:val=\"0\"/></w:rPr><w:t>x</w:t></w:r></w:p>",
        p(&[("b. y", false), ("  ", true)]),
        bold_option("c.", "z"),
    );
    let result = parse(&docx(&body), "exam.docx");

    assert_eq!(result.total_parsed, 1);
    assert_eq!(result.questions[0].correct_index(), Some(2));
}

#[test]
fn paragraph_mark_bold_is_not_run_bold() {
    let body = format!(
        "{}{}{}",
        line("Câu 1: paragraph props"),
        "<w:p><w:pPr><w:rPr><w:b/></w:rPr></w:pPr><w:r><w:t>a. x</w:t></w:r></w:p>",
        bold_option("b.", "y"),
    );
    let result = parse(&docx(&body), "exam.docx");
    assert_eq!(result.questions[0].correct_index(), Some(1));
}

#[test]
fn tracked_formatting_changes_use_current_formatting() {
    let body = format!(
        "{}{}{}{}",
        line("Câu 1: revised"),
        // was bold before the revision, plain now
        "<w:p><w:r><w:t xml:space=\"preserve\">a. </w:t></w:r><w:r><w:rPr>\
         <w:rPrChange w:id=\"1\" w:author=\"editor\"><w:rPr><w:b/></w:rPr></w:rPrChange>\
         </w:rPr><w:t>x</w:t></w:r></w:p>",
        bold_option("b.", "y"),
        line("c. z"),
    );
    let result = parse(&docx(&body), "exam.docx");
    assert_eq!(result.total_parsed, 1);
    assert_eq!(result.questions[0].correct_index(), Some(1));

    // bold now, plain before the revision; the bold after rPrChange still applies
    let body = format!(
        "{}{}{}",
        line("Câu 1: revised again"),
        line("a. x"),
        "<w:p><w:r><w:t xml:space=\"preserve\">b. </w:t></w:r><w:r><w:rPr>\
         <w:rPrChange w:id=\"2\" w:author=\"editor\"><w:rPr><w:b w:val=\"0\"/></w:rPr></w:rPrChange>\
         <w:b/></w:rPr><w:t>y</w:t></w:r></w:p>",
    );
    let result = parse(&docx(&body), "exam.docx");
    assert_eq!(result.total_parsed, 1);
    assert_eq!(result.questions[0].correct_index(), Some(1));
}

#[test]
fn bold_character_style_counts_as_bold() {
    let styles = "<w:style w:type=\"character\" w:styleId=\"Strong\">\
                  <w:name w:val=\"Strong\"/><w:rPr><w:b/></w:rPr></w:style>\
                  <w:style w:type=\"character\" w:styleId=\"Emphasis\">\
                  <w:name w:val=\"Emphasis\"/><w:rPr><w:i/></w:rPr></w:style>";
    let body = format!(
        "{}{}{}",
        line("Câu 1: styled"),
        "<w:p><w:r><w:rPr><w:rStyle w:val=\"Emphasis\"/></w:rPr><w:t>a. x</w:t></w:r></w:p>",
        "<w:p><w:r><w:t xml:space=\"preserve\">b. </w:t></w:r>\
         <w:r><w:rPr><w:rStyle w:val=\"Strong\"/></w:rPr><w:t>y</w:t></w:r></w:p>",
    );
    let result = parse(&docx_with_styles(&body, styles), "exam.docx");

    assert_eq!(result.total_parsed, 1);
    assert_eq!(result.questions[0].correct_index(), Some(1));
}

#[test]
fn soft_line_breaks_split_options() {
    let body = "<w:p><w:r><w:t>Câu 1: breaks</w:t><w:br/><w:t xml:space=\"preserve\">a. x</w:t><w:br/>\
                <w:t xml:space=\"preserve\">b. </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>y</w:t></w:r></w:p>";
    let result = parse(&docx(body), "exam.docx");

    assert_eq!(result.total_parsed, 1);
    let q = &result.questions[0];
    assert_eq!(q.text, "breaks");
    assert_eq!(option_texts(q), vec!["x", "y"]);
    assert_eq!(q.correct_index(), Some(1));
}

#[test]
fn escaped_entities_and_tabs_are_preserved() {
    let body = format!(
        "{}{}{}",
        line("Câu 1: is 1 &lt; 2 &amp;&amp; 3 &gt; 2?"),
        "<w:p><w:r><w:t>a.</w:t><w:tab/><w:t>yes</w:t></w:r></w:p>",
        bold_option("b.", "no &amp; never"),
    );
    let result = parse(&docx(&body), "exam.docx");

    let q = &result.questions[0];
    assert_eq!(q.text, "is 1 < 2 && 3 > 2?");
    assert_eq!(option_texts(q), vec!["yes", "no & never"]);
}

#[test]
fn table_cells_are_read_in_order() {
    let body = format!(
        "{}<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
        line("Câu 1: in a table"),
        line("a. x"),
        bold_option("b.", "y"),
    );
    let result = parse(&docx(&body), "exam.docx");
    assert_eq!(result.questions[0].correct_index(), Some(1));
}

#[test]
fn invalid_zip_is_a_format_error() {
    let err = try_parse(b"definitely not a zip", "exam.docx", &ParserConfig::default()).expect_err("not a zip");
    assert!(matches!(err, ParseError::Format { .. }));

    let result = parse(b"definitely not a zip", "exam.docx");
    assert!(!result.success);
    assert!(result.questions.is_empty());
    assert_eq!(result.total_parsed, 0);
    assert!(result.error.is_some());
}

#[test]
fn missing_document_member_is_a_format_error() {
    let bytes = zip_members(&[("word/other.xml", "<x/>")]);
    let err = try_parse(&bytes, "exam.docx", &ParserConfig::default()).expect_err("no document.xml");
    assert_eq!(err, ParseError::format("missing word/document.xml"));
}

#[test]
fn malformed_xml_is_a_format_error() {
    let bytes = zip_members(&[("word/document.xml", "<w:document><w:body><w:p></w:r></w:body>")]);
    let err = try_parse(&bytes, "exam.docx", &ParserConfig::default()).expect_err("malformed xml");
    assert!(matches!(err, ParseError::Format { .. }));
}

#[test]
fn decompressed_size_limit_is_fatal() {
    let config = ParserConfig { max_decompressed_bytes: 256, ..ParserConfig::default() };
    let bytes = docx(&sample_body(&[0, 1, 2, 3]));
    let err = try_parse(&bytes, "exam.docx", &config).expect_err("document too large");
    assert!(matches!(err, ParseError::Format { .. }));
}

#[test]
fn paragraph_limit_is_fatal() {
    let config = ParserConfig { max_paragraphs: 4, ..ParserConfig::default() };
    let result = parse_with_config(&docx(&sample_body(&[0, 1])), "exam.docx", &config);
    assert!(!result.success);
    assert!(result.questions.is_empty());
}

#[test]
fn document_without_questions_reports_empty_result() {
    let body = [line("Trường THPT"), line("Đề kiểm tra 15 phút")].concat();
    let result = parse(&docx(&body), "exam.docx");
    assert!(!result.success);
    assert!(result.error.as_deref().is_some_and(|e| e.contains("no valid questions")));
}
