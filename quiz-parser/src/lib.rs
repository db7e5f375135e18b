pub mod answer_resolver;
pub mod config;
pub mod error;
pub mod export;
pub mod format_detect;
pub mod grammar;
pub mod normalizer;
pub mod reader_docx;
pub mod reader_excel;
pub mod reader_txt;
pub mod report;
pub mod text_segmenter;
pub mod unified_blocks;

use tracing::{debug, info, warn};

pub use config::{ParserConfig, PARSER_DEFAULTS};
pub use error::{ConfigError, ExportError, GrammarError, ParseError};
pub use format_detect::DocumentFormat;
pub use quiz_model::{ParseResult, Question, QuestionOption, SkippedQuestion};

use normalizer::Normalizer;
use report::ReportBuilder;
use unified_blocks::Paragraph;

/// Parse an uploaded exam document with default limits.
/// Fatal errors are folded into `success = false` with a single message.
pub fn parse(bytes: &[u8], filename: &str) -> ParseResult {
    parse_with_config(bytes, filename, &ParserConfig::default())
}

pub fn parse_with_config(bytes: &[u8], filename: &str, config: &ParserConfig) -> ParseResult {
    match try_parse(bytes, filename, config) {
        Ok(result) => result,
        Err(e) => {
            warn!(filename, error = %e, "document rejected");
            ParseResult::failure(e.to_string())
        }
    }
}

/// Like [`parse_with_config`] but surfaces file-level failures as a typed error.
/// An `Ok` result may still have `success = false` when no question survived.
pub fn try_parse(bytes: &[u8], filename: &str, config: &ParserConfig) -> Result<ParseResult, ParseError> {
    if bytes.len() > config.max_input_bytes {
        return Err(ParseError::limit_exceeded("input size", config.max_input_bytes));
    }
    let format = format_detect::detect_format(filename, bytes)?;
    debug!(filename, format = format.name(), bytes = bytes.len(), "detected document format");

    let result = match format {
        DocumentFormat::Docx => {
            let paragraphs = reader_docx::read_docx_to_paragraphs(bytes, config)?;
            parse_marked_paragraphs(&paragraphs, config)?
        }
        DocumentFormat::PlainText => {
            let paragraphs = reader_txt::read_txt_to_paragraphs(bytes, config)?;
            parse_marked_paragraphs(&paragraphs, config)?
        }
        DocumentFormat::Xlsx | DocumentFormat::Xls => parse_tabular(bytes, format, config)?,
    };

    info!(
        filename,
        format = format.name(),
        total_parsed = result.total_parsed,
        skipped = result.skipped.len(),
        "parsed document"
    );
    Ok(result)
}

/// DOCX and plain-text path: segment, resolve by bold runs, normalize.
fn parse_marked_paragraphs(paragraphs: &[Paragraph], config: &ParserConfig) -> Result<ParseResult, ParseError> {
    let blocks = text_segmenter::segment_paragraphs(paragraphs, config.max_options_per_question)?;
    debug!(paragraphs = paragraphs.len(), blocks = blocks.len(), "segmented question blocks");

    let mut normalizer = Normalizer::new();
    let mut report = ReportBuilder::new();
    for block in blocks {
        let ordinal = block.ordinal;
        let outcome = answer_resolver::resolve_marked(block).and_then(|b| normalizer.normalize(b));
        report.record(ordinal, outcome);
    }
    Ok(report.finish())
}

/// Spreadsheet path: one row per question, answer taken from the answer column.
fn parse_tabular(bytes: &[u8], format: DocumentFormat, config: &ParserConfig) -> Result<ParseResult, ParseError> {
    let rows = reader_excel::read_excel_rows(bytes, format, config)?;

    let mut normalizer = Normalizer::new();
    let mut report = ReportBuilder::new();
    for row in rows {
        match row {
            Ok(row) => {
                let ordinal = row.row_number;
                let outcome = answer_resolver::resolve_tabular(row).and_then(|b| normalizer.normalize(b));
                report.record(ordinal, outcome);
            }
            Err((row_number, reason)) => report.skip(row_number, reason),
        }
    }
    Ok(report.finish())
}
