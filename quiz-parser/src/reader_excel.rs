use std::io::{self, Cursor, Read, Seek};

use calamine::{Data, Range, Reader, Xls, Xlsx};
use tracing::debug;

use crate::config::ParserConfig;
use crate::error::{GrammarError, ParseError};
use crate::format_detect::DocumentFormat;

pub const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// One data row of the question sheet. Blank option cells are omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRow {
    /// 1-based sheet row number.
    pub row_number: usize,
    pub question: String,
    /// `(letter, text)` in fixed column order A..D.
    pub options: Vec<(char, String)>,
    pub answer: String,
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub question: usize,
    pub options: [usize; 4],
    pub answer: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Question,
    Option(usize),
    Answer,
}

/// Header vocabulary, compared after lowercasing and diacritic folding.
const HEADER_VOCABULARY: &[(&str, Role)] = &[
    ("cau hoi", Role::Question),
    ("cau", Role::Question),
    ("noi dung", Role::Question),
    ("noi dung cau hoi", Role::Question),
    ("question", Role::Question),
    ("question text", Role::Question),
    ("dap an a", Role::Option(0)),
    ("lua chon a", Role::Option(0)),
    ("phuong an a", Role::Option(0)),
    ("option a", Role::Option(0)),
    ("a", Role::Option(0)),
    ("dap an 1", Role::Option(0)),
    ("lua chon 1", Role::Option(0)),
    ("phuong an 1", Role::Option(0)),
    ("option 1", Role::Option(0)),
    ("dap an b", Role::Option(1)),
    ("lua chon b", Role::Option(1)),
    ("phuong an b", Role::Option(1)),
    ("option b", Role::Option(1)),
    ("b", Role::Option(1)),
    ("dap an 2", Role::Option(1)),
    ("lua chon 2", Role::Option(1)),
    ("phuong an 2", Role::Option(1)),
    ("option 2", Role::Option(1)),
    ("dap an c", Role::Option(2)),
    ("lua chon c", Role::Option(2)),
    ("phuong an c", Role::Option(2)),
    ("option c", Role::Option(2)),
    ("c", Role::Option(2)),
    ("dap an 3", Role::Option(2)),
    ("lua chon 3", Role::Option(2)),
    ("phuong an 3", Role::Option(2)),
    ("option 3", Role::Option(2)),
    ("dap an d", Role::Option(3)),
    ("lua chon d", Role::Option(3)),
    ("phuong an d", Role::Option(3)),
    ("option d", Role::Option(3)),
    ("d", Role::Option(3)),
    ("dap an 4", Role::Option(3)),
    ("lua chon 4", Role::Option(3)),
    ("phuong an 4", Role::Option(3)),
    ("option 4", Role::Option(3)),
    ("dap an dung", Role::Answer),
    ("dap an", Role::Answer),
    ("answer", Role::Answer),
    ("correct", Role::Answer),
    ("correct answer", Role::Answer),
    ("key", Role::Answer),
];

/// Reads the first worksheet: a header row, then one question per row.
/// Rows are returned in sheet order; a row without question text is a per-row error.
pub fn read_excel_rows(
    bytes: &[u8],
    format: DocumentFormat,
    config: &ParserConfig,
) -> Result<Vec<Result<TabularRow, (usize, GrammarError)>>, ParseError> {
    let range = match format {
        DocumentFormat::Xlsx => {
            check_inflated_size(bytes, config.max_decompressed_bytes)?;
            let wb: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
                .map_err(|e| ParseError::format(format!("failed to open workbook: {e}")))?;
            first_sheet::<Cursor<&[u8]>, _>(wb)?
        }
        DocumentFormat::Xls => {
            let wb: Xls<_> = Xls::new(Cursor::new(bytes))
                .map_err(|e| ParseError::format(format!("failed to open workbook: {e}")))?;
            first_sheet::<Cursor<&[u8]>, _>(wb)?
        }
        other => return Err(ParseError::format(format!("{} is not a spreadsheet format", other.name()))),
    };

    if range.height() > config.max_rows {
        return Err(ParseError::limit_exceeded("row count", config.max_rows));
    }
    // Row numbers are reported relative to the sheet, not the used range
    let first_row = range.start().map(|(row, _col)| row as usize).unwrap_or(0);

    let mut rows = range.rows().enumerate().filter(|(_, cells)| cells.iter().any(|c| !cell_to_string(c).is_empty()));
    let (_, header) = rows
        .next()
        .ok_or_else(|| ParseError::format("worksheet is empty: expected a header row"))?;
    let header: Vec<String> = header.iter().map(cell_to_string).collect();
    let layout = resolve_layout(&header)?;
    debug!(?layout, "resolved spreadsheet columns");

    let out = rows
        .map(|(i, cells)| {
            let row_number = first_row + i + 1;
            let cell = |idx: usize| cells.get(idx).map(cell_to_string).unwrap_or_default();
            let question = cell(layout.question);
            if question.is_empty() {
                return Err((row_number, GrammarError::MissingQuestionText));
            }
            let options = OPTION_LETTERS
                .iter()
                .zip(layout.options.iter())
                .filter_map(|(letter, &idx)| {
                    let text = cell(idx);
                    (!text.is_empty()).then_some((*letter, text))
                })
                .collect();
            Ok(TabularRow { row_number, question, options, answer: cell(layout.answer) })
        })
        .collect();
    Ok(out)
}

fn first_sheet<RS, R>(mut workbook: R) -> Result<Range<Data>, ParseError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => Ok(range),
        Some(Err(e)) => Err(ParseError::format(format!("failed to read first sheet: {e}"))),
        None => Err(ParseError::format("workbook has no sheets")),
    }
}

/// Inflate every member once with a bounded reader before calamine touches the archive.
/// Declared sizes are only a first check; the bytes actually produced are what count.
fn check_inflated_size(bytes: &[u8], limit: usize) -> Result<(), ParseError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ParseError::format(format!("not a valid .xlsx (zip) file: {e}")))?;
    let mut remaining = limit as u64;
    for i in 0..zip.len() {
        let entry = zip
            .by_index(i)
            .map_err(|e| ParseError::format(format!("corrupt archive entry {i}: {e}")))?;
        if entry.size() > remaining {
            return Err(ParseError::limit_exceeded("decompressed size", limit));
        }
        let name = entry.name().to_string();
        let inflated = io::copy(&mut entry.take(remaining + 1), &mut io::sink())
            .map_err(|e| ParseError::format(format!("failed to inflate {name}: {e}")))?;
        if inflated > remaining {
            return Err(ParseError::limit_exceeded("decompressed size", limit));
        }
        remaining -= inflated;
    }
    Ok(())
}

pub fn resolve_layout(header: &[String]) -> Result<ColumnLayout, ParseError> {
    let mut question = None;
    let mut options: [Option<usize>; 4] = [None; 4];
    let mut answer = None;

    for (idx, name) in header.iter().enumerate() {
        let key = normalize_header(name);
        let Some(role) = HEADER_VOCABULARY.iter().find(|(word, _)| *word == key).map(|(_, r)| *r) else {
            continue;
        };
        // First matching column wins
        match role {
            Role::Question => { question.get_or_insert(idx); }
            Role::Option(slot) => { options[slot].get_or_insert(idx); }
            Role::Answer => { answer.get_or_insert(idx); }
        }
    }

    let answer = answer.ok_or_else(|| ParseError::format("missing correct-answer column in header row"))?;
    let question = question.ok_or_else(|| ParseError::format("missing question column in header row"))?;
    // No option header recognized at all: the four columns after the question
    if options.iter().all(Option::is_none) {
        let positional = [question + 1, question + 2, question + 3, question + 4];
        if !positional.contains(&answer) && positional.iter().all(|&idx| idx < header.len()) {
            debug!(question, answer, "option headers not recognized, using positional columns");
            return Ok(ColumnLayout { question, options: positional, answer });
        }
    }
    let mut resolved = [0usize; 4];
    for (slot, found) in options.iter().enumerate() {
        resolved[slot] = found.ok_or_else(|| {
            ParseError::format(format!("missing option {} column in header row", OPTION_LETTERS[slot]))
        })?;
    }
    Ok(ColumnLayout { question, options: resolved, answer })
}

/// Lowercase, fold Vietnamese diacritics, drop trailing punctuation, collapse spaces.
pub fn normalize_header(s: &str) -> String {
    let folded: String = s
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !('\u{0300}'..='\u{036F}').contains(c))
        .map(fold_vietnamese)
        .collect();
    let trimmed = folded.trim_end_matches(|c: char| matches!(c, ':' | '.' | '*' | ')'));
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_vietnamese(c: char) -> char {
    match c {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ầ' | 'ấ' | 'ẩ' | 'ẫ' | 'ậ' => 'a',
        'đ' => 'd',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ờ' | 'ớ' | 'ở' | 'ỡ' | 'ợ' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
        other => other,
    }
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::Empty => String::new(),
        Data::String(s) => s.replace("\r\n", "\n").replace('\r', "\n").trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 { format!("{}", *f as i64) } else { f.to_string() }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "TRUE".into() } else { "FALSE".into() },
        Data::Error(e) => format!("#ERR:{:?}", e),
        // Best-effort for date/time/duration or any future variants
        other => other.to_string(),
    }
}
