use thiserror::Error;

/// File-level failures. Any of these aborts the whole parse call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unsupported file format: {filename}")]
    UnsupportedFormat { filename: String },
    #[error("{message}")]
    Format { message: String },
}

impl ParseError {
    pub fn format(message: impl Into<String>) -> Self {
        ParseError::Format { message: message.into() }
    }

    /// A resource bound was exceeded while reading untrusted input.
    pub fn limit_exceeded(what: &str, limit: usize) -> Self {
        ParseError::Format { message: format!("{what} exceeds the limit of {limit}") }
    }
}

/// Per-question failures. The offending block is dropped and parsing continues.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("question text is empty")]
    MissingStem,
    #[error("question has {found} option(s), at least 2 are required")]
    TooFewOptions { found: usize },
    #[error("option {index} has no text")]
    EmptyOption { index: usize },
    #[error("no option is marked correct")]
    NoCorrectAnswer,
    #[error("{marked} options are marked correct, expected exactly one")]
    AmbiguousAnswer { marked: usize },
    #[error("row has no question text")]
    MissingQuestionText,
    #[error("answer cell is empty")]
    MissingAnswer,
    #[error("answer value {value:?} does not match any option")]
    MalformedAnswer { value: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid parser configuration: {message}")]
    InvalidConfiguration { message: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
