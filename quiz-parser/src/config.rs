use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default resource bounds applied to untrusted uploads.
#[derive(Debug, Clone, Copy)]
pub struct ParserDefaults {
    pub max_input_bytes: usize,
    pub max_decompressed_bytes: usize,
    pub max_paragraphs: usize,
    pub max_rows: usize,
    pub max_options_per_question: usize,
}

/// Shared defaults so CLI and tests can stay in sync.
pub const PARSER_DEFAULTS: ParserDefaults = ParserDefaults {
    max_input_bytes: 20 * 1024 * 1024,
    max_decompressed_bytes: 64 * 1024 * 1024,
    max_paragraphs: 50_000,
    max_rows: 10_000,
    max_options_per_question: 16,
};

/// Per-call parser settings. Every bound, when exceeded, fails the whole call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Size of the uploaded buffer.
    pub max_input_bytes: usize,
    /// Total inflated size of the archive members that are read.
    pub max_decompressed_bytes: usize,
    /// Paragraphs (DOCX) or lines (plain text) with content.
    pub max_paragraphs: usize,
    /// Rows of the first worksheet, header included.
    pub max_rows: usize,
    pub max_options_per_question: usize,
    /// Encoding label for plain-text input (e.g. "windows-1258", "utf-16le").
    /// `None` means BOM sniffing, then UTF-8, then windows-1258.
    pub text_encoding: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: PARSER_DEFAULTS.max_input_bytes,
            max_decompressed_bytes: PARSER_DEFAULTS.max_decompressed_bytes,
            max_paragraphs: PARSER_DEFAULTS.max_paragraphs,
            max_rows: PARSER_DEFAULTS.max_rows,
            max_options_per_question: PARSER_DEFAULTS.max_options_per_question,
            text_encoding: None,
        }
    }
}

impl ParserConfig {
    /// Load overrides from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: ParserConfig = toml::from_str(s)
            .map_err(|e| ConfigError::InvalidConfiguration { message: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [
            ("max_input_bytes", self.max_input_bytes),
            ("max_decompressed_bytes", self.max_decompressed_bytes),
            ("max_paragraphs", self.max_paragraphs),
            ("max_rows", self.max_rows),
        ];
        for (name, value) in bounds {
            if value == 0 {
                return Err(ConfigError::InvalidConfiguration { message: format!("{name} must be greater than zero") });
            }
        }
        if self.max_options_per_question < 2 {
            return Err(ConfigError::InvalidConfiguration {
                message: "max_options_per_question must be at least 2".into(),
            });
        }
        if let Some(label) = &self.text_encoding {
            if encoding_rs::Encoding::for_label(label.trim().as_bytes()).is_none() {
                return Err(ConfigError::InvalidConfiguration { message: format!("unknown text encoding {label:?}") });
            }
        }
        Ok(())
    }
}
