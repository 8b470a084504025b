use std::fmt;

mod google;

pub use google::{google_language_code, GoogleTranslator, MAX_INPUT_CHARS};

/// Source language value asking the service to detect the input language.
pub const SOURCE_AUTO: &str = "auto";

/// Error returned when a translation request fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateError {
    pub message: String,
    pub status: Option<u16>,
}

impl TranslateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "{} (HTTP {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for TranslateError {}

pub type TranslateResult<T> = std::result::Result<T, TranslateError>;

/// A translation service. Calls block until the service answers.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, source: &str, target: &str) -> TranslateResult<String>;
}
