use thiserror::Error;

use crate::locale::LocaleError;
use crate::parser::Junk;

/// Error types reported by translation backends
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// The backend could not be reached or declined the request
    #[error("Translation service unavailable: {0}")]
    Unavailable(String),
    /// The backend answered but the translation failed
    #[error("Translation error: {0}")]
    TranslationError(String),
    /// The target locale code is malformed
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// Backend configuration is missing or malformed
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for backend operations
pub type MtResult<T> = Result<T, MtError>;

/// Failures of the pretranslation pipeline for one entry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PretranslationError {
    #[error("source is not a valid message or term: {junk}")]
    Unparseable { junk: Junk },

    /// The backend failed for one translation unit. Never retried here.
    #[error("translation unavailable for '{text}' in locale '{locale}': {reason}")]
    TranslationUnavailable {
        text: String,
        locale: String,
        reason: MtError,
    },

    #[error("pretranslated entry '{id}' does not parse: {junk}")]
    InvalidOutput { id: String, junk: Junk },

    #[error(transparent)]
    Locale(#[from] LocaleError),
}
