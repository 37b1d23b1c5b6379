//! Machine translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for backend abstraction.
//! The engine hands each translation unit to a backend twice over: once with
//! placeholders restored (`raw_text`, for logs and translation memory) and
//! once with placeholders wrapped in inert markers (`wrapped_text`, the form
//! that should actually be translated).
//!
//! # Example
//!
//! ```ignore
//! use fluent_pretranslate::mt::{MachineTranslator, MockMode, MockTranslator, TranslationRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MockTranslator::new(MockMode::Suffix);
//!     let request = TranslationRequest::new("Hello", "Hello", "fr");
//!     let translation = backend.translate(&request).await?;
//!     println!("{} ({})", translation.text, translation.service); // "Hello_fr (Mock Translator)"
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::mt::error::{MtError, MtResult};
use crate::mt::placeholder::strip_placeholders;

/// One unit of text to translate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest<'a> {
    /// Source text with every placeable restored to its literal form
    pub raw_text: &'a str,
    /// Source text with placeables replaced by markers
    pub wrapped_text: &'a str,
    /// Target locale code (e.g., "fr", "pt-BR")
    pub locale: &'a str,
}

impl<'a> TranslationRequest<'a> {
    pub fn new(raw_text: &'a str, wrapped_text: &'a str, locale: &'a str) -> Self {
        Self {
            raw_text,
            wrapped_text,
            locale,
        }
    }

    /// Wrapped text with each marker reduced to its preview, for backends
    /// that cannot carry markup.
    pub fn preview_text(&self) -> String {
        strip_placeholders(self.wrapped_text)
    }
}

/// A backend's answer to a [`TranslationRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Translated text, still carrying whatever markers the backend kept
    pub text: String,
    /// Identifier of the service that produced the text
    pub service: String,
}

impl Translation {
    pub fn new(text: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            service: service.into(),
        }
    }
}

/// Generic trait for machine translation backends
///
/// Implementations handle the actual translation work, whether through an
/// API or deterministic logic (Mock). Retries, timeouts and cancellation are
/// the implementation's concern; the engine calls `translate` exactly once
/// per unit and treats any error as final.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate one unit into `request.locale`
    ///
    /// # Returns
    ///
    /// * `Ok(Translation)` - The translated text and the service that produced it
    /// * `Err(MtError)` - If the backend is unavailable or translation fails
    async fn translate(&self, request: &TranslationRequest<'_>) -> MtResult<Translation>;

    /// Get the name of this translation backend
    ///
    /// Used for logging to identify which backend handled a translation.
    fn provider_name(&self) -> &str;
}

#[async_trait]
impl<T: MachineTranslator + ?Sized> MachineTranslator for Box<T> {
    async fn translate(&self, request: &TranslationRequest<'_>) -> MtResult<Translation> {
        (**self).translate(request).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}

/// Validate that a locale code is in acceptable format
///
/// Checks that the locale code contains only alphanumeric characters,
/// hyphens, and underscores.
///
/// # Example
///
/// ```ignore
/// validate_locale("en")?; // OK
/// validate_locale("en-US")?; // OK
/// validate_locale("invalid@code").unwrap_err(); // Error
/// ```
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_locale_valid_codes() {
        assert!(validate_locale("en").is_ok());
        assert!(validate_locale("en-US").is_ok());
        assert!(validate_locale("zh-Hans").is_ok());
        assert!(validate_locale("de_DE").is_ok());
    }

    #[test]
    fn test_validate_locale_invalid_codes() {
        assert!(validate_locale("").is_err());
        assert!(validate_locale("en@invalid").is_err());
        assert!(validate_locale("fr#bad").is_err());
    }

    #[test]
    fn test_validate_locale_error_messages() {
        match validate_locale("en@US") {
            Err(MtError::InvalidLocale(msg)) => {
                assert!(msg.contains("Invalid characters"));
            }
            _ => panic!("Expected InvalidLocale error"),
        }
    }

    #[test]
    fn test_request_preview_text() {
        let wrapped = "Hello <span data-l10n-placeholder=\"0\" translate=\"no\">$user</span>!";
        let request = TranslationRequest::new("Hello { $user }!", wrapped, "fr");
        assert_eq!(request.preview_text(), "Hello $user!");
    }
}
