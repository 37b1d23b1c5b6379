//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, API-free translator for testing
//! the pretranslation pipeline without requiring API keys or network access.
//! Every mode works on the wrapped text, so markers flow through exactly as
//! they would through a real backend.
//!
//! # Example
//!
//! ```ignore
//! use fluent_pretranslate::mt::{MachineTranslator, MockMode, MockTranslator, TranslationRequest};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let request = TranslationRequest::new("hello", "hello", "fr");
//!     let result = mock.translate(&request).await.unwrap();
//!     assert_eq!(result.text, "hello_fr");
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::mt::error::{MtError, MtResult};
use crate::mt::placeholder::marker_spans;
use crate::mt::translator::{MachineTranslator, Translation, TranslationRequest};

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    /// Markers are preserved untouched
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (wrapped_text, target_locale) → translation, falling back to Suffix
    Mappings(HashMap<(String, String), String>),

    /// Simulate word reordering (for testing word-order-changing languages)
    /// Reverses the order of words; each marker counts as one word
    Reorder,

    /// Simulate backend errors
    Error(String),

    /// No-op: return input unchanged
    NoOp,

    /// Simulate a backend that discards markup: markers are removed
    DropMarkers,
}

/// Mock translator that simulates various translation scenarios
///
/// Useful for testing the pipeline without external API dependencies.
/// Clones share the same call counter.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    name: String,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    /// Create a new MockTranslator with the given mode
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            name: "Mock Translator".to_string(),
            delay_ms: 0,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a MockTranslator with simulated network delay
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mock = MockTranslator::with_delay(MockMode::Suffix, 50);
    /// // Each translation will have ~50ms delay
    /// ```
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(mode)
        }
    }

    /// Report translations under a different service name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Number of `translate` calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Reorder => {
                let mut words = words_keeping_markers(text);
                words.reverse();
                Ok(words.join(" "))
            }
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::NoOp => Ok(text.to_string()),
            MockMode::DropMarkers => {
                let mut kept = String::new();
                let mut cursor = 0;
                for span in marker_spans(text) {
                    kept.push_str(&text[cursor..span.start]);
                    cursor = span.end;
                }
                kept.push_str(&text[cursor..]);
                Ok(kept.split_whitespace().collect::<Vec<_>>().join(" "))
            }
        }
    }
}

/// Split on whitespace, keeping each marker as a single word.
fn words_keeping_markers(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut cursor = 0;
    for span in marker_spans(text) {
        words.extend(text[cursor..span.start].split_whitespace());
        words.push(&text[span.clone()]);
        cursor = span.end;
    }
    words.extend(text[cursor..].split_whitespace());
    words
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(&self, request: &TranslationRequest<'_>) -> MtResult<Translation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.apply_delay().await;

        let text = self.apply_translation(request.wrapped_text, request.locale)?;
        Ok(Translation::new(text, self.name.clone()))
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}
