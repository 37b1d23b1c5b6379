//! Ordered fallback across several translation backends.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, Translation, TranslationRequest};

/// Tries each backend in turn and returns the first successful translation.
///
/// Fallback is the chain's only policy: a backend is asked once, and the
/// chain fails with [`MtError::Unavailable`] when every backend has failed.
pub struct ChainTranslator {
    backends: Vec<Box<dyn MachineTranslator>>,
}

impl ChainTranslator {
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    pub fn with_backend(mut self, backend: impl MachineTranslator + 'static) -> Self {
        self.backends.push(Box::new(backend));
        self
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Default for ChainTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MachineTranslator for ChainTranslator {
    async fn translate(&self, request: &TranslationRequest<'_>) -> MtResult<Translation> {
        let mut failures = Vec::new();
        for backend in &self.backends {
            match backend.translate(request).await {
                Ok(translation) => {
                    debug!(
                        "{} translated into '{}'",
                        backend.provider_name(),
                        request.locale
                    );
                    return Ok(translation);
                }
                Err(e) => {
                    warn!(
                        "{} failed for locale '{}': {}",
                        backend.provider_name(),
                        request.locale,
                        e
                    );
                    failures.push(format!("{}: {}", backend.provider_name(), e));
                }
            }
        }

        if failures.is_empty() {
            return Err(MtError::Unavailable("no translation backends configured".to_string()));
        }
        Err(MtError::Unavailable(failures.join("; ")))
    }

    fn provider_name(&self) -> &str {
        "Chain"
    }
}
