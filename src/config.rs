//! Pipeline configuration.
//!
//! Defaults suit machine translation backends that treat each line as a
//! separate sentence. Values can be overridden from the environment:
//!
//! | Variable                          | Values                  | Default  |
//! |-----------------------------------|-------------------------|----------|
//! | `PRETRANSLATE_COLLAPSE_NEWLINES`  | `true`/`false`/`1`/`0`  | `true`   |
//! | `PRETRANSLATE_VERIFY_OUTPUT`      | `true`/`false`/`1`/`0`  | `true`   |
//! | `PRETRANSLATE_FAILURE_POLICY`     | `entry`/`unit`          | `unit`   |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::mt::error::{MtError, MtResult};

pub const ENV_COLLAPSE_NEWLINES: &str = "PRETRANSLATE_COLLAPSE_NEWLINES";
pub const ENV_VERIFY_OUTPUT: &str = "PRETRANSLATE_VERIFY_OUTPUT";
pub const ENV_FAILURE_POLICY: &str = "PRETRANSLATE_FAILURE_POLICY";

/// What a failed translation unit does to the rest of its entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Any failed unit fails the entry; later units are not attempted.
    WholeEntry,
    /// Failed units keep their source text and are reported.
    #[default]
    PerUnit,
}

impl FromStr for FailurePolicy {
    type Err = MtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entry" | "whole-entry" => Ok(FailurePolicy::WholeEntry),
            "unit" | "per-unit" => Ok(FailurePolicy::PerUnit),
            other => Err(MtError::ConfigError(format!(
                "unknown failure policy '{}', expected 'entry' or 'unit'",
                other
            ))),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::WholeEntry => write!(f, "entry"),
            FailurePolicy::PerUnit => write!(f, "unit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PretranslationConfig {
    /// Replace newlines with spaces before sending text to a backend
    pub collapse_newlines: bool,
    /// Re-parse the pretranslated entry and reject output that is not valid FTL
    pub verify_output: bool,
    pub failure_policy: FailurePolicy,
}

impl Default for PretranslationConfig {
    fn default() -> Self {
        Self {
            collapse_newlines: true,
            verify_output: true,
            failure_policy: FailurePolicy::PerUnit,
        }
    }
}

impl PretranslationConfig {
    /// Defaults overridden by any `PRETRANSLATE_*` variables that are set.
    ///
    /// # Errors
    ///
    /// Returns `MtError::ConfigError` if a variable holds an invalid value.
    pub fn from_env() -> MtResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MtResult<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_COLLAPSE_NEWLINES) {
            config.collapse_newlines = parse_flag(ENV_COLLAPSE_NEWLINES, &value)?;
        }
        if let Some(value) = lookup(ENV_VERIFY_OUTPUT) {
            config.verify_output = parse_flag(ENV_VERIFY_OUTPUT, &value)?;
        }
        if let Some(value) = lookup(ENV_FAILURE_POLICY) {
            config.failure_policy = value.parse()?;
        }
        Ok(config)
    }

    pub fn with_collapse_newlines(mut self, collapse: bool) -> Self {
        self.collapse_newlines = collapse;
        self
    }

    pub fn with_verify_output(mut self, verify: bool) -> Self {
        self.verify_output = verify;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

fn parse_flag(key: &str, value: &str) -> MtResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(MtError::ConfigError(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
