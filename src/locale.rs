//! Locale collaborator: CLDR plural categories and example numbers.
//!
//! The engine only needs two things from a locale: the ordered list of plural
//! categories it uses, and optionally a few example integers per category.
//! [`IcuPluralLocale`] derives both from ICU plural rules;
//! [`StaticPluralLocale`] carries them verbatim, e.g. from a locale catalog.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use icu_locale::Locale;
use icu_plurals::{PluralCategory as IcuCategory, PluralRuleType, PluralRules};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// One of the six CLDR plural buckets, in canonical CLDR order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    pub const ALL: [PluralCategory; 6] = [
        PluralCategory::Zero,
        PluralCategory::One,
        PluralCategory::Two,
        PluralCategory::Few,
        PluralCategory::Many,
        PluralCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }

    /// Number used in place of the plural variable when no example table is
    /// available for the locale.
    pub fn fallback_example(&self) -> u64 {
        match self {
            PluralCategory::Zero => 0,
            PluralCategory::One => 1,
            PluralCategory::Two => 2,
            PluralCategory::Few => 3,
            PluralCategory::Many => 11,
            PluralCategory::Other => 14,
        }
    }

    fn from_icu(category: IcuCategory) -> Self {
        match category {
            IcuCategory::Zero => PluralCategory::Zero,
            IcuCategory::One => PluralCategory::One,
            IcuCategory::Two => PluralCategory::Two,
            IcuCategory::Few => PluralCategory::Few,
            IcuCategory::Many => PluralCategory::Many,
            IcuCategory::Other => PluralCategory::Other,
        }
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluralCategory {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PluralCategory::ALL
            .iter()
            .find(|category| category.as_str() == s)
            .copied()
            .ok_or_else(|| LocaleError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("failed to parse locale '{code}': {reason}")]
    InvalidLocale { code: String, reason: String },

    #[error("no plural rules for locale '{code}': {reason}")]
    MissingPluralRules { code: String, reason: String },

    #[error("unknown plural category '{0}'")]
    UnknownCategory(String),
}

/// What the engine needs to know about a target locale.
pub trait PluralLocale: Send + Sync {
    /// Locale code passed through to translation backends.
    fn code(&self) -> &str;

    /// Plural categories in CLDR order; `other` comes last.
    fn plural_categories(&self) -> Vec<PluralCategory>;

    /// Example integers selecting `category`, if the locale has a table.
    fn plural_examples(&self, _category: PluralCategory) -> Option<Vec<u64>> {
        None
    }
}

/// Upper bound of the integer range probed for example numbers.
const PROBE_LIMIT: u64 = 200;
/// Large round numbers catch compact-decimal categories such as French `many`.
const PROBE_EXTRA: [u64; 4] = [1_000, 10_000, 100_000, 1_000_000];
const EXAMPLES_PER_CATEGORY: usize = 3;

/// Plural data derived from ICU4X cardinal rules.
pub struct IcuPluralLocale {
    code: String,
    categories: Vec<PluralCategory>,
    examples: HashMap<PluralCategory, Vec<u64>>,
}

impl IcuPluralLocale {
    /// Load cardinal plural rules for a locale code such as `"ar"` or `"pt-BR"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is not a valid locale identifier or ICU
    /// has no plural data for it.
    pub fn new(code: &str) -> Result<Self, LocaleError> {
        let locale: Locale = code.parse().map_err(|e| LocaleError::InvalidLocale {
            code: code.to_string(),
            reason: format!("{}", e),
        })?;

        let rules = PluralRules::try_new(locale.into(), PluralRuleType::Cardinal.into())
            .map_err(|e| LocaleError::MissingPluralRules {
                code: code.to_string(),
                reason: format!("{}", e),
            })?;

        let mut categories: Vec<PluralCategory> =
            rules.categories().map(PluralCategory::from_icu).collect();
        if !categories.contains(&PluralCategory::Other) {
            categories.push(PluralCategory::Other);
        }
        categories.sort();
        categories.dedup();

        let mut examples: HashMap<PluralCategory, Vec<u64>> = HashMap::new();
        for n in (0..=PROBE_LIMIT).chain(PROBE_EXTRA) {
            let category = PluralCategory::from_icu(rules.category_for(n as usize));
            let bucket = examples.entry(category).or_default();
            if bucket.len() < EXAMPLES_PER_CATEGORY {
                bucket.push(n);
            }
        }

        debug!(
            "Loaded plural rules for '{}': {:?}",
            code,
            categories.iter().map(|c| c.as_str()).collect::<Vec<_>>()
        );

        Ok(IcuPluralLocale {
            code: code.to_string(),
            categories,
            examples,
        })
    }
}

impl PluralLocale for IcuPluralLocale {
    fn code(&self) -> &str {
        &self.code
    }

    fn plural_categories(&self) -> Vec<PluralCategory> {
        self.categories.clone()
    }

    fn plural_examples(&self, category: PluralCategory) -> Option<Vec<u64>> {
        self.examples.get(&category).cloned()
    }
}

/// Plural data supplied directly, e.g. from a locale catalog's CLDR list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPluralLocale {
    code: String,
    categories: Vec<PluralCategory>,
    examples: Option<HashMap<PluralCategory, Vec<u64>>>,
}

impl StaticPluralLocale {
    pub fn new(code: &str, categories: &[PluralCategory]) -> Self {
        StaticPluralLocale {
            code: code.to_string(),
            categories: categories.to_vec(),
            examples: None,
        }
    }

    /// Build from category names, e.g. `["one", "few", "many", "other"]`.
    pub fn from_names(code: &str, names: &[&str]) -> Result<Self, LocaleError> {
        let categories = names
            .iter()
            .map(|name| name.parse())
            .collect::<Result<Vec<PluralCategory>, _>>()?;
        Ok(Self::new(code, &categories))
    }

    pub fn with_examples(mut self, category: PluralCategory, numbers: &[u64]) -> Self {
        self.examples
            .get_or_insert_with(HashMap::new)
            .insert(category, numbers.to_vec());
        self
    }
}

impl PluralLocale for StaticPluralLocale {
    fn code(&self) -> &str {
        &self.code
    }

    fn plural_categories(&self) -> Vec<PluralCategory> {
        self.categories.clone()
    }

    fn plural_examples(&self, category: PluralCategory) -> Option<Vec<u64>> {
        self.examples
            .as_ref()
            .and_then(|table| table.get(&category).cloned())
    }
}
