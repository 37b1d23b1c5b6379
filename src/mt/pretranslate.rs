//! Pretranslation orchestrator.
//!
//! Runs one Fluent entry through the whole pipeline:
//!
//! 1. **Prepare** each pattern: flatten selectors so every variant is a full
//!    sentence, expand plural selects to the target locale's categories, and
//!    wrap the remaining placeables in markers.
//! 2. **Apply**: every pattern without a top-level select is one translation
//!    unit. Its text goes to the backend once; the answer is unwrapped and
//!    becomes the unit's only text element.
//! 3. Serialize the translated entry and, optionally, check that it parses.
//!
//! The value and each attribute are translated independently.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ast::{Entry, Pattern, PatternElement};
use crate::config::{FailurePolicy, PretranslationConfig};
use crate::flatten::flatten_structure;
use crate::locale::{LocaleError, PluralLocale};
use crate::mt::error::PretranslationError;
use crate::mt::placeholder::{PlaceholderRecords, unwrap_placeholders, wrap_pattern};
use crate::mt::plural_expansion::expand_plurals_in_pattern;
use crate::mt::translator::{MachineTranslator, TranslationRequest, validate_locale};
use crate::parser::Parser;
use crate::serializer::{serialize_entry, serialize_pattern};

/// A pattern ready for translation, with the records needed to restore it.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPattern {
    pub pattern: Pattern,
    pub records: PlaceholderRecords,
}

/// A translated pattern and the services that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPattern {
    pub pattern: Pattern,
    pub services: Vec<String>,
}

/// Flatten, expand and wrap a copy of `pattern` for `locale`.
pub fn prepare_pattern(pattern: &Pattern, locale: &dyn PluralLocale) -> PreparedPattern {
    let mut pattern = pattern.clone();
    flatten_structure(&mut pattern);
    let expanded = expand_plurals_in_pattern(&mut pattern, locale);
    let mut records = PlaceholderRecords::new();
    wrap_pattern(&mut pattern, locale, &mut records);
    debug!(
        "Prepared pattern for '{}': {} plural selects expanded, {} placeholders",
        locale.code(),
        expanded,
        records.len()
    );
    PreparedPattern { pattern, records }
}

/// Select variant taken at each nesting level: (element index, variant index).
type LeafPath = Vec<(usize, usize)>;

/// Translate every unit of a prepared pattern.
///
/// The backend is called once per unit, in document order. On the first
/// failure the whole pattern fails and `prepared` is left as it was.
pub async fn apply_pattern(
    prepared: &PreparedPattern,
    translator: &dyn MachineTranslator,
    locale: &str,
    config: &PretranslationConfig,
) -> Result<AppliedPattern, PretranslationError> {
    let mut pattern = prepared.pattern.clone();
    let mut leaves = Vec::new();
    collect_leaves(&pattern, &mut Vec::new(), &mut leaves);

    let mut services: Vec<String> = Vec::new();
    for path in &leaves {
        let Some(leaf) = leaf_mut(&mut pattern, path) else {
            continue;
        };

        let mut wrapped = serialize_pattern(leaf);
        if config.collapse_newlines {
            wrapped = collapse_newlines(&wrapped);
        }
        if wrapped.trim().is_empty() {
            continue;
        }
        let raw = unwrap_placeholders(&wrapped, &prepared.records);

        debug!("Translating '{}' into '{}'", raw, locale);
        let request = TranslationRequest::new(&raw, &wrapped, locale);
        let translation = translator.translate(&request).await.map_err(|reason| {
            PretranslationError::TranslationUnavailable {
                text: raw.clone(),
                locale: locale.to_string(),
                reason,
            }
        })?;

        let text = unwrap_placeholders(&translation.text, &prepared.records);
        leaf.elements = vec![PatternElement::Text(text)];
        if !services.contains(&translation.service) {
            services.push(translation.service);
        }
    }

    restore_markers(&mut pattern, &prepared.records);
    Ok(AppliedPattern { pattern, services })
}

fn collect_leaves(pattern: &Pattern, path: &mut LeafPath, leaves: &mut Vec<LeafPath>) {
    if !pattern.has_select() {
        leaves.push(path.clone());
        return;
    }
    for (element_index, element) in pattern.elements.iter().enumerate() {
        if let Some(select) = element.as_select() {
            for (variant_index, variant) in select.variants.iter().enumerate() {
                path.push((element_index, variant_index));
                collect_leaves(&variant.value, path, leaves);
                path.pop();
            }
        }
    }
}

fn leaf_mut<'a>(pattern: &'a mut Pattern, path: &[(usize, usize)]) -> Option<&'a mut Pattern> {
    let mut current = pattern;
    for &(element, variant) in path {
        current = &mut current
            .elements
            .get_mut(element)?
            .as_select_mut()?
            .variants
            .get_mut(variant)?
            .value;
    }
    Some(current)
}

fn collapse_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ")
}

/// Turn markers that never went to a backend back into their literals.
fn restore_markers(pattern: &mut Pattern, records: &PlaceholderRecords) {
    for element in &mut pattern.elements {
        match element {
            PatternElement::Marker(marker) => {
                let literal = records
                    .get(marker.index)
                    .map(str::to_string)
                    .unwrap_or_else(|| marker.to_string());
                *element = PatternElement::Text(literal);
            }
            PatternElement::Placeable(expression) => {
                if let Some(select) = expression.as_select_mut() {
                    for variant in &mut select.variants {
                        restore_markers(&mut variant.value, records);
                    }
                }
            }
            PatternElement::Text(_) => {}
        }
    }
}

/// The part of an entry translated as one pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationUnit {
    Value,
    Attribute(String),
}

impl std::fmt::Display for TranslationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationUnit::Value => write!(f, "value"),
            TranslationUnit::Attribute(id) => write!(f, ".{}", id),
        }
    }
}

/// The value and attributes of `entry`, in source order.
pub fn translation_units(entry: &Entry) -> Vec<(TranslationUnit, &Pattern)> {
    entry
        .value
        .iter()
        .map(|pattern| (TranslationUnit::Value, pattern))
        .chain(
            entry
                .attributes
                .iter()
                .map(|attr| (TranslationUnit::Attribute(attr.id.clone()), &attr.value)),
        )
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitReport {
    pub unit: TranslationUnit,
    /// Services used for the unit, or why it failed
    pub outcome: Result<Vec<String>, PretranslationError>,
}

/// Result of pretranslating one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryReport {
    pub id: String,
    pub entry: Entry,
    /// Serialized FTL of `entry`
    pub text: String,
    pub units: Vec<UnitReport>,
}

impl EntryReport {
    pub fn to_ftl(&self) -> &str {
        &self.text
    }

    /// True when every unit was translated.
    pub fn is_complete(&self) -> bool {
        self.units.iter().all(|unit| unit.outcome.is_ok())
    }

    /// Distinct services used across all units, in first-use order.
    pub fn services(&self) -> Vec<String> {
        let mut services: Vec<String> = Vec::new();
        for unit in &self.units {
            if let Ok(used) = &unit.outcome {
                for service in used {
                    if !services.contains(service) {
                        services.push(service.clone());
                    }
                }
            }
        }
        services
    }

    pub fn failures(&self) -> impl Iterator<Item = (&TranslationUnit, &PretranslationError)> {
        self.units
            .iter()
            .filter_map(|unit| unit.outcome.as_ref().err().map(|e| (&unit.unit, e)))
    }
}

/// Pretranslates entries through a translation backend.
///
/// # Example
///
/// ```ignore
/// let pretranslator = Pretranslator::new(MockTranslator::new(MockMode::Suffix));
/// let locale = IcuPluralLocale::new("fr")?;
/// let report = pretranslator.pretranslate_entry("hello = Hello!\n", &locale).await?;
/// assert_eq!(report.to_ftl(), "hello = Hello!_fr\n");
/// ```
pub struct Pretranslator<T: MachineTranslator> {
    translator: T,
    config: PretranslationConfig,
}

impl<T: MachineTranslator> Pretranslator<T> {
    pub fn new(translator: T) -> Self {
        Self {
            translator,
            config: PretranslationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PretranslationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PretranslationConfig {
        &self.config
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    /// Prepare and apply a single pattern.
    pub async fn pretranslate_pattern(
        &self,
        pattern: &Pattern,
        locale: &dyn PluralLocale,
    ) -> Result<AppliedPattern, PretranslationError> {
        let prepared = prepare_pattern(pattern, locale);
        apply_pattern(&prepared, &self.translator, locale.code(), &self.config).await
    }

    /// Pretranslate the Message or Term in `source` into `locale`.
    ///
    /// # Errors
    ///
    /// - `Unparseable` if `source` is not a valid entry
    /// - `TranslationUnavailable` if a unit fails under `FailurePolicy::WholeEntry`
    /// - `InvalidOutput` if output verification is on and the result does not parse
    /// - `Locale` if the locale code is malformed
    pub async fn pretranslate_entry(
        &self,
        source: &str,
        locale: &dyn PluralLocale,
    ) -> Result<EntryReport, PretranslationError> {
        let code = locale.code();
        validate_locale(code).map_err(|e| LocaleError::InvalidLocale {
            code: code.to_string(),
            reason: e.to_string(),
        })?;

        let entry = Parser::new(source).parse_entry().map_err(|junk| {
            warn!("Skipping unparseable source: {}", junk);
            PretranslationError::Unparseable { junk }
        })?;
        info!("Pretranslating '{}' into '{}'", entry.id, code);

        let mut translated = entry.clone();
        let mut units = Vec::new();
        let mut results: Vec<Option<Pattern>> = Vec::new();

        for (unit, pattern) in translation_units(&entry) {
            match self.pretranslate_pattern(pattern, locale).await {
                Ok(applied) => {
                    results.push(Some(applied.pattern));
                    units.push(UnitReport {
                        unit,
                        outcome: Ok(applied.services),
                    });
                }
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::WholeEntry => {
                        warn!("Pretranslation of '{}' {} failed: {}", entry.id, unit, e);
                        return Err(e);
                    }
                    FailurePolicy::PerUnit => {
                        warn!(
                            "Pretranslation of '{}' {} failed, keeping source: {}",
                            entry.id, unit, e
                        );
                        results.push(None);
                        units.push(UnitReport {
                            unit,
                            outcome: Err(e),
                        });
                    }
                },
            }
        }

        // patterns_mut yields the value first, then attributes: the same
        // order as the units above.
        for (target, result) in translated.patterns_mut().zip(results) {
            if let Some(pattern) = result {
                *target = pattern;
            }
        }

        let text = serialize_entry(&translated);
        let entry = if self.config.verify_output {
            Parser::new(&text)
                .parse_entry()
                .map_err(|junk| PretranslationError::InvalidOutput {
                    id: entry.id.clone(),
                    junk,
                })?
        } else {
            translated
        };

        let report = EntryReport {
            id: entry.id.clone(),
            entry,
            text,
            units,
        };
        info!(
            "Pretranslated '{}' into '{}' using {:?}",
            report.id,
            code,
            report.services()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Marker;
    use crate::locale::{PluralCategory, StaticPluralLocale};
    use crate::mt::error::MtError;
    use crate::mt::mock::{MockMode, MockTranslator};
    use crate::parser::parse_entry;

    fn french() -> StaticPluralLocale {
        StaticPluralLocale::new("fr", &[PluralCategory::One, PluralCategory::Many, PluralCategory::Other])
    }

    fn value_of(source: &str) -> Pattern {
        parse_entry(source).unwrap().value.unwrap()
    }

    // ========== Prepare Tests ==========

    #[test]
    fn test_prepare_wraps_placeables() {
        let prepared = prepare_pattern(&value_of("hello = Hello { $user }!\n"), &french());
        assert_eq!(
            prepared.pattern.elements,
            vec![
                PatternElement::Text("Hello ".to_string()),
                PatternElement::Marker(Marker::new(0, "$user")),
                PatternElement::Text("!".to_string()),
            ]
        );
        assert_eq!(prepared.records.get(0), Some("{ $user }"));
    }

    #[test]
    fn test_prepare_flattens_and_expands() {
        let prepared = prepare_pattern(
            &value_of("tabs = Open { $n ->\n        [one] one tab\n       *[other] { $n } tabs\n    }\n"),
            &french(),
        );
        assert_eq!(prepared.pattern.len(), 1);
        let select = prepared.pattern.elements[0].as_select().unwrap();
        let keys: Vec<&str> = select.variants.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["one", "many", "other"]);
        assert!(select.variants[2].default);
        assert_eq!(
            serialize_pattern(&select.variants[1].value),
            format!("Open {} tabs", Marker::new(0, "11"))
        );
    }

    #[test]
    fn test_prepare_does_not_touch_source() {
        let source = value_of("hello = Hello { $user }!\n");
        let copy = source.clone();
        prepare_pattern(&source, &french());
        assert_eq!(source, copy);
    }

    // ========== Apply Tests ==========

    #[tokio::test]
    async fn test_apply_single_unit() {
        let prepared = prepare_pattern(&value_of("hello = Hello { $user }!\n"), &french());
        let mock = MockTranslator::new(MockMode::Suffix);
        let applied = apply_pattern(&prepared, &mock, "fr", &PretranslationConfig::default())
            .await
            .unwrap();
        assert_eq!(applied.pattern, Pattern::text("Hello { $user }!_fr"));
        assert_eq!(applied.services, vec!["Mock Translator"]);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_apply_one_call_per_variant() {
        let prepared = prepare_pattern(
            &value_of("tabs = { $n ->\n        [one] One tab\n       *[other] { $n } tabs\n    }\n"),
            &french(),
        );
        let mock = MockTranslator::new(MockMode::Suffix);
        let applied = apply_pattern(&prepared, &mock, "fr", &PretranslationConfig::default())
            .await
            .unwrap();
        assert_eq!(mock.call_count(), 3);

        let select = applied.pattern.elements[0].as_select().unwrap();
        let texts: Vec<String> = select
            .variants
            .iter()
            .map(|v| serialize_pattern(&v.value))
            .collect();
        assert_eq!(texts, vec!["One tab_fr", "{ $n } tabs_fr", "{ $n } tabs_fr"]);
    }

    #[tokio::test]
    async fn test_apply_failure_leaves_prepared_unchanged() {
        let prepared = prepare_pattern(&value_of("hello = Hello { $user }!\n"), &french());
        let before = prepared.clone();
        let mock = MockTranslator::new(MockMode::Error("offline".to_string()));

        let error = apply_pattern(&prepared, &mock, "fr", &PretranslationConfig::default())
            .await
            .unwrap_err();
        assert_eq!(
            error,
            PretranslationError::TranslationUnavailable {
                text: "Hello { $user }!".to_string(),
                locale: "fr".to_string(),
                reason: MtError::TranslationError("offline".to_string()),
            }
        );
        assert_eq!(prepared, before);
    }

    #[tokio::test]
    async fn test_apply_collapses_newlines() {
        let prepared = prepare_pattern(&value_of("intro =\n    Line one\n    Line two\n"), &french());
        let mock = MockTranslator::new(MockMode::NoOp);

        let collapsed = apply_pattern(&prepared, &mock, "fr", &PretranslationConfig::default())
            .await
            .unwrap();
        assert_eq!(collapsed.pattern, Pattern::text("Line one Line two"));

        let config = PretranslationConfig::default().with_collapse_newlines(false);
        let kept = apply_pattern(&prepared, &mock, "fr", &config).await.unwrap();
        assert_eq!(kept.pattern, Pattern::text("Line one\nLine two"));
    }

    #[tokio::test]
    async fn test_apply_skips_blank_units() {
        let prepared = prepare_pattern(&value_of("blank = { \"\" }\n"), &french());
        let mock = MockTranslator::new(MockMode::Suffix);
        let applied = apply_pattern(&prepared, &mock, "fr", &PretranslationConfig::default())
            .await
            .unwrap();
        assert_eq!(mock.call_count(), 0);
        assert_eq!(applied.pattern, Pattern::text(""));
        assert!(applied.services.is_empty());
    }

    #[test]
    fn test_leaf_paths() {
        let pattern = value_of(
            "pair = { $a ->\n        [x] A\n       *[y] { $b ->\n            [one] B\n           *[other] C\n        }\n    } { $c ->\n        [x] D\n       *[y] E\n    }\n",
        );
        let mut leaves = Vec::new();
        collect_leaves(&pattern, &mut Vec::new(), &mut leaves);
        assert_eq!(
            leaves,
            vec![
                vec![(0, 0)],
                vec![(0, 1), (0, 0)],
                vec![(0, 1), (0, 1)],
                vec![(2, 0)],
                vec![(2, 1)],
            ]
        );
    }

    // ========== Report Tests ==========

    #[test]
    fn test_report_services_and_failures() {
        let report = EntryReport {
            id: "login".to_string(),
            entry: parse_entry("login = Log in\n").unwrap(),
            text: "login = Log in\n".to_string(),
            units: vec![
                UnitReport {
                    unit: TranslationUnit::Value,
                    outcome: Ok(vec!["A".to_string(), "B".to_string()]),
                },
                UnitReport {
                    unit: TranslationUnit::Attribute("title".to_string()),
                    outcome: Ok(vec!["B".to_string()]),
                },
                UnitReport {
                    unit: TranslationUnit::Attribute("aria-label".to_string()),
                    outcome: Err(PretranslationError::TranslationUnavailable {
                        text: "Log in".to_string(),
                        locale: "fr".to_string(),
                        reason: MtError::Unavailable("down".to_string()),
                    }),
                },
            ],
        };
        assert_eq!(report.services(), vec!["A", "B"]);
        assert!(!report.is_complete());
        let failed: Vec<String> = report.failures().map(|(unit, _)| unit.to_string()).collect();
        assert_eq!(failed, vec![".aria-label"]);
    }
}
