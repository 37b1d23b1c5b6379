//! Placeholder wrapping and restoration.
//!
//! Before a pattern goes to a translation backend, every placeable that is
//! not a selector is serialized, recorded, and swapped for an inert marker:
//!
//! ```text
//! Hello { $user }!
//! Hello <span data-l10n-placeholder="0" translate="no">$user</span>!
//! ```
//!
//! Backends leave `translate="no"` spans alone, so the translated text can be
//! mapped back to the original placeables by index alone. The text inside the
//! span is only a preview for the backend. Inside plural variants a reference
//! to the plural variable previews as an example number for the variant, so
//! that the backend sees "3 files" rather than "$count files".

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::{Expression, InlineExpression, Marker, Pattern, PatternElement, VariantKey};
use crate::locale::{PluralCategory, PluralLocale};
use crate::mt::plural_expansion::plural_variable;
use crate::serializer::serialize_placeable;

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<span data-l10n-placeholder="(\d+)" translate="no">([^<]*)</span>"#)
        .expect("marker pattern is a valid regex")
});

/// Literal source text of every wrapped placeable, indexed by marker.
///
/// Append-only; one list per top-level pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderRecords {
    literals: Vec<String>,
}

impl PlaceholderRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a literal and return its marker index.
    pub fn push(&mut self, literal: String) -> usize {
        self.literals.push(literal);
        self.literals.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.literals.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.literals.iter().map(String::as_str)
    }
}

/// The plural variable and the key of the variant being wrapped.
struct PluralScope {
    variable: String,
    key: VariantKey,
}

/// Replace every non-selector placeable in `pattern` with a marker.
///
/// Select expressions stay in place; their variants are wrapped
/// recursively into the same `records`. Source text that already looks
/// like a marker is recorded too, so it comes back verbatim.
pub fn wrap_pattern(pattern: &mut Pattern, locale: &dyn PluralLocale, records: &mut PlaceholderRecords) {
    wrap_elements(&mut pattern.elements, locale, records, None);
}

fn wrap_elements(
    elements: &mut Vec<PatternElement>,
    locale: &dyn PluralLocale,
    records: &mut PlaceholderRecords,
    scope: Option<&PluralScope>,
) {
    let mut wrapped = Vec::with_capacity(elements.len());
    for element in std::mem::take(elements) {
        let mut expression = match element {
            PatternElement::Placeable(expression) => expression,
            PatternElement::Text(text) => {
                shield_text(&text, records, &mut wrapped);
                continue;
            }
            marker @ PatternElement::Marker(_) => {
                wrapped.push(marker);
                continue;
            }
        };

        if let Some(select) = expression.as_select_mut() {
            let variable = plural_variable(select).map(str::to_string);
            for variant in &mut select.variants {
                match &variable {
                    Some(variable) => {
                        let inner = PluralScope {
                            variable: variable.clone(),
                            key: variant.key.clone(),
                        };
                        wrap_elements(&mut variant.value.elements, locale, records, Some(&inner));
                    }
                    None => wrap_elements(&mut variant.value.elements, locale, records, scope),
                }
            }
            wrapped.push(PatternElement::Placeable(expression));
            continue;
        }

        let literal = serialize_placeable(&expression);
        let preview = match scope {
            Some(scope) if references_variable(&expression, &scope.variable) => {
                example_number(&scope.key, locale)
            }
            _ => sanitize_preview(&literal),
        };
        let index = records.push(literal);
        wrapped.push(PatternElement::Marker(Marker { index, preview }));
    }
    *elements = wrapped;
}

/// Push `text` onto `out`, turning marker-shaped spans into markers of
/// their own.
fn shield_text(text: &str, records: &mut PlaceholderRecords, out: &mut Vec<PatternElement>) {
    let mut last = 0;
    for caps in MARKER_RE.captures_iter(text) {
        let Some(found) = caps.get(0) else {
            continue;
        };
        if found.start() > last {
            out.push(PatternElement::Text(text[last..found.start()].to_string()));
        }
        let preview = sanitize_preview(&caps[2]);
        let index = records.push(found.as_str().to_string());
        out.push(PatternElement::Marker(Marker { index, preview }));
        last = found.end();
    }
    if last < text.len() || last == 0 {
        out.push(PatternElement::Text(text[last..].to_string()));
    }
}

/// True for `$var`, `NUMBER($var, ...)` and nested placeables around either.
fn references_variable(expression: &Expression, variable: &str) -> bool {
    match expression {
        Expression::Inline(inline) => inline_references(inline, variable),
        Expression::Select(_) => false,
    }
}

fn inline_references(inline: &InlineExpression, variable: &str) -> bool {
    match inline {
        InlineExpression::VariableReference { id } => id == variable,
        InlineExpression::FunctionReference { id, arguments } if id == "NUMBER" => matches!(
            arguments.positional.first(),
            Some(InlineExpression::VariableReference { id }) if id == variable
        ),
        InlineExpression::Placeable { expression } => references_variable(expression, variable),
        _ => false,
    }
}

/// Number shown in place of the plural variable inside a variant.
fn example_number(key: &VariantKey, locale: &dyn PluralLocale) -> String {
    let name = match key {
        VariantKey::NumberLiteral(value) => return value.clone(),
        VariantKey::Identifier(name) => name,
    };
    let category = name.parse::<PluralCategory>().unwrap_or(PluralCategory::Other);
    let number = match category {
        PluralCategory::Zero | PluralCategory::One | PluralCategory::Two => {
            category.fallback_example()
        }
        _ => locale
            .plural_examples(category)
            .and_then(|examples| examples.first().copied())
            .unwrap_or_else(|| category.fallback_example()),
    };
    number.to_string()
}

/// Preview text for a marker: the literal without control characters or
/// characters that would break the marker or the surrounding FTL.
pub fn sanitize_preview(literal: &str) -> String {
    literal
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '{' | '}' | '<' | '>' | '"'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Restore every marker in `text` from `records`, in one pass.
///
/// Markers may appear in any order or more than once. A marker whose index
/// has no record is left as it is.
pub fn unwrap_placeholders(text: &str, records: &PlaceholderRecords) -> String {
    MARKER_RE
        .replace_all(text, |caps: &Captures| {
            let literal = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| records.get(index));
            match literal {
                Some(literal) => literal.to_string(),
                None => {
                    debug!("No placeholder record for marker {}, keeping it", &caps[1]);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Replace every marker in `text` with its preview.
pub fn strip_placeholders(text: &str) -> String {
    MARKER_RE.replace_all(text, "$2").into_owned()
}

/// Byte ranges of the markers in `text`, in order.
pub fn marker_spans(text: &str) -> Vec<Range<usize>> {
    MARKER_RE.find_iter(text).map(|m| m.range()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten_structure;
    use crate::locale::StaticPluralLocale;
    use crate::parser::parse_entry;
    use crate::serializer::serialize_pattern;

    fn english() -> StaticPluralLocale {
        StaticPluralLocale::new("en", &[PluralCategory::One, PluralCategory::Other])
    }

    fn value_of(source: &str) -> Pattern {
        parse_entry(source).unwrap().value.unwrap()
    }

    fn wrapped(source: &str) -> (Pattern, PlaceholderRecords) {
        let mut pattern = value_of(source);
        let mut records = PlaceholderRecords::new();
        wrap_pattern(&mut pattern, &english(), &mut records);
        (pattern, records)
    }

    // ========== Wrapping Tests ==========

    #[test]
    fn test_wrap_variable_reference() {
        let (pattern, records) = wrapped("hello = Hello { $user }!\n");
        assert_eq!(
            serialize_pattern(&pattern),
            "Hello <span data-l10n-placeholder=\"0\" translate=\"no\">$user</span>!"
        );
        assert_eq!(records.get(0), Some("{ $user }"));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_wrap_text_only_pattern_is_unchanged() {
        let (pattern, records) = wrapped("plain = Just text\n");
        assert_eq!(pattern, Pattern::text("Just text"));
        assert!(records.is_empty());
    }

    #[test]
    fn test_wrap_indices_follow_source_order() {
        let (pattern, records) = wrapped("by = { $title } by { -brand-name } and { message }\n");
        let indices: Vec<usize> = pattern
            .elements
            .iter()
            .filter_map(|el| match el {
                PatternElement::Marker(marker) => Some(marker.index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(
            records.iter().collect::<Vec<_>>(),
            vec!["{ $title }", "{ -brand-name }", "{ message }"]
        );
    }

    #[test]
    fn test_wrap_keeps_select_and_wraps_variants() {
        let (pattern, records) = wrapped(
            "shared = { $gender ->\n        [male] { $user } shared\n       *[other] { $user } shared too\n    }\n",
        );
        let select = pattern.elements[0].as_select().unwrap();
        assert_eq!(select.selector, InlineExpression::variable("gender"));
        assert_eq!(records.len(), 2);
        assert_eq!(
            select.variants[1].value.elements[0],
            PatternElement::Marker(Marker::new(1, "$user"))
        );
    }

    #[test]
    fn test_plural_variable_previews_as_example_number() {
        let locale = StaticPluralLocale::new(
            "ru",
            &[PluralCategory::One, PluralCategory::Few, PluralCategory::Many, PluralCategory::Other],
        )
        .with_examples(PluralCategory::Many, &[5, 6, 7]);
        let mut pattern = value_of(
            "files = { $n ->\n        [0] { $n } files\n        [one] { $n } file\n        [few] { $n } files\n        [many] { NUMBER($n) } files\n       *[other] { $n } files by { $user }\n    }\n",
        );
        let mut records = PlaceholderRecords::new();
        wrap_pattern(&mut pattern, &locale, &mut records);

        let select = pattern.elements[0].as_select().unwrap();
        let previews: Vec<String> = select
            .variants
            .iter()
            .map(|variant| match &variant.value.elements[0] {
                PatternElement::Marker(marker) => marker.preview.clone(),
                other => panic!("expected marker, got {:?}", other),
            })
            .collect();
        assert_eq!(previews, vec!["0", "1", "3", "5", "14"]);

        // Other placeables in plural variants keep their literal preview.
        assert_eq!(
            select.variants[4].value.elements[2],
            PatternElement::Marker(Marker::new(5, "$user"))
        );
        assert_eq!(records.get(3), Some("{ NUMBER($n) }"));
    }

    #[test]
    fn test_non_plural_selector_does_not_use_examples() {
        let (pattern, _) = wrapped(
            "by = { $gender ->\n        [male] { $gender } user\n       *[other] { $gender } users\n    }\n",
        );
        let select = pattern.elements[0].as_select().unwrap();
        assert_eq!(
            select.variants[0].value.elements[0],
            PatternElement::Marker(Marker::new(0, "$gender"))
        );
    }

    #[test]
    fn test_sanitize_preview() {
        assert_eq!(sanitize_preview("{ $user }"), "$user");
        assert_eq!(sanitize_preview("{ \"<b>\" }"), "b");
        assert_eq!(sanitize_preview("{ -brand\u{7} }"), "-brand");
    }

    // ========== Unwrapping Tests ==========

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let sources = [
            "a = Hello { $user }, you have { NUMBER($count, minimumFractionDigits: 2) } points\n",
            "b = { $n ->\n        [one] One { -brand } file\n       *[other] { $n } { -brand } files\n    }\n",
            "c = Nothing to wrap\n",
        ];
        for source in sources {
            let mut original = value_of(source);
            flatten_structure(&mut original);
            let mut pattern = original.clone();
            let mut records = PlaceholderRecords::new();
            wrap_pattern(&mut pattern, &english(), &mut records);
            assert_eq!(
                unwrap_placeholders(&serialize_pattern(&pattern), &records),
                serialize_pattern(&original),
                "roundtrip failed for {:?}",
                source
            );
        }
    }

    #[test]
    fn test_marker_shaped_source_text_survives_roundtrip() {
        let source = "a = Use <span data-l10n-placeholder=\"0\" translate=\"no\">x</span> with { $user }\n";
        let original = value_of(source);
        let (pattern, records) = wrapped(source);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records.get(0),
            Some("<span data-l10n-placeholder=\"0\" translate=\"no\">x</span>")
        );
        assert_eq!(records.get(1), Some("{ $user }"));
        assert_eq!(
            unwrap_placeholders(&serialize_pattern(&pattern), &records),
            serialize_pattern(&original)
        );
    }

    #[test]
    fn test_unwrap_reordered_and_repeated_markers() {
        let (pattern, records) = wrapped("by = { $title } by { $author }\n");
        let text = serialize_pattern(&pattern);
        let spans = marker_spans(&text);
        let first = &text[spans[0].clone()];
        let second = &text[spans[1].clone()];
        let translated = format!("{} von {} ({})", second, first, second);
        assert_eq!(
            unwrap_placeholders(&translated, &records),
            "{ $author } von { $title } ({ $author })"
        );
    }

    #[test]
    fn test_unwrap_dropped_marker() {
        let (_, records) = wrapped("ref = See { message } now\n");
        assert_eq!(unwrap_placeholders("Voir maintenant", &records), "Voir maintenant");
    }

    #[test]
    fn test_unwrap_unknown_index_is_left_verbatim() {
        let (_, records) = wrapped("ref = See { message } now\n");
        let garbled = "Voir <span data-l10n-placeholder=\"7\" translate=\"no\">message</span>";
        assert_eq!(unwrap_placeholders(garbled, &records), garbled);
    }

    #[test]
    fn test_unwrap_ignores_mangled_markup() {
        let (_, records) = wrapped("ref = See { message } now\n");
        let mangled = "Voir <span data-l10n-placeholder=0>message</span>";
        assert_eq!(unwrap_placeholders(mangled, &records), mangled);
    }

    #[test]
    fn test_unwrap_without_markers() {
        let records = PlaceholderRecords::new();
        assert_eq!(unwrap_placeholders("Bonjour", &records), "Bonjour");
    }

    #[test]
    fn test_strip_placeholders() {
        let (pattern, _) = wrapped("hello = Hello { $user } from { -brand }\n");
        assert_eq!(
            strip_placeholders(&serialize_pattern(&pattern)),
            "Hello $user from -brand"
        );
    }
}
