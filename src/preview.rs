//! Single-string previews of Fluent entries.
//!
//! A preview is what a reviewer sees in a list of strings: the value (or the
//! first attribute), with every selector resolved to its default variant and
//! other placeables shown in their source form. Previews never fail; text
//! that does not parse is shown as-is.

use crate::ast::{Entry, Pattern, PatternElement};
use crate::parser::Parser;
use crate::serializer::serialize_placeable;

/// Preview the entry in `source`, or return `source` unchanged if it is not a
/// valid Message or Term.
pub fn preview(source: &str) -> String {
    match Parser::new(source).parse_entry() {
        Ok(entry) => preview_entry(&entry),
        Err(_) => source.to_string(),
    }
}

pub fn preview_entry(entry: &Entry) -> String {
    entry.primary_pattern().map(preview_pattern).unwrap_or_default()
}

pub fn preview_pattern(pattern: &Pattern) -> String {
    let mut out = String::new();
    for element in &pattern.elements {
        match element {
            PatternElement::Text(text) => out.push_str(text),
            PatternElement::Marker(marker) => out.push_str(&marker.preview),
            PatternElement::Placeable(expression) => match expression.as_select() {
                Some(select) => {
                    let chosen = select.default_variant().or(select.variants.last());
                    if let Some(variant) = chosen {
                        out.push_str(&preview_pattern(&variant.value));
                    }
                }
                None => out.push_str(&serialize_placeable(expression)),
            },
        }
    }
    out
}
