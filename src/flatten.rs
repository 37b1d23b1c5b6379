//! Selector flattening.
//!
//! Rewrites a pattern so that select expressions are the only branch points
//! left in it. Text before the first selector is copied to the front of every
//! variant and text after a selector is copied to the end of every variant,
//! so each variant reads as a complete, independently translatable string.
//!
//! # Example
//!
//! ```ignore
//! // Before
//! "You have { $n -> [one] one file *[other] { $n } files } left."
//!
//! // After (preview mode)
//! { $n ->
//!     [one] You have one file left.
//!    *[other] You have { $n } files left.
//! }
//! ```
//!
//! Whitespace between two selectors is kept as its own text element instead
//! of being duplicated into both.

use std::mem;

use crate::ast::{Entry, Pattern, PatternElement};
use crate::parser::Parser;
use crate::serializer::{serialize_entry, serialize_placeable};

/// How non-selector placeables are treated while flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Serialize them into the surrounding text (preview).
    Collapse,
    /// Keep them as elements so they can be wrapped later (pretranslation).
    Structural,
}

/// Flatten a pattern for preview: the result holds only text and select
/// expressions.
pub fn flatten_pattern(pattern: &mut Pattern) {
    flatten(pattern, Mode::Collapse);
}

/// Flatten selectors but keep other placeables as elements.
pub fn flatten_structure(pattern: &mut Pattern) {
    flatten(pattern, Mode::Structural);
}

/// Flatten the value and every attribute of an entry, each independently.
pub fn flatten_entry(entry: &mut Entry) {
    for pattern in entry.patterns_mut() {
        flatten_pattern(pattern);
    }
}

/// Parse, flatten and reserialize an entry. Unparseable input is returned
/// unchanged.
pub fn flatten_source(source: &str) -> String {
    match Parser::new(source).parse_entry() {
        Ok(mut entry) => {
            flatten_entry(&mut entry);
            serialize_entry(&entry)
        }
        Err(_) => source.to_string(),
    }
}

fn flatten(pattern: &mut Pattern, mode: Mode) {
    let mut output: Vec<PatternElement> = Vec::new();
    let mut pending = Segment::default();
    let mut previous: Option<usize> = None;

    for element in mem::take(&mut pattern.elements) {
        match element {
            PatternElement::Text(text) => pending.push_text(&text),
            PatternElement::Marker(marker) => match mode {
                Mode::Collapse => pending.push_text(&marker.to_string()),
                Mode::Structural => pending.push(PatternElement::Marker(marker)),
            },
            PatternElement::Placeable(expression) => match expression.into_select() {
                Ok(mut select) => {
                    settle_after_select(&mut output, previous, &mut pending, mode);

                    if !pending.is_empty() && pending.is_blank() {
                        output.append(&mut pending.elements);
                    }

                    for variant in &mut select.variants {
                        if !pending.is_empty() {
                            prepend(&mut variant.value, pending.clone());
                        }
                        flatten(&mut variant.value, mode);
                    }
                    pending = Segment::default();

                    output.push(PatternElement::select(select));
                    previous = Some(output.len() - 1);
                }
                Err(expression) if expression.is_empty_string_literal() => {}
                Err(expression) => match mode {
                    Mode::Collapse => pending.push_text(&serialize_placeable(&expression)),
                    Mode::Structural => pending.push(PatternElement::Placeable(expression)),
                },
            },
        }
    }

    settle_after_select(&mut output, previous, &mut pending, mode);
    output.append(&mut pending.elements);

    if output.is_empty() {
        output.push(PatternElement::Text(String::new()));
    }
    pattern.elements = output;
}

/// Move text that followed the previous selector into the end of each of its
/// variants, holding trailing whitespace back as the new pending buffer.
fn settle_after_select(
    output: &mut [PatternElement],
    previous: Option<usize>,
    pending: &mut Segment,
    mode: Mode,
) {
    let Some(index) = previous else {
        return;
    };
    let trailing = pending.split_trailing_whitespace();
    if !pending.is_empty() {
        if let Some(select) = output.get_mut(index).and_then(|el| el.as_select_mut()) {
            for variant in &mut select.variants {
                append(&mut variant.value, pending.clone());
                // Appended text may sit next to a nested selector.
                flatten(&mut variant.value, mode);
            }
        }
    }
    *pending = trailing;
}

fn prepend(pattern: &mut Pattern, segment: Segment) {
    let mut elements = segment.elements;
    let merge = matches!(elements.last(), Some(PatternElement::Text(_)))
        && matches!(pattern.elements.first(), Some(PatternElement::Text(_)));
    if merge {
        if let (PatternElement::Text(first), Some(PatternElement::Text(last))) =
            (pattern.elements.remove(0), elements.last_mut())
        {
            last.push_str(&first);
        }
    }
    elements.append(&mut pattern.elements);
    pattern.elements = elements;
}

fn append(pattern: &mut Pattern, segment: Segment) {
    let mut elements = segment.elements;
    let merge = matches!(pattern.elements.last(), Some(PatternElement::Text(_)))
        && matches!(elements.first(), Some(PatternElement::Text(_)));
    if merge {
        if let (Some(PatternElement::Text(last)), PatternElement::Text(first)) =
            (pattern.elements.last_mut(), elements.remove(0))
        {
            last.push_str(&first);
        }
    }
    pattern.elements.append(&mut elements);
}

/// Run of pending elements between selectors, with adjacent text merged.
#[derive(Debug, Clone, Default)]
struct Segment {
    elements: Vec<PatternElement>,
}

impl Segment {
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(PatternElement::Text(last)) = self.elements.last_mut() {
            last.push_str(text);
        } else {
            self.elements.push(PatternElement::Text(text.to_string()));
        }
    }

    fn push(&mut self, element: PatternElement) {
        match element {
            PatternElement::Text(text) => self.push_text(&text),
            other => self.elements.push(other),
        }
    }

    fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Only whitespace text.
    fn is_blank(&self) -> bool {
        self.elements.iter().all(|el| match el {
            PatternElement::Text(text) => text.trim().is_empty(),
            _ => false,
        })
    }

    fn split_trailing_whitespace(&mut self) -> Segment {
        let Some(PatternElement::Text(last)) = self.elements.last_mut() else {
            return Segment::default();
        };
        let kept = last.trim_end().len();
        let trailing = last.split_off(kept);
        if last.is_empty() {
            self.elements.pop();
        }
        let mut segment = Segment::default();
        segment.push_text(&trailing);
        segment
    }
}
