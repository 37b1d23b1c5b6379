//! Owned tree model for Fluent entries.
//!
//! The parser adapter converts `fluent_syntax` trees into these types so the
//! transformation passes can rewrite patterns in place without borrowing from
//! the source text.

use serde::{Deserialize, Serialize};

/// Whether an entry is a public message or a private `-term`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Message,
    Term,
}

/// A Message or Term with its value and attributes.
///
/// The value and every attribute are independent units: selectors in one
/// never interact with the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub kind: EntryKind,
    pub id: String,
    pub value: Option<Pattern>,
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Entry {
    pub fn message(id: &str, value: Pattern) -> Self {
        Entry {
            kind: EntryKind::Message,
            id: id.to_string(),
            value: Some(value),
            attributes: Vec::new(),
            comment: None,
        }
    }

    /// The pattern shown when a single string is needed: the value, or
    /// failing that the first attribute.
    pub fn primary_pattern(&self) -> Option<&Pattern> {
        self.value
            .as_ref()
            .or_else(|| self.attributes.first().map(|attr| &attr.value))
    }

    pub fn patterns_mut(&mut self) -> impl Iterator<Item = &mut Pattern> {
        self.value
            .iter_mut()
            .chain(self.attributes.iter_mut().map(|attr| &mut attr.value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,
    pub value: Pattern,
}

/// Ordered sequence of text and placeables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub elements: Vec<PatternElement>,
}

impl Pattern {
    pub fn new(elements: Vec<PatternElement>) -> Self {
        Pattern { elements }
    }

    pub fn text(value: &str) -> Self {
        Pattern {
            elements: vec![PatternElement::Text(value.to_string())],
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True when any top-level element is a select expression.
    pub fn has_select(&self) -> bool {
        self.elements.iter().any(|el| el.as_select().is_some())
    }
}

impl From<Vec<PatternElement>> for Pattern {
    fn from(elements: Vec<PatternElement>) -> Self {
        Pattern { elements }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PatternElement {
    Text(String),
    Placeable(Expression),
    /// Inert stand-in for a placeable while a pattern is out for translation.
    Marker(Marker),
}

impl PatternElement {
    pub fn placeable(expression: InlineExpression) -> Self {
        PatternElement::Placeable(Expression::Inline(expression))
    }

    pub fn select(select: SelectExpression) -> Self {
        PatternElement::Placeable(Expression::Select(select))
    }

    /// The select expression carried by this element, looking through
    /// redundant nesting such as `{ { $n -> ... } }`.
    pub fn as_select(&self) -> Option<&SelectExpression> {
        match self {
            PatternElement::Placeable(expression) => expression.as_select(),
            _ => None,
        }
    }

    pub fn as_select_mut(&mut self) -> Option<&mut SelectExpression> {
        match self {
            PatternElement::Placeable(expression) => expression.as_select_mut(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    Select(SelectExpression),
    Inline(InlineExpression),
}

impl Expression {
    pub fn as_select(&self) -> Option<&SelectExpression> {
        match self {
            Expression::Select(select) => Some(select),
            Expression::Inline(InlineExpression::Placeable { expression }) => expression.as_select(),
            Expression::Inline(_) => None,
        }
    }

    pub fn as_select_mut(&mut self) -> Option<&mut SelectExpression> {
        match self {
            Expression::Select(select) => Some(select),
            Expression::Inline(InlineExpression::Placeable { expression }) => {
                expression.as_select_mut()
            }
            Expression::Inline(_) => None,
        }
    }

    /// True for `{ "" }`, including when wrapped in further placeables.
    pub fn is_empty_string_literal(&self) -> bool {
        match self {
            Expression::Inline(InlineExpression::StringLiteral { value }) => value.is_empty(),
            Expression::Inline(InlineExpression::Placeable { expression }) => {
                expression.is_empty_string_literal()
            }
            _ => false,
        }
    }

    /// Unwraps nested placeables down to a select expression, if that is
    /// what this expression ultimately holds.
    pub fn into_select(self) -> Result<SelectExpression, Expression> {
        match self {
            Expression::Select(select) => Ok(select),
            Expression::Inline(InlineExpression::Placeable { expression }) => {
                if expression.as_select().is_some() {
                    (*expression).into_select()
                } else {
                    Err(Expression::Inline(InlineExpression::Placeable { expression }))
                }
            }
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectExpression {
    pub selector: InlineExpression,
    pub variants: Vec<Variant>,
}

impl SelectExpression {
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.default)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub key: VariantKey,
    pub value: Pattern,
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum VariantKey {
    Identifier(String),
    NumberLiteral(String),
}

impl VariantKey {
    pub fn as_str(&self) -> &str {
        match self {
            VariantKey::Identifier(name) => name,
            VariantKey::NumberLiteral(value) => value,
        }
    }
}

/// Expressions the engine never evaluates, only serializes back to source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum InlineExpression {
    StringLiteral {
        value: String,
    },
    NumberLiteral {
        value: String,
    },
    FunctionReference {
        id: String,
        arguments: CallArguments,
    },
    MessageReference {
        id: String,
        attribute: Option<String>,
    },
    TermReference {
        id: String,
        attribute: Option<String>,
        arguments: Option<CallArguments>,
    },
    VariableReference {
        id: String,
    },
    Placeable {
        expression: Box<Expression>,
    },
}

impl InlineExpression {
    pub fn variable(id: &str) -> Self {
        InlineExpression::VariableReference { id: id.to_string() }
    }

    pub fn message(id: &str) -> Self {
        InlineExpression::MessageReference {
            id: id.to_string(),
            attribute: None,
        }
    }

    pub fn string(value: &str) -> Self {
        InlineExpression::StringLiteral {
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallArguments {
    pub positional: Vec<InlineExpression>,
    pub named: Vec<NamedArgument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedArgument {
    pub name: String,
    pub value: InlineExpression,
}

/// Opening tag prefix of a rendered marker; the index follows it.
pub const MARKER_OPEN: &str = "<span data-l10n-placeholder=\"";
pub const MARKER_CLOSE: &str = "</span>";

/// Indexed, translator-opaque stand-in for a placeable.
///
/// The preview is cosmetic: restoring the original relies on `index` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub index: usize,
    pub preview: String,
}

impl Marker {
    pub fn new(index: usize, preview: &str) -> Self {
        Marker {
            index,
            preview: preview.to_string(),
        }
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}\" translate=\"no\">{}{}",
            MARKER_OPEN, self.index, self.preview, MARKER_CLOSE
        )
    }
}
