use fluent_syntax::ast as fluent;
use serde::{Deserialize, Serialize};

use crate::ast::{
    Attribute, CallArguments, Entry, EntryKind, Expression, InlineExpression, NamedArgument,
    Pattern, PatternElement, SelectExpression, Variant, VariantKey,
};

/// Annotation attached to unparseable content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub code: String,
    pub message: String,
    pub offset: usize,
}

/// Source text that could not be turned into a Message or Term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Junk {
    pub content: String,
    pub annotations: Vec<Annotation>,
}

impl std::fmt::Display for Junk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.annotations.first() {
            Some(annotation) => write!(
                f,
                "{} at offset {}: {}",
                annotation.code, annotation.offset, annotation.message
            ),
            None => write!(f, "unparseable content"),
        }
    }
}

impl std::error::Error for Junk {}

/// A parser for single Fluent entries.
///
/// Wraps the `fluent_syntax` parser and converts its borrowed tree into the
/// owned model from [`crate::ast`]. The parser is stateless, so a handle can be
/// created per call.
pub struct Parser<'a> {
    input: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser { input }
    }

    /// Parse the first Message or Term in the input.
    ///
    /// Any syntax error, or input without a Message or Term, produces
    /// [`Junk`] holding the original text.
    pub fn parse_entry(&self) -> Result<Entry, Junk> {
        let resource = match fluent_syntax::parser::parse(self.input) {
            Ok(resource) => resource,
            Err((_, errors)) => {
                return Err(Junk {
                    content: self.input.to_string(),
                    annotations: errors
                        .iter()
                        .map(|error| {
                            let kind = format!("{:?}", error.kind);
                            Annotation {
                                code: error_code(&kind),
                                message: kind,
                                offset: error.pos.start,
                            }
                        })
                        .collect(),
                });
            }
        };

        for entry in resource.body {
            match entry {
                fluent::Entry::Message(message) => {
                    return Ok(Entry {
                        kind: EntryKind::Message,
                        id: message.id.name.to_string(),
                        value: message.value.as_ref().map(convert_pattern),
                        attributes: convert_attributes(&message.attributes),
                        comment: message.comment.as_ref().map(convert_comment),
                    });
                }
                fluent::Entry::Term(term) => {
                    return Ok(Entry {
                        kind: EntryKind::Term,
                        id: term.id.name.to_string(),
                        value: Some(convert_pattern(&term.value)),
                        attributes: convert_attributes(&term.attributes),
                        comment: term.comment.as_ref().map(convert_comment),
                    });
                }
                _ => continue,
            }
        }

        Err(Junk {
            content: self.input.to_string(),
            annotations: vec![Annotation {
                code: "ExpectedEntry".to_string(),
                message: "Expected a message or term".to_string(),
                offset: 0,
            }],
        })
    }
}

/// Shorthand for `Parser::new(input).parse_entry()`.
pub fn parse_entry(input: &str) -> Result<Entry, Junk> {
    Parser::new(input).parse_entry()
}

// "ExpectedToken('=')" -> "ExpectedToken"
fn error_code(kind: &str) -> String {
    kind.split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or(kind)
        .to_string()
}

fn convert_comment(comment: &fluent::Comment<&str>) -> String {
    comment.content.join("\n")
}

fn convert_attributes(attributes: &[fluent::Attribute<&str>]) -> Vec<Attribute> {
    attributes
        .iter()
        .map(|attribute| Attribute {
            id: attribute.id.name.to_string(),
            value: convert_pattern(&attribute.value),
        })
        .collect()
}

fn convert_pattern(pattern: &fluent::Pattern<&str>) -> Pattern {
    let mut elements: Vec<PatternElement> = Vec::new();
    for element in &pattern.elements {
        match element {
            fluent::PatternElement::TextElement { value } => {
                // The parser splits multiline text per line; keep one Text run.
                if let Some(PatternElement::Text(previous)) = elements.last_mut() {
                    previous.push_str(value);
                } else {
                    elements.push(PatternElement::Text(value.to_string()));
                }
            }
            fluent::PatternElement::Placeable { expression } => {
                elements.push(PatternElement::Placeable(convert_expression(expression)));
            }
        }
    }
    Pattern { elements }
}

fn convert_expression(expression: &fluent::Expression<&str>) -> Expression {
    match expression {
        fluent::Expression::Select { selector, variants } => {
            Expression::Select(SelectExpression {
                selector: convert_inline(selector),
                variants: variants.iter().map(convert_variant).collect(),
            })
        }
        fluent::Expression::Inline(inline) => Expression::Inline(convert_inline(inline)),
    }
}

fn convert_variant(variant: &fluent::Variant<&str>) -> Variant {
    let key = match &variant.key {
        fluent::VariantKey::Identifier { name } => VariantKey::Identifier(name.to_string()),
        fluent::VariantKey::NumberLiteral { value } => VariantKey::NumberLiteral(value.to_string()),
    };
    Variant {
        key,
        value: convert_pattern(&variant.value),
        default: variant.default,
    }
}

fn convert_inline(expression: &fluent::InlineExpression<&str>) -> InlineExpression {
    match expression {
        fluent::InlineExpression::StringLiteral { value } => InlineExpression::StringLiteral {
            value: value.to_string(),
        },
        fluent::InlineExpression::NumberLiteral { value } => InlineExpression::NumberLiteral {
            value: value.to_string(),
        },
        fluent::InlineExpression::FunctionReference { id, arguments } => {
            InlineExpression::FunctionReference {
                id: id.name.to_string(),
                arguments: convert_arguments(arguments),
            }
        }
        fluent::InlineExpression::MessageReference { id, attribute } => {
            InlineExpression::MessageReference {
                id: id.name.to_string(),
                attribute: attribute.as_ref().map(|attr| attr.name.to_string()),
            }
        }
        fluent::InlineExpression::TermReference {
            id,
            attribute,
            arguments,
        } => InlineExpression::TermReference {
            id: id.name.to_string(),
            attribute: attribute.as_ref().map(|attr| attr.name.to_string()),
            arguments: arguments.as_ref().map(convert_arguments),
        },
        fluent::InlineExpression::VariableReference { id } => InlineExpression::VariableReference {
            id: id.name.to_string(),
        },
        fluent::InlineExpression::Placeable { expression } => InlineExpression::Placeable {
            expression: Box::new(convert_expression(expression)),
        },
    }
}

fn convert_arguments(arguments: &fluent::CallArguments<&str>) -> CallArguments {
    CallArguments {
        positional: arguments.positional.iter().map(convert_inline).collect(),
        named: arguments
            .named
            .iter()
            .map(|arg| NamedArgument {
                name: arg.name.name.to_string(),
                value: convert_inline(&arg.value),
            })
            .collect(),
    }
}
