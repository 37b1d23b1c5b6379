//! Canonical FTL serialization for the owned tree model.
//!
//! Output follows the layout of the reference Fluent serializers: four-space
//! indentation, select expressions starting on their own line, and default
//! variants marked with `*`.

use crate::ast::{
    CallArguments, Entry, EntryKind, Expression, InlineExpression, Pattern, PatternElement,
    SelectExpression, Variant, VariantKey,
};

const INDENT: &str = "    ";

/// Serialize a complete entry, including its trailing newline.
pub fn serialize_entry(entry: &Entry) -> String {
    let mut out = String::new();

    if let Some(comment) = &entry.comment {
        for line in comment.lines() {
            if line.is_empty() {
                out.push_str("#\n");
            } else {
                out.push_str("# ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    if entry.kind == EntryKind::Term {
        out.push('-');
    }
    out.push_str(&entry.id);
    out.push_str(" =");

    if let Some(value) = &entry.value {
        out.push_str(&format_pattern_value(value));
    }

    for attribute in &entry.attributes {
        out.push('\n');
        out.push_str(INDENT);
        out.push('.');
        out.push_str(&attribute.id);
        out.push_str(" =");
        out.push_str(&indent_except_first_line(&format_pattern_value(
            &attribute.value,
        )));
    }

    out.push('\n');
    out
}

/// Concatenate the serialized elements of a pattern, without the leading
/// separator or block indentation an entry value would get.
pub fn serialize_pattern(pattern: &Pattern) -> String {
    pattern.elements.iter().map(serialize_element).collect()
}

pub fn serialize_element(element: &PatternElement) -> String {
    match element {
        PatternElement::Text(text) => text.clone(),
        PatternElement::Placeable(expression) => serialize_placeable(expression),
        PatternElement::Marker(marker) => marker.to_string(),
    }
}

/// Serialize an expression wrapped in its placeable delimiters, e.g. `{ $user }`.
pub fn serialize_placeable(expression: &Expression) -> String {
    match expression {
        Expression::Inline(InlineExpression::Placeable { expression }) => {
            format!("{{{}}}", serialize_placeable(expression))
        }
        Expression::Select(select) => format!("{{ {}}}", serialize_select(select)),
        Expression::Inline(inline) => format!("{{ {} }}", serialize_inline(inline)),
    }
}

/// Serialize an expression without the surrounding braces.
pub fn serialize_expression(expression: &Expression) -> String {
    match expression {
        Expression::Select(select) => serialize_select(select),
        Expression::Inline(inline) => serialize_inline(inline),
    }
}

pub fn serialize_inline(expression: &InlineExpression) -> String {
    match expression {
        InlineExpression::StringLiteral { value } => format!("\"{}\"", value),
        InlineExpression::NumberLiteral { value } => value.clone(),
        InlineExpression::VariableReference { id } => format!("${}", id),
        InlineExpression::MessageReference { id, attribute } => {
            let mut out = id.clone();
            if let Some(attribute) = attribute {
                out.push('.');
                out.push_str(attribute);
            }
            out
        }
        InlineExpression::TermReference {
            id,
            attribute,
            arguments,
        } => {
            let mut out = format!("-{}", id);
            if let Some(attribute) = attribute {
                out.push('.');
                out.push_str(attribute);
            }
            if let Some(arguments) = arguments {
                out.push_str(&serialize_call_arguments(arguments));
            }
            out
        }
        InlineExpression::FunctionReference { id, arguments } => {
            format!("{}{}", id, serialize_call_arguments(arguments))
        }
        InlineExpression::Placeable { expression } => serialize_placeable(expression),
    }
}

fn serialize_call_arguments(arguments: &CallArguments) -> String {
    let positional = arguments.positional.iter().map(serialize_inline);
    let named = arguments
        .named
        .iter()
        .map(|arg| format!("{}: {}", arg.name, serialize_inline(&arg.value)));
    let parts: Vec<String> = positional.chain(named).collect();
    format!("({})", parts.join(", "))
}

fn serialize_select(select: &SelectExpression) -> String {
    let mut out = format!("{} ->", serialize_inline(&select.selector));
    for variant in &select.variants {
        out.push_str(&serialize_variant(variant));
    }
    out.push('\n');
    out
}

fn serialize_variant(variant: &Variant) -> String {
    let prefix = if variant.default { "   *" } else { "    " };
    format!(
        "\n{}[{}]{}",
        prefix,
        serialize_variant_key(&variant.key),
        indent_except_first_line(&format_pattern_value(&variant.value))
    )
}

pub fn serialize_variant_key(key: &VariantKey) -> String {
    key.as_str().to_string()
}

/// A pattern as it appears after `=` or `]`: either inline after a single
/// space or as an indented block on the next line.
fn format_pattern_value(pattern: &Pattern) -> String {
    let content = indent_except_first_line(&serialize_pattern(pattern));
    if starts_on_new_line(pattern) {
        format!("\n{}{}", INDENT, content)
    } else {
        format!(" {}", content)
    }
}

fn starts_on_new_line(pattern: &Pattern) -> bool {
    let multiline = pattern.elements.iter().any(|element| match element {
        PatternElement::Text(text) => text.contains('\n'),
        other => other.as_select().is_some(),
    });
    if !multiline {
        return false;
    }
    // Text starting with a special character must stay on the `=` line,
    // otherwise it would parse as a variant key or attribute.
    !matches!(
        pattern.elements.first(),
        Some(PatternElement::Text(text)) if text.starts_with(['[', '.', '*'])
    )
}

fn indent_except_first_line(content: &str) -> String {
    content.replace('\n', &format!("\n{}", INDENT))
}
