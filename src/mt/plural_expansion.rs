//! Plural variant expansion.
//!
//! A source string written for English has `[one]` and `[other]` variants;
//! a Russian or Arabic translation needs more. Expansion rewrites a plural
//! select expression so that it carries exactly the target locale's CLDR
//! categories, cloning the default variant's text for the categories the
//! source does not have:
//!
//! ```text
//! { $n ->                    { $n ->
//!     [one] One file            [one] One file
//!    *[other] { $n } files      [few] { $n } files
//! }                             [many] { $n } files
//!                              *[other] { $n } files
//!                            }
//! ```
//!
//! Numeric variants such as `[0]` are kept, in front of the category
//! variants. The last variant is always the default afterwards.

use std::collections::HashMap;
use std::mem;

use tracing::debug;

use crate::ast::{InlineExpression, Pattern, SelectExpression, Variant, VariantKey};
use crate::locale::{PluralCategory, PluralLocale};

/// True when every variant key is a number or a CLDR category name.
pub fn is_plural_select(select: &SelectExpression) -> bool {
    !select.variants.is_empty()
        && select.variants.iter().all(|variant| match &variant.key {
            VariantKey::NumberLiteral(_) => true,
            VariantKey::Identifier(name) => name.parse::<PluralCategory>().is_ok(),
        })
}

/// The variable a plural select switches on: `$n` or `NUMBER($n, ...)`.
pub fn plural_variable(select: &SelectExpression) -> Option<&str> {
    if !is_plural_select(select) {
        return None;
    }
    match &select.selector {
        InlineExpression::VariableReference { id } => Some(id.as_str()),
        InlineExpression::FunctionReference { id, arguments } if id == "NUMBER" => {
            match arguments.positional.first() {
                Some(InlineExpression::VariableReference { id }) => Some(id.as_str()),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Rewrite a plural select for the categories of `locale`.
///
/// Returns `false`, leaving the select untouched, if it is not plural.
pub fn expand_plural_variants(select: &mut SelectExpression, locale: &dyn PluralLocale) -> bool {
    if !is_plural_select(select) {
        return false;
    }

    let mut categories = locale.plural_categories();
    if categories.is_empty() {
        categories.push(PluralCategory::Other);
    }

    let template: Pattern = select
        .default_variant()
        .or(select.variants.last())
        .map(|variant| variant.value.clone())
        .unwrap_or_default();

    let mut numeric: Vec<Variant> = Vec::new();
    let mut named: HashMap<PluralCategory, Variant> = HashMap::new();
    for variant in mem::take(&mut select.variants) {
        match &variant.key {
            VariantKey::NumberLiteral(_) => numeric.push(variant),
            VariantKey::Identifier(name) => {
                if let Ok(category) = name.parse::<PluralCategory>() {
                    named.entry(category).or_insert(variant);
                }
            }
        }
    }

    // An explicit [0] already covers the zero category.
    let has_zero_literal = numeric.iter().any(|variant| {
        matches!(&variant.key, VariantKey::NumberLiteral(value) if value.parse::<f64>() == Ok(0.0))
    });

    let mut variants = numeric;
    for category in categories {
        if let Some(variant) = named.remove(&category) {
            variants.push(variant);
        } else if category == PluralCategory::Zero && has_zero_literal {
            continue;
        } else {
            variants.push(Variant {
                key: VariantKey::Identifier(category.as_str().to_string()),
                value: template.clone(),
                default: false,
            });
        }
    }

    let last = variants.len().saturating_sub(1);
    for (index, variant) in variants.iter_mut().enumerate() {
        variant.default = index == last;
    }

    if !named.is_empty() {
        debug!(
            "Dropped plural variants not used by '{}': {:?}",
            locale.code(),
            named.keys().map(|c| c.as_str()).collect::<Vec<_>>()
        );
    }

    select.variants = variants;
    true
}

/// Expand every plural select in `pattern`, including nested ones.
///
/// Returns the number of selects rewritten.
pub fn expand_plurals_in_pattern(pattern: &mut Pattern, locale: &dyn PluralLocale) -> usize {
    let mut expanded = 0;
    for element in &mut pattern.elements {
        if let Some(select) = element.as_select_mut() {
            if expand_plural_variants(select, locale) {
                expanded += 1;
            }
            for variant in &mut select.variants {
                expanded += expand_plurals_in_pattern(&mut variant.value, locale);
            }
        }
    }
    expanded
}
