//! Pattern transformations for Fluent messages.
//!
//! - [`flatten`] moves the text around selectors into every variant, so each
//!   variant is a complete sentence.
//! - [`preview`] renders an entry as the single string a reviewer sees.
//! - [`mt`] expands plural selectors for a target locale, shields placeables
//!   from machine translation and runs whole entries through a backend.
//!
//! Entries are parsed with `fluent-syntax` into the owned tree in [`ast`]
//! and written back with [`serializer`].

pub mod ast;
pub mod config;
pub mod flatten;
pub mod locale;
pub mod mt;
pub mod parser;
pub mod preview;
pub mod serializer;

pub use ast::{
    Attribute, Entry, EntryKind, Expression, InlineExpression, Marker, Pattern, PatternElement,
    SelectExpression, Variant, VariantKey,
};
pub use config::{FailurePolicy, PretranslationConfig};
pub use flatten::{flatten_entry, flatten_pattern, flatten_source, flatten_structure};
pub use locale::{IcuPluralLocale, LocaleError, PluralCategory, PluralLocale, StaticPluralLocale};
pub use parser::{Junk, Parser, parse_entry};
pub use preview::{preview, preview_entry, preview_pattern};
pub use serializer::{serialize_entry, serialize_pattern};
