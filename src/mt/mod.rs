/// Machine Translation Module
///
/// This module turns Fluent patterns into machine-translatable text and back.
/// Translation backends only see plain sentences: selectors are flattened
/// so each variant is a full sentence, plural selectors are expanded to the
/// target locale's categories, and placeables travel as inert markers that
/// are restored by index afterwards.
///
/// # Overview
///
/// 1. **Plural Expansion** - Rewrites plural selects for the target locale's CLDR categories
/// 2. **Placeholder Wrapping** - Swaps placeables for markers and restores them after translation
/// 3. **MT Trait & Backends** - Generic trait for MT systems, a mock and an ordered fallback chain
/// 4. **Pretranslator** - Orchestrates the full pipeline for one entry
///
/// # Example
///
/// ```ignore
/// use fluent_pretranslate::locale::IcuPluralLocale;
/// use fluent_pretranslate::mt::{MockMode, MockTranslator, Pretranslator};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let locale = IcuPluralLocale::new("ru")?;
///     let pretranslator = Pretranslator::new(MockTranslator::new(MockMode::Suffix));
///
///     let source = "emails = { $count ->\n    [one] One email\n   *[other] { $count } emails\n}\n";
///     let report = pretranslator.pretranslate_entry(source, &locale).await?;
///
///     println!("{}", report.to_ftl());
///     Ok(())
/// }
/// ```
pub mod chain;
pub mod error;
pub mod mock;
pub mod placeholder;
pub mod plural_expansion;
pub mod pretranslate;
pub mod translator;

pub use chain::ChainTranslator;
pub use error::{MtError, MtResult, PretranslationError};
pub use mock::{MockMode, MockTranslator};
pub use placeholder::{
    PlaceholderRecords, marker_spans, sanitize_preview, strip_placeholders, unwrap_placeholders,
    wrap_pattern,
};
pub use plural_expansion::{
    expand_plural_variants, expand_plurals_in_pattern, is_plural_select, plural_variable,
};
pub use pretranslate::{
    AppliedPattern, EntryReport, PreparedPattern, Pretranslator, TranslationUnit, UnitReport,
    apply_pattern, prepare_pattern, translation_units,
};
pub use translator::{MachineTranslator, Translation, TranslationRequest, validate_locale};
