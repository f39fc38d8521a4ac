//! Contract hydration and block decomposition.
//!
//! Templates are HTML with `{{token}}` placeholders. Hydration substitutes
//! the context bundle into the template; block parsing decomposes the
//! hydrated HTML into typed blocks for non-HTML rendering surfaces such as
//! typeset PDF.

pub mod blocks;
pub mod hydrate;
pub mod tokens;

pub use blocks::{parse_blocks, ContentBlock, TextRun};
pub use hydrate::{hydrate, HydrationContext, PAYMENT_SCHEDULE_TOKEN};
pub use tokens::{ContextTokenReplacer, TokenReplacer};

/// Phrases recognized as the terms-and-conditions anchor. Legacy templates
/// were authored both in Spanish and English.
const TERMS_PHRASES: [&str; 2] = ["terms and conditions", "términos y condiciones"];

pub(crate) fn contains_terms_phrase(text: &str) -> bool {
    let lowered = text.to_lowercase();
    TERMS_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}
