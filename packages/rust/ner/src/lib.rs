//! Named-entity extraction for legal-news items.
//!
//! This crate provides:
//! - [`bio`]: single-pass BIO tag decoder turning `(token, tag)` pairs into entity spans
//! - [`classify`]: groups spans into date / organization / location / legal-act buckets
//! - [`engine`]: the [`NerEngine`] boundary and its DeepPavlov HTTP implementation

pub mod bio;
pub mod classify;
pub mod engine;

pub use bio::{BioDecoder, decode};
pub use classify::{EntityCategory, classify};
pub use engine::{DeepPavlovEngine, NerEngine, TaggedText};

use legalwatch_shared::{ChangeAnalysis, Result, SourceItem};

/// Tag an item's text with `engine`, decode the spans, and bucket them.
pub async fn analyze_item(engine: &dyn NerEngine, item: &SourceItem) -> Result<ChangeAnalysis> {
    let tagged = engine.tag(&item.ner_text()).await?;
    let spans = decode(&tagged.tokens, &tagged.tags);
    Ok(classify(spans))
}
