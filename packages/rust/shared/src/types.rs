//! Core domain types for LegalWatch.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Source items
// ---------------------------------------------------------------------------

/// One legal-news item as supplied by the feed and kept in the store.
///
/// `url` is the item's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    /// Headline.
    pub title: String,
    /// Canonical link; unique across the store.
    pub url: String,
    /// Publication date exactly as the feed wrote it.
    pub date: String,
    /// Plain-text description (may be empty).
    pub description: String,
    /// `date` parsed to UTC, when the feed date was well-formed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl SourceItem {
    /// Text handed to the NER engine: `"{title}. {description}"`.
    pub fn ner_text(&self) -> String {
        format!("{}. {}", self.title, self.description)
    }
}

/// A stored item as listed by the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawChange {
    /// Row identifier assigned by the store.
    pub id: i64,
    pub title: String,
    pub url: String,
    pub date: String,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Entities & analysis
// ---------------------------------------------------------------------------

/// A contiguous run of tokens tagged as one named entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Raw category label from the tagger (e.g. `DATE`, `ORG`, `NORMA`).
    #[serde(rename = "type")]
    pub category: String,
    /// Tokens of the span joined by single spaces.
    pub text: String,
}

impl EntitySpan {
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
        }
    }
}

/// Entities of one item grouped into the curated buckets.
///
/// Buckets are deduplicated by exact text; `raw_entities` keeps every span
/// in first-token order, including categories outside the buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeAnalysis {
    pub dates: BTreeSet<String>,
    pub orgs: BTreeSet<String>,
    pub locs: BTreeSet<String>,
    pub laws: BTreeSet<String>,
    pub raw_entities: Vec<EntitySpan>,
}

impl ChangeAnalysis {
    /// True when no entity of any category was found.
    pub fn is_empty(&self) -> bool {
        self.raw_entities.is_empty()
    }
}

/// A source item paired with its analysis; the unit the report is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedItem {
    pub item: SourceItem,
    pub analysis: ChangeAnalysis,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// The synthesized natural-language report of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Report body as returned by the completion provider.
    pub text: String,
    /// Name of the provider that produced it.
    pub provider: String,
    /// When synthesis finished.
    pub generated_at: DateTime<Utc>,
}
