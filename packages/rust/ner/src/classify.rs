//! Grouping of decoded entities into the curated report buckets.

use legalwatch_shared::{ChangeAnalysis, EntitySpan};

/// Curated entity buckets.
///
/// The tagger's vocabulary is open; these are a filter over it, not a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Date,
    Org,
    Loc,
    /// Legal acts: the tagger labels them `LAW`, `NORMA` or `MISC`.
    Law,
}

impl EntityCategory {
    /// Map a raw tagger label to its bucket, if it has one.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "DATE" => Some(Self::Date),
            "ORG" => Some(Self::Org),
            "LOC" => Some(Self::Loc),
            "LAW" | "NORMA" | "MISC" => Some(Self::Law),
            _ => None,
        }
    }
}

/// Partition spans into buckets, deduplicating each bucket by exact text.
///
/// `raw_entities` keeps every span in input order, bucketed or not.
pub fn classify(spans: Vec<EntitySpan>) -> ChangeAnalysis {
    let mut analysis = ChangeAnalysis::default();

    for span in &spans {
        let bucket = match EntityCategory::from_label(&span.category) {
            Some(EntityCategory::Date) => &mut analysis.dates,
            Some(EntityCategory::Org) => &mut analysis.orgs,
            Some(EntityCategory::Loc) => &mut analysis.locs,
            Some(EntityCategory::Law) => &mut analysis.laws,
            None => continue,
        };
        bucket.insert(span.text.clone());
    }

    analysis.raw_entities = spans;
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::decode;
    use std::collections::BTreeSet;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn legal_act_labels_share_one_bucket() {
        let spans = vec![
            EntitySpan::new("LAW", "ФЗ-152"),
            EntitySpan::new("MISC", "ФЗ-152"),
            EntitySpan::new("NORMA", "ст.9"),
        ];
        let analysis = classify(spans.clone());
        assert_eq!(analysis.laws, set(&["ФЗ-152", "ст.9"]));
        assert_eq!(analysis.raw_entities, spans);
    }

    #[test]
    fn buckets_by_category() {
        let analysis = classify(vec![
            EntitySpan::new("DATE", "1 июля 2026"),
            EntitySpan::new("ORG", "Минфин"),
            EntitySpan::new("LOC", "Москва"),
            EntitySpan::new("ORG", "Минфин"),
            EntitySpan::new("ORG", "минфин"),
        ]);
        assert_eq!(analysis.dates, set(&["1 июля 2026"]));
        assert_eq!(analysis.orgs, set(&["Минфин", "минфин"]));
        assert_eq!(analysis.locs, set(&["Москва"]));
        assert!(analysis.laws.is_empty());
        assert_eq!(analysis.raw_entities.len(), 5);
    }

    #[test]
    fn unknown_categories_only_in_raw_entities() {
        let analysis = classify(vec![
            EntitySpan::new("PER", "Иванов"),
            EntitySpan::new("DATE", "вчера"),
        ]);
        assert!(analysis.orgs.is_empty());
        assert_eq!(analysis.dates, set(&["вчера"]));
        assert_eq!(analysis.raw_entities[0], EntitySpan::new("PER", "Иванов"));
    }

    #[test]
    fn empty_input_gives_empty_analysis() {
        let analysis = classify(Vec::new());
        assert!(analysis.dates.is_empty());
        assert!(analysis.orgs.is_empty());
        assert!(analysis.locs.is_empty());
        assert!(analysis.laws.is_empty());
        assert!(analysis.raw_entities.is_empty());
        assert!(analysis.is_empty());
    }

    #[test]
    fn decode_then_classify_is_stable() {
        let tokens = ["Минфин", "и", "ФНС", "с", "1", "мая", "ФЗ-152"];
        let tags = ["B-ORG", "O", "B-ORG", "O", "B-DATE", "I-DATE", "B-LAW"];
        let first = classify(decode(&tokens, &tags));
        let second = classify(decode(&tokens, &tags));
        assert_eq!(first, second);
        assert_eq!(first.orgs, set(&["Минфин", "ФНС"]));
        assert_eq!(first.dates, set(&["1 мая"]));
        assert_eq!(first.laws, set(&["ФЗ-152"]));
    }

    #[test]
    fn label_mapping() {
        assert_eq!(EntityCategory::from_label("NORMA"), Some(EntityCategory::Law));
        assert_eq!(EntityCategory::from_label("LOC"), Some(EntityCategory::Loc));
        assert_eq!(EntityCategory::from_label("PER"), None);
        assert_eq!(EntityCategory::from_label("date"), None);
    }
}
