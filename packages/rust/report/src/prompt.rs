//! Prompt construction for the report synthesizer.

use std::collections::BTreeSet;
use std::fmt::Write;

use legalwatch_shared::AnalyzedItem;

/// Instruction prefixed to every report prompt.
pub const REPORT_HEADER: &str = "Сформируй аналитический отчёт о законодательных изменениях.
Структура:
 - краткое содержание изменений
 - ключевые даты
 - упомянутые нормативные акты
 - значимость изменений

Данные:
";

/// Stands in for an empty bucket.
pub const EMPTY_PLACEHOLDER: &str = "-";

/// Render all analyzed items into one prompt, in input order.
pub fn build_prompt(items: &[AnalyzedItem]) -> String {
    let entries: Vec<String> = items.iter().map(format_entry).collect();
    format!("{REPORT_HEADER}{}", entries.join("\n"))
}

fn format_entry(entry: &AnalyzedItem) -> String {
    let mut out = String::new();
    let analysis = &entry.analysis;
    // Writing to a String cannot fail.
    let _ = write!(
        out,
        "\nНазвание: {}\nURL: {}\nВыделенные даты: {}\nНормативные акты: {}\nОрганизации: {}\n",
        entry.item.title,
        entry.item.url,
        join_or_placeholder(&analysis.dates),
        join_or_placeholder(&analysis.laws),
        join_or_placeholder(&analysis.orgs),
    );
    out
}

/// Join a bucket with `", "`; sorted because the bucket is a `BTreeSet`.
fn join_or_placeholder(values: &BTreeSet<String>) -> String {
    if values.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }
    values.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use legalwatch_shared::{ChangeAnalysis, SourceItem};

    fn analyzed(title: &str, laws: &[&str], dates: &[&str]) -> AnalyzedItem {
        AnalyzedItem {
            item: SourceItem {
                title: title.into(),
                url: format!("https://example.ru/{title}"),
                date: "Tue, 12 May 2026 10:00:00 +0300".into(),
                description: String::new(),
                published_at: None,
            },
            analysis: ChangeAnalysis {
                laws: laws.iter().map(|s| s.to_string()).collect(),
                dates: dates.iter().map(|s| s.to_string()).collect(),
                ..ChangeAnalysis::default()
            },
        }
    }

    #[test]
    fn empty_buckets_use_placeholder() {
        let prompt = build_prompt(&[analyzed("a", &[], &[])]);
        assert!(prompt.starts_with(REPORT_HEADER));
        assert!(prompt.contains("Выделенные даты: -\n"));
        assert!(prompt.contains("Нормативные акты: -\n"));
        assert!(prompt.contains("Организации: -\n"));
    }

    #[test]
    fn buckets_are_joined_sorted() {
        let prompt = build_prompt(&[analyzed("a", &["ст.9", "ФЗ-152"], &["12 мая"])]);
        // Byte order puts uppercase Cyrillic before lowercase.
        assert!(prompt.contains("Нормативные акты: ФЗ-152, ст.9\n"));
        assert!(prompt.contains("Выделенные даты: 12 мая\n"));
    }

    #[test]
    fn entries_keep_input_order() {
        let prompt = build_prompt(&[analyzed("first", &[], &[]), analyzed("second", &[], &[])]);
        let first = prompt.find("Название: first").unwrap();
        let second = prompt.find("Название: second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn prompt_is_deterministic() {
        let items = [analyzed("a", &["b", "a", "c"], &["x"])];
        assert_eq!(build_prompt(&items), build_prompt(&items));
    }
}
