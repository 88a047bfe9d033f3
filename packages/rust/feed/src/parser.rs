//! RSS 2.0 parser.
//!
//! Walks the document with a streaming `quick-xml` reader and collects
//! `rss/channel/item` elements:
//! - `title`, `link` and `pubDate` are required; items without them are skipped
//! - `description` is optional and normalized to plain text
//! - both escaped text and CDATA sections are accepted

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use legalwatch_shared::{LegalWatchError, Result, SourceItem};
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::{Captures, Regex};
use tracing::warn;

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Any HTML tag.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex"));

/// Decimal or hex numeric character reference.
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#([xX]?)([0-9a-fA-F]+);").expect("numeric entity regex"));

/// Runs of whitespace, including non-breaking spaces.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\u{a0}]+").expect("whitespace regex"));

/// Named entities common in feed descriptions. `&amp;` goes last so that
/// `&amp;lt;` decodes to `&lt;`, not `<`.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&laquo;", "«"),
    ("&raquo;", "»"),
    ("&mdash;", "—"),
    ("&ndash;", "–"),
    ("&hellip;", "…"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
];

// ---------------------------------------------------------------------------
// Item accumulation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    PubDate,
    Description,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"pubDate" => Some(Self::PubDate),
            b"description" => Some(Self::Description),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct ItemBuilder {
    title: Option<String>,
    link: Option<String>,
    pub_date: Option<String>,
    description: Option<String>,
}

impl ItemBuilder {
    fn append(&mut self, field: Field, text: &str) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::PubDate => &mut self.pub_date,
            Field::Description => &mut self.description,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    fn build(self, index: usize) -> Option<SourceItem> {
        let title = non_blank(self.title);
        let url = non_blank(self.link);
        let date = non_blank(self.pub_date);

        let (Some(title), Some(url), Some(date)) = (title, url, date) else {
            warn!(index, "skipping feed item without title, link or pubDate");
            return None;
        };

        let published_at = DateTime::parse_from_rfc2822(&date)
            .ok()
            .map(|d| d.with_timezone(&Utc));

        Some(SourceItem {
            title,
            url,
            date,
            description: self
                .description
                .as_deref()
                .map(normalize_description)
                .unwrap_or_default(),
            published_at,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse an RSS 2.0 document into source items, in document order.
pub fn parse_rss(xml: &str) -> Result<Vec<SourceItem>> {
    let mut reader = Reader::from_str(xml);

    // Open element names from the root down.
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<ItemBuilder> = None;
    let mut field: Option<Field> = None;
    let mut items = Vec::new();
    let mut seen = 0usize;
    let mut saw_root = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            LegalWatchError::parse(format!(
                "malformed feed XML at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                if stack.is_empty() {
                    if name != b"rss" {
                        return Err(LegalWatchError::parse(format!(
                            "not an RSS document: root element is <{}>",
                            String::from_utf8_lossy(&name)
                        )));
                    }
                    saw_root = true;
                }
                if is_item_path(&stack, &name) {
                    current = Some(ItemBuilder::default());
                } else if current.is_some() && stack.len() == 3 {
                    field = Field::from_name(&name);
                }
                stack.push(name);
            }
            Event::End(_) => {
                stack.pop();
                if stack.len() == 3 {
                    field = None;
                } else if stack.len() == 2 {
                    if let Some(builder) = current.take() {
                        seen += 1;
                        items.extend(builder.build(seen - 1));
                    }
                }
            }
            Event::Text(t) => {
                if let (Some(builder), Some(f)) = (current.as_mut(), field) {
                    let text = t
                        .unescape()
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned().into());
                    builder.append(f, &text);
                }
            }
            Event::CData(c) => {
                if let (Some(builder), Some(f)) = (current.as_mut(), field) {
                    builder.append(f, &String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(LegalWatchError::parse("feed document has no <rss> element"));
    }
    if !stack.is_empty() {
        return Err(LegalWatchError::parse(format!(
            "feed XML ended with {} unclosed element(s)",
            stack.len()
        )));
    }

    Ok(items)
}

/// True when `name` opens an item directly under `rss/channel`.
fn is_item_path(stack: &[Vec<u8>], name: &[u8]) -> bool {
    name == b"item" && stack.len() == 2 && stack[1] == b"channel"
}

// ---------------------------------------------------------------------------
// Text normalization
// ---------------------------------------------------------------------------

/// Reduce an HTML description to plain text suitable for entity extraction.
///
/// Tags become spaces, common entities are decoded, whitespace is collapsed.
pub(crate) fn normalize_description(html: &str) -> String {
    let without_tags = TAG_RE.replace_all(html, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    let numeric: Cow<'_, str> = NUMERIC_ENTITY_RE.replace_all(text, |caps: &Captures<'_>| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    NAMED_ENTITIES
        .iter()
        .fold(numeric.into_owned(), |acc, (entity, replacement)| {
            acc.replace(entity, replacement)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> String {
        std::fs::read_to_string("../../../fixtures/rss/hotdocs.xml").expect("read rss fixture")
    }

    #[test]
    fn parses_fixture_items() {
        let items = parse_rss(&fixture()).unwrap();

        // The item without a link is skipped.
        assert_eq!(items.len(), 3);
        assert!(items[0].title.starts_with("Федеральный закон от 12.05.2026"));
        assert_eq!(items[0].date, "Tue, 12 May 2026 10:00:00 +0300");
        assert_eq!(
            items[0].description,
            "Минфин России уточнил порядок применения ст. 9 НК РФ. Изменения вступают в силу с 1 июля 2026 года."
        );
    }

    #[test]
    fn escaped_html_description_is_cleaned() {
        let items = parse_rss(&fixture()).unwrap();
        assert_eq!(items[1].description, "ФНС разъяснила \"новые\" правила");
    }

    #[test]
    fn rfc2822_dates_are_parsed() {
        let items = parse_rss(&fixture()).unwrap();
        let published = items[0].published_at.expect("parsed date");
        assert_eq!(published.to_rfc3339(), "2026-05-12T07:00:00+00:00");

        // Non-RFC 2822 dates are kept verbatim without a parsed value.
        assert_eq!(items[2].date, "14.05.2026");
        assert!(items[2].published_at.is_none());
        assert_eq!(items[2].description, "");
    }

    #[test]
    fn channel_level_fields_are_ignored() {
        let items = parse_rss(&fixture()).unwrap();
        assert!(items.iter().all(|i| !i.title.contains("Горячие документы")));
    }

    #[test]
    fn empty_channel_yields_no_items() {
        let xml = r#"<rss version="2.0"><channel><title>x</title></channel></rss>"#;
        assert!(parse_rss(xml).unwrap().is_empty());
    }

    #[test]
    fn non_rss_root_is_rejected() {
        let err = parse_rss("<feed><entry/></feed>").unwrap_err();
        assert!(err.to_string().contains("not an RSS document"));
    }

    #[test]
    fn mismatched_tags_are_rejected() {
        let xml = "<rss><channel><item><title>a</link></item></channel></rss>";
        assert!(matches!(
            parse_rss(xml).unwrap_err(),
            LegalWatchError::Parse { .. }
        ));
    }

    #[test]
    fn empty_document_is_rejected() {
        assert!(parse_rss("").is_err());
    }

    #[test]
    fn truncated_document_is_rejected() {
        let xml = "<rss><channel><item><title>a</title>";
        assert!(parse_rss(xml).is_err());
    }

    #[test]
    fn normalize_strips_tags_and_entities() {
        assert_eq!(
            normalize_description("<p>Закон&nbsp;&laquo;О&#160;связи&raquo;</p><br/>  вступил"),
            "Закон «О связи» вступил"
        );
        assert_eq!(normalize_description("&amp;lt;b&amp;gt;"), "&lt;b&gt;");
        assert_eq!(normalize_description("   "), "");
    }
}
