//! BIO tag decoding.
//!
//! The tagger marks every token as outside any entity (`O`), as the beginning
//! of an entity of category `C` (`B-C`), or as a continuation of one (`I-C`).
//! [`BioDecoder`] folds that stream into [`EntitySpan`]s in one forward pass
//! with at most one span open at a time.
//!
//! An `I-C` tag that does not continue an open span of category `C` is
//! malformed. It closes whatever span is open and is then dropped: it never
//! starts a span and never merges into a span of another category.

use legalwatch_shared::EntitySpan;
use tracing::debug;

/// Tag for tokens outside any entity.
pub const OUTSIDE: &str = "O";

const BEGIN_PREFIX: &str = "B-";
const INSIDE_PREFIX: &str = "I-";

// ---------------------------------------------------------------------------
// Tag parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag<'a> {
    Outside,
    Begin(&'a str),
    Inside(&'a str),
}

impl<'a> Tag<'a> {
    /// Anything that is not a well-formed `B-`/`I-` tag counts as outside.
    fn parse(raw: &'a str) -> Self {
        if raw == OUTSIDE {
            return Tag::Outside;
        }
        if let Some(category) = raw.strip_prefix(BEGIN_PREFIX).filter(|c| !c.is_empty()) {
            return Tag::Begin(category);
        }
        if let Some(category) = raw.strip_prefix(INSIDE_PREFIX).filter(|c| !c.is_empty()) {
            return Tag::Inside(category);
        }
        Tag::Outside
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Streaming BIO decoder.
///
/// Feed `(token, tag)` pairs with [`push`](Self::push) in order, then call
/// [`finish`](Self::finish) to close the last span and take the output.
#[derive(Debug, Default)]
pub struct BioDecoder {
    current: Option<EntitySpan>,
    spans: Vec<EntitySpan>,
    position: usize,
    stray: usize,
}

impl BioDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one token and its tag.
    pub fn push(&mut self, token: &str, tag: &str) {
        match Tag::parse(tag) {
            Tag::Outside => self.close(),
            Tag::Begin(category) => {
                self.close();
                self.current = Some(EntitySpan::new(category, token));
            }
            Tag::Inside(category) => match self.current.as_mut() {
                Some(span) if span.category == category => {
                    span.text.push(' ');
                    span.text.push_str(token);
                }
                _ => {
                    debug!(
                        position = self.position,
                        tag,
                        token,
                        "dropping inside tag with no matching open span"
                    );
                    self.stray += 1;
                    self.close();
                }
            },
        }
        self.position += 1;
    }

    /// Number of malformed inside tags dropped so far.
    fn stray_tags(&self) -> usize {
        self.stray
    }

    /// Close any open span and return all spans in first-token order.
    pub fn finish(mut self) -> Vec<EntitySpan> {
        self.close();
        self.spans
    }

    fn close(&mut self) {
        if let Some(span) = self.current.take() {
            self.spans.push(span);
        }
    }
}

/// Decode parallel token/tag sequences into entity spans.
///
/// The sequences are expected to have equal length; pairs past the end of
/// the shorter one are ignored.
pub fn decode<T, G>(tokens: &[T], tags: &[G]) -> Vec<EntitySpan>
where
    T: AsRef<str>,
    G: AsRef<str>,
{
    let mut decoder = BioDecoder::new();
    for (token, tag) in tokens.iter().zip(tags) {
        decoder.push(token.as_ref(), tag.as_ref());
    }
    let stray = decoder.stray_tags();
    if stray > 0 {
        debug!(stray, "dropped inside tags without an open span");
    }
    decoder.finish()
}
