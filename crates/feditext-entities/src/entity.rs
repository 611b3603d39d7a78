//! Classified text spans.

/// Token class of an extracted [`Entity`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    /// An absolute URL (`http://`, `https://` or `xmpp:`).
    Url,
    /// A `#hashtag`.
    Hashtag,
    /// A `@user` or `@user@domain` mention.
    Mention,
}

/// A classified substring located by position in the source text.
///
/// `start` and `end` are byte offsets into the source `&str` and always fall
/// on character boundaries, so `&text[start..end]` is valid. For URLs the
/// span covers the whole token; for hashtags and mentions it includes the
/// leading `#` or `@`.
///
/// The payload is the matched URL, the hashtag text without `#`, or the
/// mention handle without the leading `@` (`user` or `user@domain`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    /// Token class.
    pub kind: EntityKind,
    /// Byte offset of the first character of the span.
    pub start: usize,
    /// Byte offset one past the last character of the span.
    pub end: usize,
    /// Matched token text, normalized per kind.
    pub payload: String,
}

impl Entity {
    /// Create an entity for the given span.
    #[must_use]
    pub fn new(kind: EntityKind, start: usize, end: usize, payload: impl Into<String>) -> Self {
        Self {
            kind,
            start,
            end,
            payload: payload.into(),
        }
    }
}
