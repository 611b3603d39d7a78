//! Regex-based entity scanner.
//!
//! The regex crate has no lookbehind, so boundary rules ("not preceded by a
//! word character") are expressed as a leading-context alternation that is
//! excluded from the reported span via capture groups.

use std::sync::LazyLock;

use regex::Regex;

use crate::entity::{Entity, EntityKind};

/// URL tokens. Schemeless `www.example.com` is deliberately not matched.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://|xmpp:)[^\s<>]+").expect("invalid URL regex")
});

/// `#hashtag`, not preceded by a word character. Group 1 is the span
/// including `#`, group 2 the hashtag text.
static HASHTAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\A|[^\p{L}\p{M}\p{Nd}_])(#([\p{L}\p{M}\p{Nd}_]+))")
        .expect("invalid hashtag regex")
});

/// `@user` or `@user@domain`, not preceded by a word character or `/`.
/// Group 1 is the span including the leading `@`.
static MENTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\A|[^/\p{L}\p{M}\p{Nd}_])(@([a-z0-9_]+(?:[a-z0-9_.\-]*[a-z0-9_])?)(@[a-z0-9][a-z0-9.\-]*[a-z0-9])?)",
    )
    .expect("invalid mention regex")
});

/// Extract URL, hashtag and mention entities from raw text.
///
/// The result is sorted ascending by `start` and contains no overlapping
/// spans: when candidates conflict, the earliest-starting match wins, and
/// for equal starts the longest one.
///
/// A URL immediately preceded by the literal sequence `[url=` (ASCII
/// case-insensitive) and followed by at least one more character is a
/// parameter of the `url` markup tag, not a renderable entity, and is not
/// emitted.
#[must_use]
pub fn extract(text: &str) -> Vec<Entity> {
    let mut candidates: Vec<Entity> = Vec::new();

    for m in URL_PATTERN.find_iter(text) {
        let (start, end) = trim_trailing_punctuation(text, m.start(), m.end());
        if end <= start || is_markup_url_parameter(text, start, end) {
            continue;
        }
        candidates.push(Entity::new(EntityKind::Url, start, end, &text[start..end]));
    }

    for caps in HASHTAG_PATTERN.captures_iter(text) {
        let span = caps.get(1).expect("hashtag span group");
        let tag = caps.get(2).expect("hashtag text group");
        candidates.push(Entity::new(
            EntityKind::Hashtag,
            span.start(),
            span.end(),
            tag.as_str(),
        ));
    }

    for caps in MENTION_PATTERN.captures_iter(text) {
        let span = caps.get(1).expect("mention span group");
        // Handle without the leading `@`: `user` or `user@domain`.
        candidates.push(Entity::new(
            EntityKind::Mention,
            span.start(),
            span.end(),
            &span.as_str()[1..],
        ));
    }

    // Earliest start wins; for equal starts prefer the longest match.
    candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut entities = Vec::with_capacity(candidates.len());
    let mut last_end = 0;
    for candidate in candidates {
        if candidate.start >= last_end {
            last_end = candidate.end;
            entities.push(candidate);
        }
    }

    entities
}

/// Trim trailing punctuation and unbalanced closers from a URL match.
fn trim_trailing_punctuation(text: &str, start: usize, mut end: usize) -> (usize, usize) {
    loop {
        let Some(last) = text[start..end].chars().next_back() else {
            break;
        };
        let trimmed = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' => true,
            ')' => is_unbalanced(&text[start..end], '(', ')'),
            ']' => is_unbalanced(&text[start..end], '[', ']'),
            _ => false,
        };
        if !trimmed {
            break;
        }
        end -= last.len_utf8();
    }
    (start, end)
}

fn is_unbalanced(span: &str, open: char, close: char) -> bool {
    let opens = span.chars().filter(|&c| c == open).count();
    let closes = span.chars().filter(|&c| c == close).count();
    closes > opens
}

/// True when the URL at `start..end` is the parameter of a `[url=...]` tag.
fn is_markup_url_parameter(text: &str, start: usize, end: usize) -> bool {
    start >= 5
        && end < text.len()
        && text.as_bytes()[start - 5..start].eq_ignore_ascii_case(b"[url=")
}
