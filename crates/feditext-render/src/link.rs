//! URL anchor rendering with truncation.
//!
//! Long URLs display their first 30 characters after the scheme prefix;
//! the prefix and the remainder land in visually hidden spans so screen
//! readers and copy/paste still see the full URL.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use feditext_sanitize::escape_html;

/// Scheme prefix hidden from display: `http://`, `https://`, optional
/// `www.`, or `xmpp:`.
static URL_PREFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://(www\.)?|xmpp:)").expect("invalid URL prefix regex"));

/// Visible characters before truncation kicks in.
const DISPLAY_CHARS: usize = 30;

const DEFAULT_REL: &str = "nofollow noopener noreferrer";

/// Render a URL as a truncated, ellipsis-aware anchor.
///
/// A URL that does not parse degrades to its escaped literal text; this
/// function never fails.
#[must_use]
pub fn shortened_link(url: &str, with_rel_me: bool) -> String {
    if Url::parse(url).is_err() {
        return escape_html(url);
    }

    let rel = if with_rel_me {
        format!("{DEFAULT_REL} me")
    } else {
        DEFAULT_REL.to_owned()
    };

    let prefix = URL_PREFIX_PATTERN
        .find(url)
        .map_or("", |m| m.as_str());
    let remainder = &url[prefix.len()..];

    let display_end = remainder
        .char_indices()
        .nth(DISPLAY_CHARS)
        .map_or(remainder.len(), |(i, _)| i);
    let display = &remainder[..display_end];
    let suffix = &remainder[display_end..];
    let cutoff = !suffix.is_empty();

    format!(
        r#"<a href="{href}" target="_blank" rel="{rel}" translate="no"><span class="invisible">{prefix}</span><span class="{class}">{display}</span><span class="invisible">{suffix}</span></a>"#,
        href = escape_html(url),
        class = if cutoff { "ellipsis" } else { "" },
        prefix = escape_html(prefix),
        display = escape_html(display),
        suffix = escape_html(suffix),
    )
}
