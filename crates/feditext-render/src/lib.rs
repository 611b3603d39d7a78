//! Rich-text rendering pipeline for user-authored status text.
//!
//! Raw text goes through four stages: entity extraction and rewriting
//! (mentions, hashtags, URLs become anchors while literal runs are
//! escaped), optional paragraph formatting, bracket-markup expansion, and
//! an allowlist sanitizer pass. The output is a safe HTML fragment.
//!
//! Account storage and hashtag routing live behind the [`RenderContext`]
//! trait; the pipeline itself performs no I/O beyond the single mention
//! lookup that trait may do, memoized through a [`MentionCache`].
//!
//! # Example
//!
//! ```
//! use feditext_render::{MentionCache, NullContext, RenderOptions, TextRenderer};
//!
//! let cache = MentionCache::new();
//! let renderer = TextRenderer::new(&NullContext, &cache);
//! let html = renderer.render("hello #rust", &RenderOptions::new());
//! assert_eq!(
//!     html,
//!     "<p>hello <a href=\"/tags/rust\" class=\"mention hashtag\" \
//!      rel=\"nofollow noopener noreferrer\" target=\"_blank\">\
//!      #<span>rust</span></a></p>"
//! );
//! ```

mod account;
mod cache;
mod link;
mod mention;
mod options;
mod rewrite;

use std::sync::LazyLock;

use regex::Regex;

pub use account::{Account, NullContext, RenderContext};
pub use cache::MentionCache;
pub use feditext_sanitize::{SanitizePolicy, sanitize};
pub use link::shortened_link;
pub use mention::{KnownPlatform, MentionTarget, Resolution, resolve};
pub use options::RenderOptions;

/// Blank-line paragraph separator.
static PARAGRAPH_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("invalid paragraph regex"));

/// Renders raw user text to safe HTML.
///
/// Cheap to construct; holds only references to its collaborators.
#[derive(Clone, Copy)]
pub struct TextRenderer<'a> {
    context: &'a dyn RenderContext,
    cache: &'a MentionCache,
}

impl<'a> TextRenderer<'a> {
    pub fn new(context: &'a dyn RenderContext, cache: &'a MentionCache) -> Self {
        Self { context, cache }
    }

    /// Run the full pipeline: rewrite entities, format paragraphs, expand
    /// markup, sanitize.
    ///
    /// Malformed input never fails; every stage degrades to escaped or
    /// stripped text. Blank input renders as an empty string.
    #[must_use]
    pub fn render(&self, text: &str, options: &RenderOptions) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let html = rewrite::rewrite(text, options, self.context, self.cache);
        let html = if options.multiline {
            simple_format(&html)
        } else {
            html
        };
        let html = feditext_markup::expand_or_original(&html);

        feditext_sanitize::sanitize(&html, &SanitizePolicy::strict())
    }
}

/// Sanitize third-party embed HTML under the embed policy.
#[must_use]
pub fn sanitize_embed(html: &str) -> String {
    feditext_sanitize::sanitize(html, &SanitizePolicy::embed())
}

/// Wrap paragraphs split on blank lines in `<p>` and turn remaining
/// newlines into `<br />`.
fn simple_format(html: &str) -> String {
    let html = html.replace("\r\n", "\n").replace('\r', "\n");
    PARAGRAPH_SPLIT
        .split(&html)
        .map(|paragraph| format!("<p>{}</p>", paragraph.replace('\n', "<br />")))
        .collect()
}
