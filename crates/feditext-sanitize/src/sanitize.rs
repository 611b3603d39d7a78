//! The sanitization walk.
//!
//! Parses the fragment into a node tree, then runs a depth-first pass that
//! disposes of each element (keep, downgrade, or unwrap), filters its
//! attributes, and applies the policy's transformers. Children are cleaned
//! before their parent is disposed of, so unwrapping splices already-clean
//! content into the parent.

use std::sync::LazyLock;

use regex::Regex;

use crate::escape::escape_html;
use crate::policy::{SanitizePolicy, Transformer};
use crate::tree::{self, Node};

/// Class tokens that survive [`Transformer::FilterClasses`]: microformat
/// prefixes, mention/hashtag markers, link formatting spans, and markup
/// styling classes.
static ALLOWED_CLASS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:h|p|u|dt|e)-|(?:mention|hashtag|ellipsis|invisible)$|bbcode__[a-z2-5-]+$)")
        .expect("invalid class allowlist regex")
});

/// Leading URI scheme: everything before the first `:`, unless a `/`,
/// `?` or `#` comes first. Deliberately looser than RFC 3986 — browsers
/// strip tab/newline when parsing URLs, so a scheme with smuggled
/// whitespace (`java\nscript:`) must be captured whole and fail the
/// allowlist rather than slip through as a relative reference.
static SCHEME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^/?#]*?):").expect("invalid scheme regex"));

/// Sanitize an HTML fragment under the given policy.
///
/// Input that cannot be parsed into a tree is returned fully escaped; this
/// function never passes unvetted markup through.
#[must_use]
pub fn sanitize(html: &str, policy: &SanitizePolicy) -> String {
    match tree::parse(html) {
        Ok(mut root) => {
            clean_children(&mut root, policy);
            tree::serialize(&root)
        }
        Err(err) => {
            tracing::warn!(error = %err, "unparseable HTML fragment, escaping verbatim");
            escape_html(html)
        }
    }
}

/// Disposition of a cleaned node within its parent.
enum CleanOutcome {
    Keep(Node),
    /// Element dropped, content spliced into the parent.
    Unwrap {
        text: String,
        children: Vec<Node>,
        tail: String,
    },
    /// Element replaced by plain text (tail included).
    Text(String),
}

fn clean_children(node: &mut Node, policy: &SanitizePolicy) {
    let children = std::mem::take(&mut node.children);
    for child in children {
        match clean_node(child, policy) {
            CleanOutcome::Keep(cleaned) => node.children.push(cleaned),
            CleanOutcome::Unwrap {
                text,
                children,
                tail,
            } => {
                push_text(node, &text);
                node.children.extend(children);
                push_text(node, &tail);
            }
            CleanOutcome::Text(text) => push_text(node, &text),
        }
    }
}

/// Merge loose text into the parent's text or the preceding sibling's tail.
fn push_text(node: &mut Node, text: &str) {
    if text.is_empty() {
        return;
    }
    match node.children.last_mut() {
        Some(last) => last.tail.push_str(text),
        None => node.text.push_str(text),
    }
}

fn clean_node(mut node: Node, policy: &SanitizePolicy) -> CleanOutcome {
    if policy.has_transformer(Transformer::DowngradeUnsupported) {
        node = downgrade(node, policy);
    }

    clean_children(&mut node, policy);

    if !policy.allowed_elements.contains(node.tag.as_str()) {
        return CleanOutcome::Unwrap {
            text: std::mem::take(&mut node.text),
            children: std::mem::take(&mut node.children),
            tail: std::mem::take(&mut node.tail),
        };
    }

    filter_attributes(&mut node, policy);

    if let Some(forced) = policy.forced_attributes.get(node.tag.as_str()) {
        for (name, value) in *forced {
            node.set_attr(name, value);
        }
    }

    if policy.has_transformer(Transformer::FilterClasses) {
        filter_classes(&mut node);
    }
    if policy.has_transformer(Transformer::FilterTranslate) {
        filter_translate(&mut node);
    }

    if policy.has_transformer(Transformer::FilterLinkProtocols)
        && node.tag == "a"
        && !href_allowed(&node, policy)
    {
        let mut replacement = node.inner_text();
        replacement.push_str(&node.tail);
        return CleanOutcome::Text(replacement);
    }

    CleanOutcome::Keep(node)
}

/// Rewrite an unsupported element to its allowed equivalent, optionally
/// wrapping it. Attributes do not survive the rename.
fn downgrade(mut node: Node, policy: &SanitizePolicy) -> Node {
    let Some(rule) = policy.downgrades.get(node.tag.as_str()) else {
        return node;
    };

    node.tag = rule.rename_to.to_owned();
    node.attrs.clear();

    match rule.wrap_in {
        Some(wrapper_tag) => {
            let mut wrapper = Node::new(wrapper_tag);
            wrapper.tail = std::mem::take(&mut node.tail);
            wrapper.children.push(node);
            wrapper
        }
        None => node,
    }
}

fn filter_attributes(node: &mut Node, policy: &SanitizePolicy) {
    let allowed = policy
        .allowed_attributes
        .get(node.tag.as_str())
        .copied()
        .unwrap_or(&[]);
    node.attrs.retain(|(name, _)| allowed.contains(&name.as_str()));

    // URL-bearing attributes other than anchor href, which the link
    // protocol transformer owns. A scheme outside the per-attribute
    // allowlist drops the attribute; without an allowlist entry only
    // relative references pass.
    for attr_name in ["src", "cite"] {
        let keep = match node.attr(attr_name) {
            None => continue,
            Some(value) => {
                let scheme = uri_scheme(value);
                match policy
                    .allowed_protocols
                    .get(&(node.tag.as_str(), attr_name))
                {
                    Some(schemes) => {
                        scheme.is_some_and(|s| schemes.contains(&s.as_str()))
                    }
                    None => scheme.is_none(),
                }
            }
        };
        if !keep {
            node.remove_attr(attr_name);
        }
    }
}

fn filter_classes(node: &mut Node) {
    let Some(class) = node.attr("class") else {
        return;
    };
    let kept = class
        .split_whitespace()
        .filter(|token| ALLOWED_CLASS_PATTERN.is_match(token))
        .collect::<Vec<_>>()
        .join(" ");

    if kept.is_empty() {
        node.remove_attr("class");
    } else {
        node.set_attr("class", &kept);
    }
}

fn filter_translate(node: &mut Node) {
    if node.attr("translate").is_some_and(|value| value != "no") {
        node.remove_attr("translate");
    }
}

/// A relative href is allowed; an absolute one must carry an allowlisted
/// scheme. A missing href is not a link to validate.
fn href_allowed(node: &Node, policy: &SanitizePolicy) -> bool {
    match node.attr("href") {
        None => true,
        Some(href) => match uri_scheme(href) {
            None => true,
            Some(scheme) => policy.link_protocols.contains(&scheme.as_str()),
        },
    }
}

fn uri_scheme(value: &str) -> Option<String> {
    SCHEME_PATTERN
        .captures(value)
        .map(|caps| caps[1].to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn strict(html: &str) -> String {
        sanitize(html, &SanitizePolicy::strict())
    }

    fn embed(html: &str) -> String {
        sanitize(html, &SanitizePolicy::embed())
    }

    #[test]
    fn test_keeps_allowed_formatting() {
        let html = "<p>Hello <strong>world</strong></p>";
        assert_eq!(strict(html), html);
    }

    #[test]
    fn test_unwraps_unknown_element() {
        assert_eq!(strict("<p><marquee>wheee</marquee></p>"), "<p>wheee</p>");
    }

    #[test]
    fn test_unwrap_keeps_cleaned_children() {
        assert_eq!(
            strict("<div>before <em>kept</em> after</div>"),
            "before <em>kept</em> after"
        );
    }

    #[test]
    fn test_script_content_survives_as_text() {
        // Unwrapping keeps content; the tags themselves are gone.
        assert_eq!(strict("<script>alert(1)</script>"), "alert(1)");
    }

    #[test]
    fn test_drops_unknown_attributes() {
        assert_eq!(
            strict(r#"<p onclick="alert(1)" style="color:red">x</p>"#),
            "<p>x</p>"
        );
    }

    #[test]
    fn test_javascript_href_replaced_with_text() {
        assert_eq!(strict(r#"<a href="javascript:alert(1)">x</a>"#), "x");
    }

    #[test]
    fn test_javascript_href_mixed_case_scheme() {
        assert_eq!(strict(r#"<a href="JaVaScRiPt:alert(1)">x</a>"#), "x");
    }

    #[test]
    fn test_href_scheme_with_entity_encoded_newline_replaced() {
        // &#10; decodes to a raw newline during parsing; browsers strip
        // it when resolving the URL, so the scheme must be validated
        // with the whitespace still in place.
        assert_eq!(strict("<a href=\"java&#10;script:alert(1)\">x</a>"), "x");
    }

    #[test]
    fn test_href_scheme_with_raw_whitespace_replaced() {
        assert_eq!(strict("<a href=\"java\nscript:alert(1)\">x</a>"), "x");
        assert_eq!(strict("<a href=\"java\tscript:alert(1)\">x</a>"), "x");
        assert_eq!(strict("<a href=\" javascript:alert(1)\">x</a>"), "x");
    }

    #[test]
    fn test_colon_after_path_start_is_relative() {
        let html = r#"<a href="/wiki/a:b">x</a>"#;
        assert_eq!(
            strict(html),
            r#"<a href="/wiki/a:b" rel="nofollow noopener noreferrer" target="_blank">x</a>"#
        );
    }

    #[test]
    fn test_img_src_scheme_with_smuggled_whitespace_dropped() {
        assert_eq!(
            strict("<img src=\"java&#9;script:alert(1)\" alt=\"x\" />"),
            r#"<img alt="x" />"#
        );
    }

    #[test]
    fn test_embed_src_scheme_with_smuggled_whitespace_dropped() {
        assert_eq!(
            embed("<source src=\"java&#10;script:x\" type=\"video/mp4\" />"),
            r#"<source type="video/mp4" />"#
        );
    }

    #[test]
    fn test_discarded_link_keeps_tail() {
        assert_eq!(
            strict(r#"<p><a href="javascript:x">bad</a> link</p>"#),
            "<p>bad link</p>"
        );
    }

    #[test]
    fn test_https_href_kept_with_forced_rel() {
        assert_eq!(
            strict(r#"<a href="https://example.com">x</a>"#),
            r#"<a href="https://example.com" rel="nofollow noopener noreferrer" target="_blank">x</a>"#
        );
    }

    #[test]
    fn test_relative_href_kept() {
        assert_eq!(
            strict(r#"<a href="/about">x</a>"#),
            r#"<a href="/about" rel="nofollow noopener noreferrer" target="_blank">x</a>"#
        );
    }

    #[test]
    fn test_forced_rel_overrides_existing() {
        assert_eq!(
            strict(r#"<a href="/tags/rust" rel="tag">#rust</a>"#),
            r#"<a href="/tags/rust" rel="nofollow noopener noreferrer" target="_blank">#rust</a>"#
        );
    }

    #[test]
    fn test_nonstandard_fediverse_schemes_kept() {
        for scheme in ["dat", "ipfs", "gemini", "xmpp", "magnet"] {
            assert_eq!(
                strict(&format!(r#"<a href="{scheme}:something">x</a>"#)),
                format!(
                    r#"<a href="{scheme}:something" rel="nofollow noopener noreferrer" target="_blank">x</a>"#
                )
            );
        }
    }

    #[test]
    fn test_class_filter_keeps_recognized_tokens() {
        assert_eq!(
            strict(r#"<span class="h-card evil mention">x</span>"#),
            r#"<span class="h-card mention">x</span>"#
        );
    }

    #[test]
    fn test_class_filter_removes_empty_class() {
        assert_eq!(strict(r#"<span class="evil">x</span>"#), "<span>x</span>");
    }

    #[test]
    fn test_class_filter_keeps_markup_classes() {
        let html = r#"<span class="bbcode__color">x</span>"#;
        assert_eq!(strict(html), html);
    }

    #[test]
    fn test_translate_no_kept() {
        let html = r#"<span translate="no">x</span>"#;
        assert_eq!(strict(html), html);
    }

    #[test]
    fn test_translate_other_value_dropped() {
        assert_eq!(strict(r#"<span translate="yes">x</span>"#), "<span>x</span>");
    }

    #[test]
    fn test_h6_downgraded_to_strong_in_paragraph() {
        assert_eq!(
            strict("<h6>small heading</h6>"),
            "<p><strong>small heading</strong></p>"
        );
    }

    #[test]
    fn test_h5_kept_as_is() {
        let html = "<h5>heading</h5>";
        assert_eq!(strict(html), html);
    }

    #[test]
    fn test_img_relative_src_kept_absolute_dropped() {
        assert_eq!(
            strict(r#"<img src="/media/x.png" alt="x" />"#),
            r#"<img src="/media/x.png" alt="x" />"#
        );
        assert_eq!(
            strict(r#"<img src="https://example.com/x.png" />"#),
            "<img />"
        );
    }

    #[test]
    fn test_unparseable_input_is_escaped() {
        assert_eq!(
            strict("<p><b>broken</p></b>"),
            "&lt;p&gt;&lt;b&gt;broken&lt;/p&gt;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let once = strict(r#"<div><a href="ftp://x">y</a><h6>z</h6></div>"#);
        assert_eq!(strict(&once), once);
    }

    #[test]
    fn test_embed_iframe_sandbox_forced() {
        assert_eq!(
            embed(r#"<iframe src="https://example.com/embed" width="400"></iframe>"#),
            r#"<iframe src="https://example.com/embed" width="400" sandbox="allow-scripts allow-same-origin allow-popups allow-popups-to-escape-sandbox allow-forms"></iframe>"#
        );
    }

    #[test]
    fn test_embed_drops_non_http_src() {
        assert_eq!(
            embed(r#"<iframe src="javascript:alert(1)"></iframe>"#),
            r#"<iframe sandbox="allow-scripts allow-same-origin allow-popups allow-popups-to-escape-sandbox allow-forms"></iframe>"#
        );
    }

    #[test]
    fn test_embed_rejects_inline_formatting() {
        assert_eq!(embed("<p>hi <b>there</b></p>"), "hi there");
    }

    #[test]
    fn test_embed_keeps_video_with_sources() {
        let html =
            r#"<video controls=""><source src="https://example.com/v.mp4" type="video/mp4" /></video>"#;
        assert_eq!(
            embed(html),
            r#"<video controls=""><source src="https://example.com/v.mp4" type="video/mp4" /></video>"#
        );
    }
}
