//! End-to-end pipeline tests: raw text through rewriting, formatting,
//! markup expansion and sanitization.

use pretty_assertions::assert_eq;

use feditext_render::{
    Account, MentionCache, NullContext, RenderOptions, SanitizePolicy, TextRenderer, sanitize,
    sanitize_embed,
};

fn render(text: &str) -> String {
    render_with(text, &RenderOptions::new())
}

fn render_with(text: &str, options: &RenderOptions) -> String {
    let cache = MentionCache::new();
    TextRenderer::new(&NullContext, &cache).render(text, options)
}

#[test]
fn test_plain_text_wrapped_in_paragraph() {
    assert_eq!(render("hello world"), "<p>hello world</p>");
}

#[test]
fn test_blank_input_renders_empty() {
    assert_eq!(render(""), "");
    assert_eq!(render("   \n  "), "");
}

#[test]
fn test_literal_markup_escaped() {
    assert_eq!(
        render("<script>alert(1)</script>"),
        "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"
    );
}

#[test]
fn test_long_url_truncated_with_invisible_spans() {
    assert_eq!(
        render("see https://www.example.com/a/very/long/path/that/exceeds/thirty/chars"),
        "<p>see <a href=\"https://www.example.com/a/very/long/path/that/exceeds/thirty/chars\" \
         rel=\"nofollow noopener noreferrer\" translate=\"no\" target=\"_blank\">\
         <span class=\"invisible\">https://www.</span>\
         <span class=\"ellipsis\">example.com/a/very/long/path/t</span>\
         <span class=\"invisible\">hat/exceeds/thirty/chars</span></a></p>"
    );
}

#[test]
fn test_short_url_has_no_ellipsis_class() {
    let html = render("see https://example.com/a");
    assert!(html.contains("<span>example.com/a</span>"));
    assert!(!html.contains("ellipsis"));
}

#[test]
fn test_ambiguous_mention_displays_full_handle() {
    let options = RenderOptions::new().preloaded_accounts(vec![
        Account::remote("alice", "a.example", "https://a.example/@alice"),
        Account::remote("alice", "b.example", "https://b.example/@alice"),
    ]);
    assert_eq!(
        render_with("hi @alice@a.example", &options),
        "<p>hi <span class=\"h-card\" translate=\"no\">\
         <a href=\"https://a.example/@alice\" class=\"u-url mention\" \
         rel=\"nofollow noopener noreferrer\" target=\"_blank\">\
         @<span>alice@a.example</span></a></span></p>"
    );
}

#[test]
fn test_unambiguous_mention_displays_bare_username() {
    let options = RenderOptions::new().preloaded_accounts(vec![Account::remote(
        "alice",
        "a.example",
        "https://a.example/@alice",
    )]);
    let html = render_with("hi @alice@a.example", &options);
    assert!(html.contains("@<span>alice</span>"));
}

#[test]
fn test_github_mention_rewritten_to_platform_link() {
    assert_eq!(
        render("by @foo@github.com"),
        "<p>by <span class=\"h-card\">\
         <a href=\"https://github.com/foo\" rel=\"nofollow noopener noreferrer\" \
         class=\"u-url mention\" target=\"_blank\">\
         @<span>foo@github.com</span></a></span></p>"
    );
}

#[test]
fn test_unresolved_mention_stays_literal() {
    assert_eq!(
        render("hi @nobody@nowhere.example"),
        "<p>hi @nobody@nowhere.example</p>"
    );
}

#[test]
fn test_bold_markup_expands() {
    assert_eq!(render("[b]hi[/b]"), "<p><b>hi</b></p>");
}

#[test]
fn test_color_markup_expands() {
    assert_eq!(
        render("[color=red]x[/color]"),
        "<p><span class=\"bbcode__color\" data-bbcodecolor=\"red\">x</span></p>"
    );
}

#[test]
fn test_invalid_markup_parameter_stays_literal() {
    assert_eq!(
        render("[spin=sideways]x[/spin]"),
        "<p>[spin=sideways]x[/spin]</p>"
    );
}

#[test]
fn test_url_markup_tag_claims_bracketed_url() {
    assert_eq!(
        render("[url=https://example.com]site[/url]"),
        "<p><a rel=\"nofollow noopener noreferrer\" href=\"https://example.com\" \
         target=\"_blank\">site</a></p>"
    );
}

#[test]
fn test_markup_across_paragraphs() {
    assert_eq!(
        render("[b]a[/b]\n\n[i]b[/i]"),
        "<p><b>a</b></p><p><i>b</i></p>"
    );
}

#[test]
fn test_block_tag_across_blank_line_stays_literal() {
    // The close tag sits in a different paragraph; expanding it would
    // misnest the blockquote and the sanitizer would escape the whole
    // document.
    assert_eq!(
        render("[quote]a\n\nb[/quote]"),
        "<p>[quote]a</p><p>b[/quote]</p>"
    );
}

#[test]
fn test_block_tag_spans_newlines_when_multiline_disabled() {
    let options = RenderOptions::new().multiline(false);
    assert_eq!(
        render_with("[quote]a\n\nb[/quote]", &options),
        "<blockquote>a\n\nb</blockquote>"
    );
}

#[test]
fn test_single_newline_becomes_break() {
    assert_eq!(render("a\nb"), "<p>a<br />b</p>");
}

#[test]
fn test_multiline_disabled() {
    let options = RenderOptions::new().multiline(false);
    assert_eq!(render_with("a\n\nb", &options), "a\n\nb");
}

#[test]
fn test_ampersand_survives_pipeline() {
    assert_eq!(render("a & b"), "<p>a &amp; b</p>");
}

#[test]
fn test_javascript_link_fails_closed_under_both_policies() {
    let html = r#"<a href="javascript:alert(1)">x</a>"#;
    assert_eq!(sanitize(html, &SanitizePolicy::strict()), "x");
    assert_eq!(sanitize_embed(html), "x");
}

#[test]
fn test_sanitize_idempotent_on_pipeline_output() {
    let html = render("hi @foo@github.com, see https://example.com/x #news [b]ok[/b]");
    assert_eq!(sanitize(&html, &SanitizePolicy::strict()), html);
}

#[test]
fn test_hashtag_links_to_tag_page() {
    assert_eq!(
        render("#rust"),
        "<p><a href=\"/tags/rust\" class=\"mention hashtag\" \
         rel=\"nofollow noopener noreferrer\" target=\"_blank\">\
         #<span>rust</span></a></p>"
    );
}

#[test]
fn test_embed_iframe_sandboxed() {
    assert_eq!(
        sanitize_embed(r#"<iframe src="https://example.com/embed"></iframeX>"#),
        "&lt;iframe src=&quot;https://example.com/embed&quot;&gt;&lt;/iframeX&gt;"
    );
    assert_eq!(
        sanitize_embed(r#"<iframe src="https://example.com/embed"></iframe>"#),
        "<iframe src=\"https://example.com/embed\" \
         sandbox=\"allow-scripts allow-same-origin allow-popups \
         allow-popups-to-escape-sandbox allow-forms\"></iframe>"
    );
}
