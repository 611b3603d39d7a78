//! The supported tag table.
//!
//! Each tag maps to a fixed open/close HTML template. Templates may contain
//! a single `{param}` placeholder that is substituted with the validated
//! parameter. Unknown tags are never expanded.

/// Parameter grammar of a tag.
#[derive(Debug)]
pub(crate) enum ParamRule {
    /// No parameter accepted; a present parameter leaves the tag literal.
    Forbidden,
    /// Bare color name: one or more ASCII letters.
    ColorName,
    /// Exactly six hex digits.
    ColorHex,
    /// Integer pixel size, 1 to [`MAX_SIZE_PX`] inclusive.
    Size,
    /// One of a fixed set of values, matched case-insensitively.
    Enumerated(&'static [&'static str]),
    /// Absolute `http`/`https`/`ftp` URL.
    LinkUrl,
}

/// Upper bound accepted by the `size=` parameter, in pixels.
pub(crate) const MAX_SIZE_PX: u32 = 100;

/// A supported bracket tag.
#[derive(Debug)]
pub(crate) struct TagSpec {
    pub name: &'static str,
    pub rule: ParamRule,
    /// Opening HTML template; `{param}` is replaced by the parameter.
    pub open: &'static str,
    pub close: &'static str,
    /// Tag requires non-blank content between open and close.
    pub requires_body: bool,
    /// Body is emitted as-is, without expanding nested tags.
    pub literal_body: bool,
}

pub(crate) static TAGS: &[TagSpec] = &[
    TagSpec {
        name: "b",
        rule: ParamRule::Forbidden,
        open: "<b>",
        close: "</b>",
        requires_body: false,
        literal_body: false,
    },
    TagSpec {
        name: "i",
        rule: ParamRule::Forbidden,
        open: "<i>",
        close: "</i>",
        requires_body: false,
        literal_body: false,
    },
    TagSpec {
        name: "u",
        rule: ParamRule::Forbidden,
        open: "<u>",
        close: "</u>",
        requires_body: false,
        literal_body: false,
    },
    TagSpec {
        name: "s",
        rule: ParamRule::Forbidden,
        open: "<s>",
        close: "</s>",
        requires_body: false,
        literal_body: false,
    },
    TagSpec {
        name: "spin",
        rule: ParamRule::Forbidden,
        open: r#"<span class="bbcode__spin">"#,
        close: "</span>",
        requires_body: false,
        literal_body: false,
    },
    TagSpec {
        name: "pulse",
        rule: ParamRule::Forbidden,
        open: r#"<span class="bbcode__pulse">"#,
        close: "</span>",
        requires_body: false,
        literal_body: false,
    },
    TagSpec {
        name: "quote",
        rule: ParamRule::Forbidden,
        open: "<blockquote>",
        close: "</blockquote>",
        requires_body: false,
        literal_body: false,
    },
    TagSpec {
        name: "code",
        rule: ParamRule::Forbidden,
        open: "<pre>",
        close: "</pre>",
        requires_body: false,
        literal_body: true,
    },
    TagSpec {
        name: "flip",
        rule: ParamRule::Enumerated(&["horizontal", "vertical"]),
        open: r#"<span class="bbcode__flip-{param}">"#,
        close: "</span>",
        requires_body: false,
        literal_body: false,
    },
    TagSpec {
        name: "large",
        rule: ParamRule::Enumerated(&["2x", "3x", "4x", "5x"]),
        open: r#"<span class="fa-{param}">"#,
        close: "</span>",
        requires_body: false,
        literal_body: false,
    },
    TagSpec {
        name: "color",
        rule: ParamRule::ColorName,
        open: r#"<span class="bbcode__color" data-bbcodecolor="{param}">"#,
        close: "</span>",
        requires_body: false,
        literal_body: false,
    },
    TagSpec {
        name: "colorhex",
        rule: ParamRule::ColorHex,
        open: r##"<span class="bbcode__color" data-bbcodecolor="#{param};">"##,
        close: "</span>",
        requires_body: false,
        literal_body: false,
    },
    TagSpec {
        name: "size",
        rule: ParamRule::Size,
        open: r#"<span class="bbcode__size" data-bbcodesize="{param}px">"#,
        close: "</span>",
        requires_body: false,
        literal_body: false,
    },
    TagSpec {
        name: "url",
        rule: ParamRule::LinkUrl,
        open: r#"<a target="_blank" rel="nofollow noopener" href="{param}">"#,
        close: "</a>",
        requires_body: true,
        literal_body: false,
    },
];

/// Look up a tag spec by lowercase name.
pub(crate) fn find(name: &str) -> Option<&'static TagSpec> {
    TAGS.iter().find(|spec| spec.name == name)
}
