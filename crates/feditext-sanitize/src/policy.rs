//! Sanitization policies.
//!
//! A [`SanitizePolicy`] is a declarative allowlist: elements, per-element
//! attributes, forced attributes, per-attribute protocol allowlists and a
//! fixed transformer sequence. Two policies are provided: [`strict`] for
//! user-authored status text (inline formatting only) and [`embed`] for
//! third-party media embeds.
//!
//! [`strict`]: SanitizePolicy::strict
//! [`embed`]: SanitizePolicy::embed

use std::collections::{HashMap, HashSet};

/// HTTP(S) only, used for embedded media sources.
const HTTP_PROTOCOLS: &[&str] = &["http", "https"];

/// Schemes an anchor may link to under the strict policy.
const LINK_PROTOCOLS: &[&str] = &[
    "http", "https", "dat", "dweb", "ipfs", "ipns", "ssb", "gopher", "xmpp", "magnet", "gemini",
];

/// A post-allowlist tree-rewrite step.
///
/// Transformers are a closed set and run in the order listed in the policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transformer {
    /// Keep only recognized class tokens (microformats, semantic classes,
    /// link formatting classes, markup classes).
    FilterClasses,
    /// Remove a `translate` attribute unless its value is exactly `no`.
    FilterTranslate,
    /// Rewrite legacy elements to an allowed equivalent instead of
    /// dropping their content.
    DowngradeUnsupported,
    /// Replace anchors whose `href` scheme is not allowlisted with their
    /// plain text content.
    FilterLinkProtocols,
}

/// Rewrite rule for an unsupported element.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Downgrade {
    /// Tag the element is renamed to.
    pub rename_to: &'static str,
    /// Optional wrapper element placed around the renamed node.
    pub wrap_in: Option<&'static str>,
}

/// Element/attribute/protocol allowlist plus transformer sequence.
///
/// Fail-closed by construction: an element, attribute or protocol not
/// present in the policy is dropped. URL-bearing attributes (`src`,
/// `cite`) with no protocol entry accept relative references only.
#[derive(Debug)]
pub struct SanitizePolicy {
    pub(crate) allowed_elements: HashSet<&'static str>,
    pub(crate) allowed_attributes: HashMap<&'static str, &'static [&'static str]>,
    pub(crate) forced_attributes: HashMap<&'static str, &'static [(&'static str, &'static str)]>,
    pub(crate) allowed_protocols: HashMap<(&'static str, &'static str), &'static [&'static str]>,
    pub(crate) downgrades: HashMap<&'static str, Downgrade>,
    pub(crate) transformers: Vec<Transformer>,
    pub(crate) link_protocols: &'static [&'static str],
}

impl SanitizePolicy {
    /// Policy for user-authored status text: inline formatting only.
    ///
    /// No absolute protocols are configured for its own attributes; anchor
    /// `href` validation is owned by [`Transformer::FilterLinkProtocols`],
    /// and `img src` therefore accepts relative references only.
    #[must_use]
    pub fn strict() -> Self {
        let allowed_attributes: HashMap<&'static str, &'static [&'static str]> = [
            ("abbr", &["title"] as &[&str]),
            ("blockquote", &["cite"]),
            ("img", &["src", "alt"]),
            ("a", &["href", "rel", "class", "translate", "title"]),
            ("span", &["class", "translate", "data-bbcodecolor", "data-bbcodesize"]),
            ("ol", &["start", "reversed"]),
            ("li", &["value"]),
        ]
        .into_iter()
        .collect();

        Self {
            allowed_elements: [
                "p", "br", "span", "a", "abbr", "del", "pre", "blockquote", "code", "b", "strong",
                "i", "em", "h1", "h2", "h3", "h4", "h5", "ul", "ol", "li", "img", "u",
            ]
            .into_iter()
            .collect(),
            allowed_attributes,
            forced_attributes: [(
                "a",
                &[
                    ("rel", "nofollow noopener noreferrer"),
                    ("target", "_blank"),
                ] as &[(&str, &str)],
            )]
            .into_iter()
            .collect(),
            allowed_protocols: HashMap::new(),
            downgrades: [(
                "h6",
                Downgrade {
                    rename_to: "strong",
                    wrap_in: Some("p"),
                },
            )]
            .into_iter()
            .collect(),
            transformers: vec![
                Transformer::FilterClasses,
                Transformer::FilterTranslate,
                Transformer::DowngradeUnsupported,
                Transformer::FilterLinkProtocols,
            ],
            link_protocols: LINK_PROTOCOLS,
        }
    }

    /// Policy for third-party media embeds: audio/video/iframe/embed with
    /// HTTP(S) sources and a sandboxed iframe.
    #[must_use]
    pub fn embed() -> Self {
        let allowed_attributes: HashMap<&'static str, &'static [&'static str]> = [
            ("audio", &["controls"] as &[&str]),
            ("embed", &["height", "src", "type", "width"]),
            (
                "iframe",
                &["allowfullscreen", "frameborder", "height", "scrolling", "src", "width"],
            ),
            ("source", &["src", "type"]),
            ("video", &["controls", "height", "loop", "width"]),
        ]
        .into_iter()
        .collect();

        Self {
            allowed_elements: ["audio", "embed", "iframe", "source", "video"]
                .into_iter()
                .collect(),
            allowed_attributes,
            forced_attributes: [(
                "iframe",
                &[(
                    "sandbox",
                    "allow-scripts allow-same-origin allow-popups allow-popups-to-escape-sandbox allow-forms",
                )] as &[(&str, &str)],
            )]
            .into_iter()
            .collect(),
            allowed_protocols: [
                (("embed", "src"), HTTP_PROTOCOLS),
                (("iframe", "src"), HTTP_PROTOCOLS),
                (("source", "src"), HTTP_PROTOCOLS),
            ]
            .into_iter()
            .collect(),
            downgrades: HashMap::new(),
            transformers: Vec::new(),
            link_protocols: HTTP_PROTOCOLS,
        }
    }

    pub(crate) fn has_transformer(&self, transformer: Transformer) -> bool {
        self.transformers.contains(&transformer)
    }
}
