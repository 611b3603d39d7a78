//! Single-pass tag expansion with per-tag fault isolation.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::tags::{self, MAX_SIZE_PX, ParamRule, TagSpec};

/// Nesting limit; deeper trees are treated as ambiguous markup.
const MAX_DEPTH: usize = 32;

static COLOR_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").expect("invalid color regex"));
static COLOR_HEX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{6}$").expect("invalid colorhex regex"));
static SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,3}$").expect("invalid size regex"));
static LINK_URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:https?|ftp)://.+$").expect("invalid url param regex"));

/// Error returned when tag expansion cannot complete.
#[derive(Debug, thiserror::Error)]
pub enum ExpansionError {
    /// Tag nesting exceeds the supported depth.
    #[error("markup nesting exceeds {MAX_DEPTH} levels")]
    NestingTooDeep,
}

/// Expand bracket tags in already-escaped HTML.
///
/// Tags with invalid parameters, missing close tags, or unknown names are
/// left as literal text. Bodies are expanded recursively, except for tags
/// whose body is literal (`code`).
pub fn expand(html: &str) -> Result<String, ExpansionError> {
    expand_fragment(html, 0)
}

/// Infallible wrapper around [`expand`].
///
/// On expansion failure the pre-expansion input is returned unchanged, so a
/// single malformed tag can never abort rendering of the whole document.
#[must_use]
pub fn expand_or_original(html: &str) -> String {
    match expand(html) {
        Ok(expanded) => expanded,
        Err(err) => {
            debug!(error = %err, "markup expansion failed, keeping input unchanged");
            html.to_owned()
        }
    }
}

fn expand_fragment(input: &str, depth: usize) -> Result<String, ExpansionError> {
    if depth >= MAX_DEPTH {
        return Err(ExpansionError::NestingTooDeep);
    }

    // ASCII lowercasing preserves byte offsets, so scans over `lower` index
    // directly into `input`.
    let lower = input.to_ascii_lowercase();
    let mut out = String::with_capacity(input.len() + 16);
    let mut i = 0;

    while let Some(rel) = input[i..].find('[') {
        let at = i + rel;
        out.push_str(&input[i..at]);
        match expand_tag_at(input, &lower, at, depth)? {
            Some((html, next)) => {
                out.push_str(&html);
                i = next;
            }
            None => {
                // Not an expandable tag here; emit the bracket and rescan.
                out.push('[');
                i = at + 1;
            }
        }
    }

    out.push_str(&input[i..]);
    Ok(out)
}

/// Try to expand the tag opening at byte offset `at`.
///
/// Returns `Ok(Some((html, next)))` on success, `Ok(None)` when the tag must
/// stay literal.
fn expand_tag_at(
    input: &str,
    lower: &str,
    at: usize,
    depth: usize,
) -> Result<Option<(String, usize)>, ExpansionError> {
    let Some(open) = parse_open_tag(&lower[at..]) else {
        return Ok(None);
    };
    let Some(spec) = tags::find(open.name) else {
        return Ok(None);
    };

    let body_start = at + open.len;
    let Some(close_start) = find_matching_close(lower, body_start, open.name) else {
        return Ok(None);
    };

    // A close tag on the other side of a paragraph break would expand
    // into misnested block HTML. Such tags stay literal.
    if lower[body_start..close_start].contains("</p>") {
        return Ok(None);
    }

    // Parameter text is taken from the original input to preserve case.
    let param = open
        .param
        .map(|(start, end)| &input[at + start..at + end]);
    let Some(param) = validate_param(spec, param) else {
        return Ok(None);
    };

    let body = &input[body_start..close_start];
    if spec.requires_body && body.trim().is_empty() {
        return Ok(None);
    }

    let inner = if spec.literal_body {
        body.to_owned()
    } else {
        expand_fragment(body, depth + 1)?
    };

    let mut html = String::new();
    html.push_str(&spec.open.replace("{param}", &param));
    html.push_str(&inner);
    html.push_str(spec.close);

    let next = close_start + open.name.len() + 3; // "[/name]"
    Ok(Some((html, next)))
}

struct OpenTag<'a> {
    /// Lowercase tag name.
    name: &'a str,
    /// Parameter byte range relative to the `[`.
    param: Option<(usize, usize)>,
    /// Byte length of the whole open tag including brackets.
    len: usize,
}

/// Parse `[name]` or `[name=param]` at the start of `s`.
fn parse_open_tag(s: &str) -> Option<OpenTag<'_>> {
    let rest = &s[1..];
    let name_len = rest.bytes().take_while(u8::is_ascii_alphabetic).count();
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];

    match rest.as_bytes().get(name_len)? {
        b']' => Some(OpenTag {
            name,
            param: None,
            len: name_len + 2,
        }),
        b'=' => {
            let value_start = 1 + name_len + 1;
            let close = s[value_start..].find([']', '['])?;
            if s.as_bytes()[value_start + close] != b']' || close == 0 {
                return None;
            }
            Some(OpenTag {
                name,
                param: Some((value_start, value_start + close)),
                len: value_start + close + 1,
            })
        }
        _ => None,
    }
}

/// Find the `[/name]` matching the open tag, tracking same-name nesting.
fn find_matching_close(lower: &str, body_start: usize, name: &str) -> Option<usize> {
    let close_token = format!("[/{name}]");
    let mut nesting = 1_usize;
    let mut pos = body_start;

    loop {
        let rel = lower[pos..].find('[')?;
        let j = pos + rel;
        if lower[j..].starts_with(&close_token) {
            nesting -= 1;
            if nesting == 0 {
                return Some(j);
            }
            pos = j + close_token.len();
        } else if opens_same_tag(&lower[j..], name) {
            nesting += 1;
            pos = j + 1;
        } else {
            pos = j + 1;
        }
    }
}

/// True when `s` starts with `[name]` or `[name=`.
fn opens_same_tag(s: &str, name: &str) -> bool {
    let Some(rest) = s.strip_prefix('[') else {
        return false;
    };
    let Some(after) = rest.strip_prefix(name) else {
        return false;
    };
    matches!(after.as_bytes().first(), Some(b']' | b'='))
}

/// Validate the parameter against the tag's grammar.
///
/// Returns the parameter text to substitute into the template, or `None`
/// when the tag must stay literal.
fn validate_param(spec: &TagSpec, param: Option<&str>) -> Option<String> {
    match &spec.rule {
        ParamRule::Forbidden => match param {
            None => Some(String::new()),
            Some(_) => None,
        },
        ParamRule::ColorName => param
            .filter(|p| COLOR_NAME_PATTERN.is_match(p))
            .map(str::to_owned),
        ParamRule::ColorHex => param
            .filter(|p| COLOR_HEX_PATTERN.is_match(p))
            .map(str::to_owned),
        ParamRule::Size => {
            let p = param?;
            if !SIZE_PATTERN.is_match(p) {
                return None;
            }
            let n: u32 = p.parse().ok()?;
            (1..=MAX_SIZE_PX).contains(&n).then(|| n.to_string())
        }
        ParamRule::Enumerated(values) => {
            let folded = param?.to_ascii_lowercase();
            values.contains(&folded.as_str()).then_some(folded)
        }
        ParamRule::LinkUrl => {
            let p = param?;
            LINK_URL_PATTERN
                .is_match(p)
                .then(|| p.replace('"', "&quot;"))
        }
    }
}
