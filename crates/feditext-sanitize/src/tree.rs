//! HTML node tree: lenient parse and serialization.
//!
//! The sanitizer operates on a small element tree in the text/tail style:
//! a node's `text` is the content before its first child, and each child's
//! `tail` is the content between that child and the next sibling. HTML void
//! elements are normalized to self-closing form and named character entities
//! are mapped to Unicode before parsing, so well-formed pipeline output
//! round-trips exactly.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;

/// Error returned when HTML cannot be parsed into a tree.
#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    /// The input is not well-formed markup.
    #[error("malformed HTML: {0}")]
    Parse(#[from] quick_xml::Error),
}

/// HTML elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// An element node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Node {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in document order, keys lowercase.
    pub attrs: Vec<(String, String)>,
    /// Text before the first child.
    pub text: String,
    /// Text between this node's closing tag and the next sibling.
    pub tail: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing one in place.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attrs.iter_mut().find(|(key, _)| key == name) {
            entry.1 = value.to_owned();
        } else {
            self.attrs.push((name.to_owned(), value.to_owned()));
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(key, _)| key != name);
    }

    /// Concatenated text content of this node and its descendants.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }
}

fn collect_text(node: &Node, out: &mut String) {
    out.push_str(&node.text);
    for child in &node.children {
        collect_text(child, out);
        out.push_str(&child.tail);
    }
}

/// Pattern for void elements in any authoring form (`<br>`, `<br/>`, ...).
static VOID_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<(area|base|br|col|embed|hr|img|input|link|meta|param|source|track|wbr)(\s[^<>]*?)?\s*/?>",
    )
    .expect("invalid void element regex")
});

/// Pattern for named character entities.
static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([a-zA-Z]+);").expect("invalid entity regex"));

/// Parse an HTML fragment into a tree rooted at a synthetic `root` node.
///
/// # Errors
///
/// Returns an error when the fragment is not well-formed; the caller is
/// expected to fail closed (escape the input) in that case.
pub(crate) fn parse(html: &str) -> Result<Node, SanitizeError> {
    let html = convert_named_entities(html);
    let html = normalize_void_elements(&html);
    let wrapped = format!("<root>{html}</root>");

    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Node> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(node_from_start(&reader, &e)),
            Event::Empty(e) => {
                let node = node_from_start(&reader, &e);
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::Text(e) => {
                let text = decode_bytes(&reader, &e);
                if let Some(top) = stack.last_mut() {
                    append_text(top, &text);
                }
            }
            Event::GeneralRef(e) => {
                let entity = decode_bytes(&reader, &e);
                if let Some(top) = stack.last_mut() {
                    append_text(top, &decode_entity(&entity));
                }
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                if let Some(top) = stack.last_mut() {
                    append_text(top, &text);
                }
            }
            Event::End(_) => {
                let finished = stack.pop().unwrap_or_default();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(finished),
                    // The synthetic root closed.
                    None => return Ok(finished),
                }
            }
            Event::Eof => {
                // Unbalanced input; collapse what we have into the root.
                let mut node = stack.pop().unwrap_or_default();
                while let Some(mut parent) = stack.pop() {
                    parent.children.push(node);
                    node = parent;
                }
                return Ok(node);
            }
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }
}

fn node_from_start<R>(reader: &Reader<R>, e: &BytesStart<'_>) -> Node {
    let tag = reader
        .decoder()
        .decode(e.name().as_ref())
        .map_or_else(
            |_| String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            Cow::into_owned,
        )
        .to_ascii_lowercase();

    let mut attrs = Vec::new();
    for attr in e.html_attributes().flatten() {
        let key = reader
            .decoder()
            .decode(attr.key.as_ref())
            .map_or_else(
                |_| String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                Cow::into_owned,
            )
            .to_ascii_lowercase();
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            Cow::into_owned,
        );
        attrs.push((key, value));
    }

    Node {
        tag,
        attrs,
        ..Node::default()
    }
}

fn decode_bytes<R>(reader: &Reader<R>, bytes: &[u8]) -> String {
    reader.decoder().decode(bytes).map_or_else(
        |_| String::from_utf8_lossy(bytes).into_owned(),
        Cow::into_owned,
    )
}

/// Append text to the node's text or its last child's tail.
fn append_text(node: &mut Node, text: &str) {
    if let Some(last_child) = node.children.last_mut() {
        last_child.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}

/// Decode an entity reference to its character value.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        // Unknown entity, preserved as literal text.
        _ => format!("&{entity};"),
    }
}

/// Rewrite void elements to self-closing form so they parse as empty tags.
fn normalize_void_elements(html: &str) -> String {
    VOID_TAG_PATTERN
        .replace_all(html, |caps: &regex::Captures| {
            let attrs = caps.get(2).map_or("", |m| m.as_str());
            format!("<{}{} />", &caps[1], attrs)
        })
        .into_owned()
}

/// Convert named HTML entities to Unicode characters.
///
/// The five XML entities are preserved; anything else the parser would choke
/// on is mapped or left for [`decode_entity`] to neutralize.
fn convert_named_entities(html: &str) -> String {
    ENTITY_PATTERN
        .replace_all(html, |caps: &regex::Captures| {
            entity_to_unicode(&caps[1]).map_or_else(|| caps[0].to_owned(), str::to_owned)
        })
        .into_owned()
}

fn entity_to_unicode(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{00a0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "bull" => "\u{2022}",
        "hellip" => "\u{2026}",
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "middot" => "\u{00b7}",
        "times" => "\u{00d7}",
        "deg" => "\u{00b0}",
        // XML entities and anything unknown stay as-is.
        _ => return None,
    })
}

/// Serialize the children of a synthetic root node back to HTML.
pub(crate) fn serialize(root: &Node) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(&escape_text(&root.text));
    for child in &root.children {
        serialize_node(child, &mut out);
    }
    out
}

fn serialize_node(node: &Node, out: &mut String) {
    out.push('<');
    out.push_str(&node.tag);
    for (key, value) in &node.attrs {
        write!(out, r#" {key}="{}""#, escape_attr(value)).unwrap();
    }

    if node.is_void() {
        out.push_str(" />");
    } else {
        out.push('>');
        out.push_str(&escape_text(&node.text));
        for child in &node.children {
            serialize_node(child, out);
        }
        write!(out, "</{}>", node.tag).unwrap();
    }

    out.push_str(&escape_text(&node.tail));
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
