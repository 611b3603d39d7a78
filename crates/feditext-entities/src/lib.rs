//! Entity extraction for the feditext rendering pipeline.
//!
//! Scans raw status text and produces a set of non-overlapping, index-tagged
//! spans classified as URL, hashtag or mention. The extractor recognizes
//! exactly three token classes; it is not a general tokenizer and never
//! parses HTML.
//!
//! # Example
//!
//! ```
//! use feditext_entities::{EntityKind, extract};
//!
//! let entities = extract("hello @alice, see https://example.com #news");
//! assert_eq!(entities.len(), 3);
//! assert_eq!(entities[0].kind, EntityKind::Mention);
//! assert_eq!(entities[0].payload, "alice");
//! ```

mod entity;
mod extractor;

pub use entity::{Entity, EntityKind};
pub use extractor::extract;
