//! Allowlist-based HTML sanitizer for the feditext rendering pipeline.
//!
//! A depth-first walk over a parsed node tree driven by a
//! [`SanitizePolicy`]: elements outside the allowlist are unwrapped (their
//! content is preserved), attributes outside the per-element allowlist are
//! dropped, forced attributes are set, and a fixed sequence of
//! [`Transformer`]s filters class lists, `translate` attributes, downgrades
//! unsupported elements and validates link protocols.
//!
//! Everything not explicitly permitted is discarded. Input that cannot be
//! parsed at all is returned fully escaped rather than passed through.
//!
//! # Example
//!
//! ```
//! use feditext_sanitize::{SanitizePolicy, sanitize};
//!
//! let html = r#"<a href="javascript:alert(1)">x</a>"#;
//! assert_eq!(sanitize(html, &SanitizePolicy::strict()), "x");
//! ```

mod escape;
mod policy;
mod sanitize;
mod tree;

pub use escape::escape_html;
pub use policy::{SanitizePolicy, Transformer};
pub use sanitize::sanitize;
pub use tree::SanitizeError;
