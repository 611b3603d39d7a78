//! Bracket-tag markup expansion for the feditext rendering pipeline.
//!
//! Expands a fixed set of bracket tags (`[b]`, `[i]`, `[color=red]`, ...)
//! into HTML spans. The input is already-escaped HTML produced by the
//! rewrite stage, so bracket characters in it are always literal text.
//!
//! Every tag's parameter grammar is validated independently: an invalid
//! parameter leaves that tag unexpanded as literal text, and any internal
//! failure falls back to returning the pre-expansion input unchanged via
//! [`expand_or_original`]. Expansion never produces a hard failure for
//! malformed user input.
//!
//! # Example
//!
//! ```
//! use feditext_markup::expand_or_original;
//!
//! assert_eq!(expand_or_original("[b]hi[/b]"), "<b>hi</b>");
//! assert_eq!(
//!     expand_or_original("[spin=sideways]x[/spin]"),
//!     "[spin=sideways]x[/spin]"
//! );
//! ```

mod expander;
mod tags;

pub use expander::{ExpansionError, expand, expand_or_original};
