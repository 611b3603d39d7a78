//! Per-render configuration.

use crate::account::Account;

/// Options for one render call.
///
/// With a non-empty `preloaded_accounts` list, mention resolution is purely
/// local: no context lookup happens, and same-username collisions in the
/// list force mentions to display their full handle.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Split paragraphs on blank lines and turn single newlines into
    /// `<br />`.
    pub multiline: bool,
    /// Always display mentions as `user@domain`.
    pub with_domains: bool,
    /// Add `me` to the rel of rendered links, for rel-me verification.
    pub with_rel_me: bool,
    pub preloaded_accounts: Vec<Account>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            multiline: true,
            with_domains: false,
            with_rel_me: false,
            preloaded_accounts: Vec::new(),
        }
    }
}

impl RenderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    #[must_use]
    pub fn with_domains(mut self, with_domains: bool) -> Self {
        self.with_domains = with_domains;
        self
    }

    #[must_use]
    pub fn with_rel_me(mut self, with_rel_me: bool) -> Self {
        self.with_rel_me = with_rel_me;
        self
    }

    #[must_use]
    pub fn preloaded_accounts(mut self, accounts: Vec<Account>) -> Self {
        self.preloaded_accounts = accounts;
        self
    }
}
