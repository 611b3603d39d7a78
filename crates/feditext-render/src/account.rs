//! Account references and the collaborator interface.
//!
//! The pipeline does not own account storage. Callers hand it either a
//! preloaded list of [`Account`]s or a [`RenderContext`] that can look
//! handles up on demand.

/// A resolved account reference.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Account {
    pub username: String,
    /// `None` for accounts on the local instance.
    pub domain: Option<String>,
    /// Profile URL used as the mention anchor target.
    pub url: String,
}

impl Account {
    pub fn local(username: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            domain: None,
            url: url.into(),
        }
    }

    pub fn remote(
        username: impl Into<String>,
        domain: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            domain: Some(domain.into()),
            url: url.into(),
        }
    }

    /// `username` for local accounts, `username@domain` for remote ones.
    #[must_use]
    pub fn pretty_handle(&self) -> String {
        match &self.domain {
            Some(domain) => format!("{}@{domain}", self.username),
            None => self.username.clone(),
        }
    }
}

/// Collaborators the pipeline consults while rendering.
///
/// Implementations must not panic; a lookup that cannot complete should
/// return `None` so the mention degrades to literal text.
pub trait RenderContext {
    /// Look an account up by handle. `domain` is `None` for local accounts.
    fn account_lookup(&self, username: &str, domain: Option<&str>) -> Option<Account>;

    /// Whether `domain` names this instance itself.
    fn is_local_domain(&self, domain: &str) -> bool;

    /// URL of the page listing statuses for a hashtag.
    fn tag_url(&self, hashtag: &str) -> String;
}

/// Context with no account storage and no local domain.
///
/// Mentions render as literal text and hashtags link to a relative
/// `/tags/` path. Useful for previews and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullContext;

impl RenderContext for NullContext {
    fn account_lookup(&self, _username: &str, _domain: Option<&str>) -> Option<Account> {
        None
    }

    fn is_local_domain(&self, _domain: &str) -> bool {
        false
    }

    fn tag_url(&self, hashtag: &str) -> String {
        format!("/tags/{hashtag}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_handle() {
        assert_eq!(Account::local("alice", "/u/alice").pretty_handle(), "alice");
        assert_eq!(
            Account::remote("bob", "social.example", "https://social.example/@bob")
                .pretty_handle(),
            "bob@social.example"
        );
    }
}
