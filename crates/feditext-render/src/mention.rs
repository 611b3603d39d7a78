//! Mention resolution.
//!
//! A `@username@domain` token resolves, in order, to: a known external
//! platform rewrite, a preloaded account, a cached context lookup, or
//! nothing at all. Unresolved mentions render as literal text.

use crate::account::{Account, RenderContext};
use crate::cache::MentionCache;
use crate::options::RenderOptions;

/// External, non-federated services with special-cased mention rendering.
///
/// Mentions of these never hit account storage; the handle maps straight
/// to a profile URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KnownPlatform {
    Twitter,
    Tumblr,
    DeviantArt,
    ArtStation,
    GitHub,
    Instagram,
}

impl KnownPlatform {
    /// Match a mention domain against the fixed platform set.
    #[must_use]
    pub fn from_domain(domain: &str) -> Option<Self> {
        Some(match domain.to_ascii_lowercase().as_str() {
            "twitter.com" => Self::Twitter,
            "tumblr.com" => Self::Tumblr,
            "deviantart.com" => Self::DeviantArt,
            "artstation.com" => Self::ArtStation,
            "github.com" => Self::GitHub,
            "instagram.com" => Self::Instagram,
            _ => return None,
        })
    }

    /// The domain shown in the rendered handle.
    #[must_use]
    pub fn domain(self) -> &'static str {
        match self {
            Self::Twitter => "twitter.com",
            Self::Tumblr => "tumblr.com",
            Self::DeviantArt => "deviantart.com",
            Self::ArtStation => "artstation.com",
            Self::GitHub => "github.com",
            Self::Instagram => "instagram.com",
        }
    }

    /// Profile URL for `username` on this platform.
    #[must_use]
    pub fn profile_url(self, username: &str) -> String {
        match self {
            Self::Twitter => format!("https://twitter.com/{username}"),
            Self::Tumblr => format!("https://{username}.tumblr.com"),
            Self::DeviantArt => format!("https://{username}.deviantart.com"),
            Self::ArtStation => format!("https://www.artstation.com/{username}"),
            Self::GitHub => format!("https://github.com/{username}"),
            Self::Instagram => format!("https://www.instagram.com/{username}"),
        }
    }
}

/// What a mention token resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MentionTarget {
    /// An account on this instance.
    Local(Account),
    /// A federated account on another instance.
    Remote(Account),
    /// A handle on a fixed external platform.
    KnownPlatform(KnownPlatform, String),
    /// Nothing matched; the mention renders as literal text.
    Unresolved,
}

/// A resolved mention plus its display policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub target: MentionTarget,
    /// Another preloaded account shares this username under a different
    /// domain, so the mention must display its full handle.
    pub ambiguous: bool,
}

/// Resolve a mention token to a target.
///
/// With preloaded accounts the scan is purely local and also detects
/// same-username collisions; otherwise a single lookup goes through the
/// cache.
pub fn resolve(
    username: &str,
    domain: Option<&str>,
    options: &RenderOptions,
    context: &dyn RenderContext,
    cache: &MentionCache,
) -> Resolution {
    if let Some(domain) = domain {
        if let Some(platform) = KnownPlatform::from_domain(domain) {
            return Resolution {
                target: MentionTarget::KnownPlatform(platform, username.to_owned()),
                ambiguous: false,
            };
        }
    }

    // A mention of `user@our.domain` is a local mention.
    let domain = domain.filter(|d| !context.is_local_domain(d));

    let mut ambiguous_hits = 0;
    let mut account = None;

    if options.preloaded_accounts.is_empty() {
        account = cache.get_or_populate(username, domain, || {
            context.account_lookup(username, domain)
        });
    } else {
        for candidate in &options.preloaded_accounts {
            if !candidate.username.eq_ignore_ascii_case(username) {
                continue;
            }
            let same_domain = match (candidate.domain.as_deref(), domain) {
                (None, None) => true,
                (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                _ => false,
            };
            if same_domain {
                account = Some(candidate.clone());
            } else {
                ambiguous_hits += 1;
            }
        }
    }

    let target = match account {
        None => MentionTarget::Unresolved,
        Some(account) if account.domain.is_none() => MentionTarget::Local(account),
        Some(account) => MentionTarget::Remote(account),
    };

    Resolution {
        target,
        ambiguous: ambiguous_hits > 0,
    }
}
