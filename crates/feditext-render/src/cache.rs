//! Handle-to-account lookup cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::account::Account;

type Key = (String, Option<String>);
type Slot = Arc<OnceLock<Option<Account>>>;

/// Concurrent cache over mention lookups.
///
/// Population is at-most-once per key: concurrent first accesses to a cold
/// key collapse to a single underlying lookup, with the losers blocking on
/// the winner's slot rather than fetching again. Negative results are
/// cached too, so an unresolvable handle is only looked up once.
#[derive(Debug, Default)]
pub struct MentionCache {
    slots: Mutex<HashMap<Key, Slot>>,
}

impl MentionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached account for `(username, domain)`, populating via
    /// `lookup` on first access.
    pub fn get_or_populate<F>(
        &self,
        username: &str,
        domain: Option<&str>,
        lookup: F,
    ) -> Option<Account>
    where
        F: FnOnce() -> Option<Account>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            let key = (username.to_owned(), domain.map(str::to_owned));
            Arc::clone(slots.entry(key).or_default())
        };

        // The map lock is released before the lookup runs, so a slow fetch
        // for one key never blocks access to other keys.
        slot.get_or_init(|| {
            tracing::debug!(username, domain, "looking up mention target");
            lookup()
        })
        .clone()
    }
}
