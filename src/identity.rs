use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use uuid::Uuid;

pub mod keys {
    pub const SESSION_ID: &str = "session_id";
    pub const USER_ID: &str = "user_id";
    pub const FLOW_HASH: &str = "flow_hash";
    pub const TRAFFIC_SOURCE: &str = "traffic_source";
    pub const UTM_MEDIUM: &str = "utm_medium";
    pub const UTM_CAMPAIGN: &str = "utm_campaign";
    pub const LANDING_PAGE: &str = "landing_page";
    pub const ENTRY_POINT: &str = "entry_point";
    pub const USER_EMAIL: &str = "user_email";
    pub const USER_NAME: &str = "user_name";
}

/// Per-browser string storage. Values never expire.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);

    /// Non-empty value for `key`, if any.
    fn get_present(&self, key: &str) -> Option<String> {
        self.get(key).filter(|value| !value.is_empty())
    }
}

/// In-process store. Clones share the same map, so two "page loads" built
/// from clones of one store see the same browser.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub session_id: String,
    pub user_id: String,
    pub flow_hash: String,
}

impl Identity {
    /// Loads the three identifiers, generating and persisting any that are
    /// missing. Existing values are never replaced.
    pub fn bootstrap(store: &mut impl KeyValueStore) -> Self {
        Self {
            session_id: ensure_token(store, keys::SESSION_ID),
            user_id: ensure_token(store, keys::USER_ID),
            flow_hash: ensure_token(store, keys::FLOW_HASH),
        }
    }
}

fn ensure_token(store: &mut impl KeyValueStore, key: &str) -> String {
    if let Some(existing) = store.get_present(key) {
        return existing;
    }
    let token = Uuid::new_v4().to_string();
    store.set(key, &token);
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_is_idempotent() {
        let mut store = MemoryStore::new();
        let first = Identity::bootstrap(&mut store);
        let second = Identity::bootstrap(&mut store);
        assert_eq!(first, second);
    }

    #[test]
    fn bootstrap_generates_dashed_tokens() {
        let mut store = MemoryStore::new();
        let identity = Identity::bootstrap(&mut store);
        for token in [&identity.session_id, &identity.user_id, &identity.flow_hash] {
            assert_eq!(token.len(), 36);
            assert_eq!(token.matches('-').count(), 4);
        }
        assert_ne!(identity.session_id, identity.user_id);
        assert_eq!(store.get(keys::FLOW_HASH).as_deref(), Some(identity.flow_hash.as_str()));
    }

    #[test]
    fn bootstrap_keeps_existing_values() {
        let mut store = MemoryStore::new();
        store.set(keys::SESSION_ID, "existing-session");

        let identity = Identity::bootstrap(&mut store);
        assert_eq!(identity.session_id, "existing-session");
        assert_eq!(identity.user_id.len(), 36);
    }

    #[test]
    fn cleared_store_gets_new_identity() {
        let mut store = MemoryStore::new();
        let first = Identity::bootstrap(&mut store);
        store.clear();
        let second = Identity::bootstrap(&mut store);
        assert_ne!(first.session_id, second.session_id);
    }

    #[test]
    fn clones_share_storage() {
        let mut first_tab = MemoryStore::new();
        let mut second_tab = first_tab.clone();
        let a = Identity::bootstrap(&mut first_tab);
        let b = Identity::bootstrap(&mut second_tab);
        assert_eq!(a, b);
    }
}
