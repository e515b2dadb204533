// SPDX-License-Identifier: MIT

//! Session Cache (C6): persists the raw OID→value map and reconstructed
//! model across requests, keyed by (user-session, switch-id), so a
//! connector doesn't re-walk a switch on every call (§4.6). Persistence
//! is via an opaque key-value store the host supplies; this crate never
//! shares a slice across sessions.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::DeviceModel;
use crate::oid::Oid;
use crate::snmp::value::SnmpValue;
use crate::snmp::BranchTiming;

/// Everything one (user-session, switch-id) pair needs to avoid a
/// re-walk: the raw wire data behind the model, the model itself, and
/// bookkeeping about when and how it was built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSlice {
    pub switch_id: String,
    pub raw: BTreeMap<Oid, SnmpValue>,
    pub model: DeviceModel,
    pub last_walk_duration: Duration,
    pub hardware_loaded: bool,
    pub timing: HashMap<String, BranchTiming>,
}

impl CacheSlice {
    pub fn new(switch_id: impl Into<String>, model: DeviceModel) -> Self {
        CacheSlice {
            switch_id: switch_id.into(),
            raw: BTreeMap::new(),
            model,
            last_walk_duration: Duration::ZERO,
            hardware_loaded: false,
            timing: HashMap::new(),
        }
    }
}

/// Opaque key-value contract the host implements; this crate only ever
/// stores one `CacheSlice` per session key.
pub trait SessionStore: Send + Sync {
    fn get(&self, session_key: &str) -> Option<CacheSlice>;
    fn put(&self, session_key: &str, slice: CacheSlice);
    fn clear(&self, session_key: &str);
}

/// Restores `slice` only if it matches `switch_id`; a non-matching
/// switch-id clears the session's cache instead of returning stale data
/// for the wrong device (§4.6).
pub fn restore_for_switch(store: &dyn SessionStore, session_key: &str, switch_id: &str) -> Option<CacheSlice> {
    let slice = store.get(session_key)?;
    if slice.switch_id != switch_id {
        store.clear(session_key);
        return None;
    }
    Some(slice)
}

/// An in-process `SessionStore` for tests and single-instance hosts; a
/// production host wraps its own store (redis, a database row, etc.)
/// behind the same trait instead.
#[derive(Default)]
pub struct InMemorySessionStore {
    slices: std::sync::Mutex<HashMap<String, CacheSlice>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_key: &str) -> Option<CacheSlice> {
        self.slices.lock().expect("session store mutex poisoned").get(session_key).cloned()
    }

    fn put(&self, session_key: &str, slice: CacheSlice) {
        self.slices.lock().expect("session store mutex poisoned").insert(session_key.to_string(), slice);
    }

    fn clear(&self, session_key: &str) {
        self.slices.lock().expect("session store mutex poisoned").remove(session_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restores_matching_switch_id() {
        let store = InMemorySessionStore::new();
        store.put("sess1", CacheSlice::new("switch-a", DeviceModel::new()));

        let restored = restore_for_switch(&store, "sess1", "switch-a");
        assert!(restored.is_some());
    }

    #[test]
    fn clears_cache_on_switch_id_mismatch() {
        let store = InMemorySessionStore::new();
        store.put("sess1", CacheSlice::new("switch-a", DeviceModel::new()));

        let restored = restore_for_switch(&store, "sess1", "switch-b");
        assert!(restored.is_none());
        assert!(store.get("sess1").is_none());
    }

    #[test]
    fn missing_session_returns_none_without_panicking() {
        let store = InMemorySessionStore::new();
        assert!(restore_for_switch(&store, "no-such-session", "switch-a").is_none());
    }
}
