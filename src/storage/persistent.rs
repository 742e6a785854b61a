use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::foundation::error::{PlayerError, PlayerResult};

type Namespace = BTreeMap<String, JsonValue>;

/// Emulated on-device flash: JSON values keyed by string, one namespace per app identity.
///
/// Only the active namespace is visible. Entries survive reloads and restarts and are removed only
/// by [`PersistentStorage::wipe`], by setting a key to `null`, or by [`PersistentStorage::import`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersistentStorage {
    namespaces: BTreeMap<String, Namespace>,
    active: Option<String>,
}

impl PersistentStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the visible namespace without touching any entries.
    pub fn set_namespace(&mut self, identity: impl Into<String>) {
        self.active = Some(identity.into());
    }

    /// Identity of the visible namespace.
    pub fn namespace(&self) -> Option<&str> {
        self.active.as_deref()
    }

    fn active(&self) -> Option<&Namespace> {
        self.active.as_ref().and_then(|id| self.namespaces.get(id))
    }

    /// Value for `key`, or `default` when absent.
    pub fn get(&self, key: &str, default: JsonValue) -> JsonValue {
        self.active()
            .and_then(|ns| ns.get(key))
            .cloned()
            .unwrap_or(default)
    }

    /// Store `value` under `key`; `null` deletes the key.
    pub fn set(&mut self, key: &str, value: JsonValue) -> PlayerResult<()> {
        let id = self
            .active
            .as_ref()
            .ok_or_else(|| PlayerError::runtime("storage used before a project was loaded"))?;
        if value.is_null() {
            if let Some(ns) = self.namespaces.get_mut(id) {
                ns.remove(key);
            }
            return Ok(());
        }
        self.namespaces
            .entry(id.clone())
            .or_default()
            .insert(key.to_owned(), value);
        Ok(())
    }

    /// Remove every entry of the active namespace.
    pub fn wipe(&mut self) {
        if let Some(id) = &self.active
            && let Some(ns) = self.namespaces.remove(id)
        {
            tracing::debug!(namespace = %id, entries = ns.len(), "storage wiped");
        }
    }

    /// Number of entries in the active namespace.
    pub fn len(&self) -> usize {
        self.active().map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every namespace as `{ identity: { key: value } }`.
    pub fn export(&self) -> JsonValue {
        serde_json::to_value(&self.namespaces).unwrap_or(JsonValue::Null)
    }

    /// Replace the whole store with a snapshot produced by [`PersistentStorage::export`].
    pub fn import(&mut self, snapshot: JsonValue) -> PlayerResult<()> {
        let namespaces: BTreeMap<String, Namespace> = serde_json::from_value(snapshot)
            .map_err(|e| PlayerError::runtime(format!("invalid storage snapshot: {e}")))?;
        self.namespaces = namespaces
            .into_iter()
            .map(|(id, ns)| (id, ns.into_iter().filter(|(_, v)| !v.is_null()).collect()))
            .collect();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/storage/persistent.rs"]
mod tests;
