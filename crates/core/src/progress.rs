//! Acquired-item tracking.

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    datasets::ItemCatalog,
    error::{StoreError, TrackerError},
    store::{read_json, write_json, KeyValueStore, ACQUIRED_ITEMS_KEY},
};

/// Record keys the user has marked as owned.
///
/// Persisted as a JSON object of `key → true`. Unmarking removes the key, so
/// a double toggle restores the previous stored value exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcquiredSet {
    flags: BTreeMap<String, bool>,
}

impl AcquiredSet {
    /// Whether `key` is marked; unknown keys are not.
    pub fn is_acquired(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    /// Flip the mark on `key` and return the new state.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.flags.remove(key).unwrap_or(false) {
            false
        } else {
            self.flags.insert(key.to_string(), true);
            true
        }
    }

    /// Number of marked keys.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether nothing is marked.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Marked keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    /// Completion over `keys`; marks for keys outside `keys` are ignored.
    pub fn progress<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Progress {
        let mut total = 0;
        let mut acquired = 0;
        for key in keys {
            total += 1;
            if self.is_acquired(key) {
                acquired += 1;
            }
        }
        Progress::new(acquired, total)
    }

    fn normalized(mut self) -> Self {
        self.flags.retain(|_, owned| *owned);
        self
    }
}

/// Completion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Records marked as acquired.
    pub acquired: usize,
    /// Records in the catalog.
    pub total: usize,
    /// `round(100 * acquired / total)`, 0 for an empty catalog.
    pub percent: u8,
}

impl Progress {
    /// Compute the percentage for `acquired` of `total`.
    pub fn new(acquired: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            ((acquired as f64 / total as f64) * 100.0).round() as u8
        };
        Self {
            acquired,
            total,
            percent,
        }
    }
}

/// [`AcquiredSet`] backed by a key-value store, written on every toggle.
pub struct AcquiredTracker {
    store: Arc<dyn KeyValueStore>,
    set: AcquiredSet,
}

impl AcquiredTracker {
    /// Read the stored set. An unreadable value is logged and treated as empty.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let set = match read_json::<AcquiredSet>(store.as_ref(), ACQUIRED_ITEMS_KEY) {
            Ok(Some(set)) => set.normalized(),
            Ok(None) => AcquiredSet::default(),
            Err(err) => {
                warn!(%err, "discarding unreadable acquired items");
                AcquiredSet::default()
            }
        };
        Self { store, set }
    }

    /// Current marks.
    pub fn set(&self) -> &AcquiredSet {
        &self.set
    }

    /// Whether `key` is marked.
    pub fn is_acquired(&self, key: &str) -> bool {
        self.set.is_acquired(key)
    }

    /// Flip the mark on an item of `catalog` and persist immediately.
    ///
    /// The in-memory set is left unchanged if persisting fails.
    pub fn toggle(&mut self, catalog: &ItemCatalog, key: &str) -> Result<bool, TrackerError> {
        if !catalog.contains(key) {
            return Err(TrackerError::UnknownKey(key.to_string()));
        }
        let acquired = self.set.toggle(key);
        if let Err(err) = self.persist() {
            self.set.toggle(key);
            return Err(err.into());
        }
        info!(key, acquired, "toggled acquired item");
        Ok(acquired)
    }

    /// Completion over the items of `catalog`.
    pub fn progress(&self, catalog: &ItemCatalog) -> Progress {
        self.set.progress(catalog.keys())
    }

    fn persist(&self) -> Result<(), StoreError> {
        write_json(self.store.as_ref(), ACQUIRED_ITEMS_KEY, &self.set)
    }
}
