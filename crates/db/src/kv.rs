//! The key-value store abstraction and its in-memory and overlay forms.

use std::collections::BTreeMap;

use parking_lot::RwLock;

/// A byte-oriented key-value store with ordered prefix iteration.
///
/// All methods take `&self`; implementations provide interior mutability.
/// The module runs inside a single-threaded block executor, so the locks are
/// uncontended and exist to make sharing a store handle across components
/// ergonomic.
pub trait Store: std::fmt::Debug {
    /// Returns the value stored under `key`.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Stores `value` under `key`, replacing any existing value.
    fn set(&self, key: &[u8], value: &[u8]);

    /// Removes `key` if present.
    fn delete(&self, key: &[u8]);

    /// Returns all entries whose key starts with `prefix`, in ascending key
    /// order. Keys are big-endian encoded so this equals numeric id order.
    fn scan_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;

    /// Whether `key` is present.
    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }
}

/// An in-memory store backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemStore {
    inner: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, used by tests.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl Store for MemStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.inner.read().get(key).cloned()
    }

    fn set(&self, key: &[u8], value: &[u8]) {
        self.inner.write().insert(key.to_vec(), value.to_vec());
    }

    fn delete(&self, key: &[u8]) {
        self.inner.write().remove(key);
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.inner
            .read()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// A write-buffering overlay over another store.
///
/// Writes and deletes collect in the overlay and only reach the parent on
/// [`CacheStore::commit`]; dropping the overlay discards them. Overlays nest,
/// which is how the distribute-claims sandbox reverts a whole sweep while the
/// enclosing handler's writes survive.
#[derive(Debug)]
pub struct CacheStore<'a> {
    parent: &'a dyn Store,
    /// `Some(value)` is a pending write, `None` a pending delete.
    overlay: RwLock<BTreeMap<Vec<u8>, Option<Vec<u8>>>>,
}

impl<'a> CacheStore<'a> {
    /// Wraps a parent store.
    pub fn wrap(parent: &'a dyn Store) -> Self {
        Self {
            parent,
            overlay: RwLock::new(BTreeMap::new()),
        }
    }

    /// Applies all buffered writes to the parent.
    pub fn commit(self) {
        for (key, entry) in self.overlay.into_inner() {
            match entry {
                Some(value) => self.parent.set(&key, &value),
                None => self.parent.delete(&key),
            }
        }
    }

    /// Number of buffered entries, used by tests.
    pub fn pending_writes(&self) -> usize {
        self.overlay.read().len()
    }
}

impl Store for CacheStore<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.overlay.read().get(key) {
            Some(entry) => entry.clone(),
            None => self.parent.get(key),
        }
    }

    fn set(&self, key: &[u8], value: &[u8]) {
        self.overlay
            .write()
            .insert(key.to_vec(), Some(value.to_vec()));
    }

    fn delete(&self, key: &[u8]) {
        self.overlay.write().insert(key.to_vec(), None);
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.scan_prefix(prefix).into_iter().collect();
        for (key, entry) in self
            .overlay
            .read()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            match entry {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        merged.into_iter().collect()
    }
}
