//! Parsed-fragment cache.
//!
//! Maps a normalized logical path to its compiled [`Fragment`]. Entries are never invalidated:
//! template content is assumed immutable once loaded. Reads take a shared lock; the lock is
//! never held while loading or parsing, so two callers missing on the same key may both compile
//! it. The last write wins, which is harmless because both trees are equivalent.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

use crate::fragment::Fragment;

/// Shared handle to a compiled fragment.
pub type Tree = Arc<Fragment>;

#[derive(Debug, Default)]
pub struct TreeCache {
    entries: RwLock<HashMap<String, Tree>>,
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Tree> {
        read(&self.entries, "get").get(key).cloned()
    }

    pub fn insert(&self, key: String, tree: Tree) {
        write(&self.entries, "insert").insert(key, tree);
    }

    pub fn len(&self) -> usize {
        read(&self.entries, "len").len()
    }
}

// Trees are inserted whole, so a poisoned map is still consistent.
fn read<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockReadGuard<'a, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(op, lock_kind = "rwlock.read", "Recovered from poisoned template cache lock");
            poisoned.into_inner()
        }
    }
}

fn write<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(op, lock_kind = "rwlock.write", "Recovered from poisoned template cache lock");
            poisoned.into_inner()
        }
    }
}
