//! Byte loaders: where template source comes from.
//!
//! The manager hands every loader a physical path (base path + logical path) and expects raw
//! bytes back. Loaders must be deterministic for the manager's lifetime; there is no
//! invalidation protocol, so a cached fragment is never reloaded.
//!
//! Provided implementations:
//! - [`FsLoader`]: reads from disk
//! - [`MemoryLoader`]: serves a fixed in-memory map (embedded assets, tests)
//! - [`CountingLoader`]: wraps another loader and counts invocations
//!
//! Any `Fn(&Path) -> Result<Vec<u8>, BoxError>` closure is also a loader.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::BoxError;

/// Translates a physical path into template source bytes.
pub trait Loader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<u8>, BoxError>;
}

impl<F> Loader for F
where
    F: Fn(&Path) -> Result<Vec<u8>, BoxError> + Send + Sync,
{
    fn load(&self, path: &Path) -> Result<Vec<u8>, BoxError> {
        self(path)
    }
}

/// Reads templates from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl Loader for FsLoader {
    fn load(&self, path: &Path) -> Result<Vec<u8>, BoxError> {
        Ok(std::fs::read(path)?)
    }
}

/// Serves templates from an in-memory map keyed by physical path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file. Intended for setup, before the loader is handed to a manager.
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl Loader for MemoryLoader {
    fn load(&self, path: &Path) -> Result<Vec<u8>, BoxError> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
            .into()
        })
    }
}

/// Decorator that counts how many times the inner loader was called.
///
/// Counting happens before delegation, so failed loads are counted too.
#[derive(Debug, Default)]
pub struct CountingLoader<L> {
    inner: L,
    calls: AtomicUsize,
}

impl<L> CountingLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `load` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<L: Loader> Loader for CountingLoader<L> {
    fn load(&self, path: &Path) -> Result<Vec<u8>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(path = %path.display(), "loader invoked");
        self.inner.load(path)
    }
}
