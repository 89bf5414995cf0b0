//! Process-wide map from normalized path to an exclusive lock. Every append or
//! read entry point in [`crate::transport::spool`] acquires the lock for its
//! path before touching the file, giving *at most one writer or at most one
//! reader active on a spool at any time* within this process.
//!
//! Entries are created on first request and never removed: path cardinality
//! in this harness is bounded by the fixed set of spool directories a run
//! touches, so the leak is an accepted tradeoff rather than an oversight.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;

static REGISTRY: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// A held lock on a single spool path. Dropping it releases the path for the
/// next acquirer.
pub struct PathLockGuard<'a> {
    _inner: MutexGuard<'a, ()>,
}

/// An owned handle to a path's lock, from which [`PathLockGuard`]s are taken.
#[derive(Clone)]
pub struct PathLock(Arc<Mutex<()>>);

impl PathLock {
    pub fn lock(&self) -> crate::error::Result<PathLockGuard<'_>> {
        let guard = self.0.lock()?;
        Ok(PathLockGuard { _inner: guard })
    }
}

/// Returns the (possibly newly created) lock handle for `path`.
///
/// `path` is normalized with `Path::to_path_buf` over whatever the caller
/// passes; callers are expected to pass the same logical path consistently
/// (this harness always derives spool paths from [`crate::config::StorageRoot`],
/// which is stable for the life of a process).
pub fn acquire(path: &Path) -> PathLock {
    let mut registry = REGISTRY.lock().unwrap_or_else(|poison| poison.into_inner());
    let entry = registry
        .entry(path.to_path_buf())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone();
    PathLock(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn same_path_returns_same_handle() {
        let a = acquire(Path::new("/tmp/hebench-test-path-a"));
        let b = acquire(Path::new("/tmp/hebench-test-path-a"));
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn distinct_paths_return_distinct_handles() {
        let a = acquire(Path::new("/tmp/hebench-test-path-b"));
        let b = acquire(Path::new("/tmp/hebench-test-path-c"));
        assert!(!Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn lock_serializes_concurrent_holders() {
        static ACTIVE: AtomicUsize = AtomicUsize::new(0);
        static MAX_ACTIVE: AtomicUsize = AtomicUsize::new(0);

        let path = Path::new("/tmp/hebench-test-path-serialize");
        let mut handles = Vec::new();
        for _ in 0..8 {
            let lock = acquire(path);
            handles.push(thread::spawn(move || {
                let _guard = lock.lock().unwrap();
                let now = ACTIVE.fetch_add(1, Ordering::SeqCst) + 1;
                MAX_ACTIVE.fetch_max(now, Ordering::SeqCst);
                thread::yield_now();
                ACTIVE.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(MAX_ACTIVE.load(Ordering::SeqCst), 1);
    }
}
