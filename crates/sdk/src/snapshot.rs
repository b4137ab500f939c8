use std::sync::{Arc, PoisonError, RwLock};

/// A sequence that is only ever replaced as a whole.
///
/// Readers get a shared handle to one complete version; a replacement never
/// becomes partially visible.
#[derive(Debug)]
pub struct SnapshotCell<T> {
    inner: RwLock<Inner<T>>,
}

#[derive(Debug)]
struct Inner<T> {
    items: Arc<[T]>,
    loaded: bool,
}

impl<T> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                items: Arc::from(Vec::new()),
                loaded: false,
            }),
        }
    }
}

impl<T> SnapshotCell<T> {
    /// Get the current version.
    pub fn get(&self) -> Arc<[T]> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .clone()
    }

    /// Returns whether a version has ever been stored.
    pub fn is_loaded(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .loaded
    }

    /// Replace the current version.
    pub fn replace(&self, items: Vec<T>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *inner = Inner {
            items: items.into(),
            loaded: true,
        };
    }
}
