//! Cached copies of backend-owned collections and records.
//!
//! A store is written only by the sync action that owns it, and always as
//! a whole-value replacement. Readers take a snapshot or subscribe for
//! re-rendering.
//!
//! Overlapping fetches for the same store are not sequenced: whichever
//! response resolves last is what the cache holds.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug)]
pub struct ResourceStore<T> {
    sender: watch::Sender<Arc<T>>,
}

impl<T: Default> Default for ResourceStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> ResourceStore<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self { sender }
    }

    /// The current cache. May be stale until the next fetch.
    #[must_use]
    pub fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.sender.borrow())
    }

    /// Receiver notified on every replacement.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<T>> {
        self.sender.subscribe()
    }

    /// Swap in a freshly fetched value.
    pub(crate) fn replace(&self, value: T) {
        self.sender.send_replace(Arc::new(value));
    }
}
