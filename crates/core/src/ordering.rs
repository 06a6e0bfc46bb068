//! Presentation ordering of cached collections.

/// How a fetched collection is ordered before it is cached.
///
/// The backend returns records in insertion order (oldest first). Lists
/// where recency matters are cached newest first; this is a presentation
/// contract of the client, not something the backend guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheOrdering {
    /// Keep the order the backend returned.
    #[default]
    AsReturned,
    /// Reverse the backend order.
    NewestFirst,
}

impl CacheOrdering {
    /// Apply this ordering to a freshly fetched collection.
    #[must_use]
    pub fn materialize<T>(self, mut items: Vec<T>) -> Vec<T> {
        if self == Self::NewestFirst {
            items.reverse();
        }
        items
    }
}
