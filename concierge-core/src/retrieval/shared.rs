use std::sync::{Arc, RwLock};

use crate::retrieval::index::Index;

/// Live index slot. Readers clone the current `Arc` and search without holding
/// the lock; a rebuild is built elsewhere and published in one swap.
#[derive(Debug, Default)]
pub struct SharedIndex {
    slot: RwLock<Option<Arc<Index>>>,
}

impl SharedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(index: Index) -> Self {
        Self {
            slot: RwLock::new(Some(Arc::new(index))),
        }
    }

    pub fn current(&self) -> Option<Arc<Index>> {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Publish a fully built index; returns the one it replaced.
    pub fn publish(&self, index: Index) -> Option<Arc<Index>> {
        let next = Arc::new(index);
        let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
        tracing::info!(fingerprint = next.fingerprint(), "publishing retrieval index");
        guard.replace(next)
    }

    pub fn clear(&self) -> Option<Arc<Index>> {
        self.slot.write().unwrap_or_else(|e| e.into_inner()).take()
    }

    pub fn is_ready(&self) -> bool {
        self.current().is_some()
    }
}
