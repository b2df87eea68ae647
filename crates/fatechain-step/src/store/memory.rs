use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use fatechain_core::OperationId;

use super::{ChainStore, StoreError};
use crate::record::ChainRecord;

/// Chain store kept in process memory. Nothing survives a restart.
#[derive(Debug)]
pub struct MemoryChainStore<S> {
    inner: Mutex<Inner<S>>,
}

#[derive(Debug)]
struct Inner<S> {
    next_id: u64,
    chains: BTreeMap<OperationId, ChainRecord<S>>,
}

impl<S> MemoryChainStore<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                chains: BTreeMap::new(),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<S>>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl<S> Default for MemoryChainStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ChainStore<S> for MemoryChainStore<S>
where
    S: Clone + Send,
{
    fn create(&self, first: S) -> Result<OperationId, StoreError> {
        let mut inner = self.lock()?;
        let id = OperationId::new(inner.next_id);
        inner.next_id += 1;
        inner.chains.insert(id, ChainRecord::new(id, first));
        Ok(id)
    }

    fn load(&self, id: OperationId) -> Result<ChainRecord<S>, StoreError> {
        self.lock()?
            .chains
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn save(&self, record: &ChainRecord<S>) -> Result<(), StoreError> {
        self.lock()?.chains.insert(record.id, record.clone());
        Ok(())
    }

    fn remove(&self, id: OperationId) -> Result<(), StoreError> {
        self.lock()?.chains.remove(&id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<OperationId>, StoreError> {
        Ok(self.lock()?.chains.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ChainStatus;

    #[test]
    fn create_allocates_increasing_ids() -> anyhow::Result<()> {
        let store = MemoryChainStore::new();

        let a = store.create("a")?;
        let b = store.create("b")?;

        assert!(a < b);
        assert_eq!(store.list()?, vec![a, b]);
        Ok(())
    }

    #[test]
    fn save_replaces_record() -> anyhow::Result<()> {
        let store = MemoryChainStore::new();
        let id = store.create("a")?;
        let mut record = store.load(id)?;
        record.status = ChainStatus::InProgress;
        record.stack.push("b");

        store.save(&record)?;

        let loaded = store.load(id)?;
        assert_eq!(loaded.status, ChainStatus::InProgress);
        assert_eq!(loaded.stack, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn load_unknown_is_not_found() {
        let store: MemoryChainStore<&str> = MemoryChainStore::new();

        let err = store.load(OperationId::new(99)).expect_err("should fail");

        assert!(matches!(err, StoreError::NotFound(id) if id == OperationId::new(99)));
    }

    #[test]
    fn remove_is_idempotent() -> anyhow::Result<()> {
        let store = MemoryChainStore::new();
        let id = store.create("a")?;

        store.remove(id)?;
        store.remove(id)?;

        assert!(store.list()?.is_empty());
        Ok(())
    }
}
