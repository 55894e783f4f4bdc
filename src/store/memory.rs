//! In-memory NodeRecord store

use super::{NodeRecord, NodeRecordStore};
use crate::error::StorageError;
use crate::types::NodeId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-local record store. Ids are a monotonic counter.
pub struct MemoryRecordStore {
    records: RwLock<HashMap<NodeId, NodeRecord>>,
    next: AtomicU64,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            next: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRecordStore for MemoryRecordStore {
    fn get(&self, node_id: &NodeId) -> Result<Option<NodeRecord>, StorageError> {
        Ok(self.records.read().get(node_id).cloned())
    }

    fn put(&self, record: &NodeRecord) -> Result<(), StorageError> {
        self.records
            .write()
            .insert(record.node_id.clone(), record.clone());
        Ok(())
    }

    fn remove(&self, node_id: &NodeId) -> Result<(), StorageError> {
        self.records.write().remove(node_id);
        Ok(())
    }

    fn next_id(&self) -> Result<NodeId, StorageError> {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(NodeId::new(format!("mem-{}", id)))
    }
}
