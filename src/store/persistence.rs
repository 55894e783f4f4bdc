//! Sled-backed NodeRecord store
//!
//! One bincode-encoded record per node in the `nodes` tree, keyed by node id.

use super::{NodeRecord, NodeRecordStore};
use crate::error::StorageError;
use crate::types::NodeId;
use std::path::Path;

pub struct SledNodeRecordStore {
    db: sled::Db,
    nodes: sled::Tree,
}

impl SledNodeRecordStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let nodes = db.open_tree("nodes")?;
        Ok(Self { db, nodes })
    }

    /// Number of stored records, the virtual root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl NodeRecordStore for SledNodeRecordStore {
    fn get(&self, node_id: &NodeId) -> Result<Option<NodeRecord>, StorageError> {
        match self.nodes.get(node_id.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put(&self, record: &NodeRecord) -> Result<(), StorageError> {
        let bytes = bincode::serialize(record)?;
        self.nodes
            .insert(record.node_id.as_str().as_bytes(), bytes)?;
        Ok(())
    }

    fn remove(&self, node_id: &NodeId) -> Result<(), StorageError> {
        self.nodes.remove(node_id.as_str().as_bytes())?;
        Ok(())
    }

    fn next_id(&self) -> Result<NodeId, StorageError> {
        // generate_id starts at 0; keep ids positive like browser stores do
        let id = self.db.generate_id()? + 1;
        Ok(NodeId::new(id.to_string()))
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}
