//! Repository over a NodeRecord store
//!
//! Assembles nested `Node` trees from flat records and applies mutations as
//! record rewrites. A process-wide write lock keeps each mutation atomic with
//! respect to other callers sharing the repository.

use super::{BookmarkRepository, MemoryRecordStore, NodeRecord, NodeRecordStore, NodeType, SledNodeRecordStore};
use crate::error::StorageError;
use crate::tree::{search_forest, Node, NodeKind};
use crate::types::NodeId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use tracing::debug;

pub struct RecordRepository<S: NodeRecordStore> {
    records: S,
    write_lock: Mutex<()>,
}

impl RecordRepository<MemoryRecordStore> {
    /// Empty in-memory repository
    pub fn in_memory() -> Self {
        Self::new(MemoryRecordStore::new())
    }
}

impl RecordRepository<SledNodeRecordStore> {
    /// Open a persistent repository at `path`
    pub fn open_sled(path: &Path) -> Result<Self, StorageError> {
        Ok(Self::new(SledNodeRecordStore::open(path)?))
    }
}

impl<S: NodeRecordStore> RecordRepository<S> {
    pub fn new(records: S) -> Self {
        Self {
            records,
            write_lock: Mutex::new(()),
        }
    }

    pub fn records(&self) -> &S {
        &self.records
    }

    fn root_record(&self) -> Result<NodeRecord, StorageError> {
        Ok(self
            .records
            .get(&NodeId::root())?
            .unwrap_or_else(NodeRecord::root))
    }

    fn record(&self, id: &NodeId) -> Result<NodeRecord, StorageError> {
        if id.is_root() {
            return self.root_record();
        }
        self.records
            .get(id)?
            .ok_or_else(|| StorageError::NotFound(id.clone()))
    }

    fn build_node(&self, record: &NodeRecord) -> Result<Node, StorageError> {
        let kind = match &record.node_type {
            NodeType::Link { url } => NodeKind::Link { url: url.clone() },
            NodeType::Folder => {
                let mut children = Vec::with_capacity(record.children.len());
                for child_id in &record.children {
                    // A dangling child id means a half-applied delete; skip it
                    if let Some(child) = self.records.get(child_id)? {
                        children.push(self.build_node(&child)?);
                    }
                }
                NodeKind::Folder { children }
            }
        };
        Ok(Node {
            id: record.node_id.clone(),
            parent_id: record.parent.clone().unwrap_or_else(NodeId::root),
            title: record.title.clone(),
            date_added: record.date_added,
            kind,
        })
    }

    fn load_forest(&self) -> Result<Vec<Node>, StorageError> {
        let root = self.root_record()?;
        let mut forest = Vec::with_capacity(root.children.len());
        for id in &root.children {
            if let Some(record) = self.records.get(id)? {
                forest.push(self.build_node(&record)?);
            }
        }
        Ok(forest)
    }

    fn insert_child(&self, parent_id: &NodeId, node_type: NodeType, title: &str) -> Result<Node, StorageError> {
        let _guard = self.write_lock.lock();
        let mut parent = self.record(parent_id)?;
        if !parent.is_folder() {
            return Err(StorageError::NotAFolder(parent_id.clone()));
        }
        if parent_id.is_root() && !matches!(node_type, NodeType::Folder) {
            return Err(StorageError::RootImmutable);
        }
        let record = NodeRecord {
            node_id: self.records.next_id()?,
            parent: Some(parent_id.clone()),
            title: title.to_string(),
            date_added: Some(chrono::Utc::now().timestamp_millis()),
            node_type,
            children: Vec::new(),
        };
        self.records.put(&record)?;
        parent.children.push(record.node_id.clone());
        self.records.put(&parent)?;
        self.records.flush()?;
        debug!(id = %record.node_id, parent = %parent_id, "Inserted node");
        self.build_node(&record)
    }

    fn rewrite<F>(&self, id: &NodeId, apply: F) -> Result<Node, StorageError>
    where
        F: FnOnce(&mut NodeRecord) -> Result<(), StorageError>,
    {
        if id.is_root() {
            return Err(StorageError::RootImmutable);
        }
        let _guard = self.write_lock.lock();
        let mut record = self.record(id)?;
        apply(&mut record)?;
        self.records.put(&record)?;
        self.records.flush()?;
        self.build_node(&record)
    }

    fn collect_subtree(&self, id: &NodeId, out: &mut Vec<NodeId>) -> Result<(), StorageError> {
        if let Some(record) = self.records.get(id)? {
            for child in &record.children {
                self.collect_subtree(child, out)?;
            }
        }
        out.push(id.clone());
        Ok(())
    }
}

#[async_trait]
impl<S: NodeRecordStore> BookmarkRepository for RecordRepository<S> {
    async fn fetch_tree(&self) -> Result<Vec<Node>, StorageError> {
        self.load_forest()
    }

    async fn search(&self, query: &str) -> Result<Vec<Node>, StorageError> {
        Ok(search_forest(&self.load_forest()?, query))
    }

    async fn create_folder(&self, parent_id: &NodeId, title: &str) -> Result<Node, StorageError> {
        self.insert_child(parent_id, NodeType::Folder, title)
    }

    async fn create_bookmark(
        &self,
        parent_id: &NodeId,
        title: &str,
        url: &str,
    ) -> Result<Node, StorageError> {
        self.insert_child(
            parent_id,
            NodeType::Link {
                url: url.to_string(),
            },
            title,
        )
    }

    async fn rename_title(&self, id: &NodeId, title: &str) -> Result<Node, StorageError> {
        self.rewrite(id, |record| {
            record.title = title.to_string();
            Ok(())
        })
    }

    async fn update_bookmark_fields(
        &self,
        id: &NodeId,
        title: Option<&str>,
        url: Option<&str>,
    ) -> Result<Node, StorageError> {
        self.rewrite(id, |record| {
            if let Some(url) = url {
                match &mut record.node_type {
                    NodeType::Link { url: current } => *current = url.to_string(),
                    NodeType::Folder => return Err(StorageError::NotALink(record.node_id.clone())),
                }
            }
            if let Some(title) = title {
                record.title = title.to_string();
            }
            Ok(())
        })
    }

    async fn delete_subtree(&self, id: &NodeId) -> Result<(), StorageError> {
        if id.is_root() {
            return Err(StorageError::RootImmutable);
        }
        let _guard = self.write_lock.lock();
        let record = self.record(id)?;
        let parent_id = record.parent.clone().unwrap_or_else(NodeId::root);
        let mut parent = self.record(&parent_id)?;
        parent.children.retain(|child| child != id);
        self.records.put(&parent)?;

        let mut doomed = Vec::new();
        self.collect_subtree(id, &mut doomed)?;
        for node_id in &doomed {
            self.records.remove(node_id)?;
        }
        self.records.flush()?;
        debug!(id = %id, removed = doomed.len(), "Deleted subtree");
        Ok(())
    }
}
