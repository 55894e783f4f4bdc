//! Bookmark repository
//!
//! `BookmarkRepository` is the asynchronous CRUD contract the session consumes.
//! The in-crate implementation, `RecordRepository`, assembles trees from flat
//! `NodeRecord`s held by a `NodeRecordStore` (in memory or in sled).

pub mod memory;
pub mod persistence;
pub mod record;
pub mod sample;

use crate::error::StorageError;
use crate::tree::{Node, NodeSnapshot};
use crate::types::NodeId;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub use memory::MemoryRecordStore;
pub use persistence::SledNodeRecordStore;
pub use record::RecordRepository;

/// In-process repository with the same semantics as the persistent one
pub type MemoryRepository = RecordRepository<MemoryRecordStore>;

/// Repository persisted in a sled database
pub type SledRepository = RecordRepository<SledNodeRecordStore>;

/// Node type enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Folder,
    Link { url: String },
}

/// NodeRecord: one node with its relationships, without nested children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_id: NodeId,
    pub parent: Option<NodeId>,
    pub title: String,
    pub date_added: Option<i64>,
    pub node_type: NodeType,
    /// Ordered child ids; always empty for links
    pub children: Vec<NodeId>,
}

impl NodeRecord {
    /// Record for the virtual root with no children yet
    pub fn root() -> Self {
        NodeRecord {
            node_id: NodeId::root(),
            parent: None,
            title: String::new(),
            date_added: None,
            node_type: NodeType::Folder,
            children: Vec::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.node_type, NodeType::Folder)
    }
}

/// NodeRecord Store interface
pub trait NodeRecordStore: Send + Sync {
    fn get(&self, node_id: &NodeId) -> Result<Option<NodeRecord>, StorageError>;
    fn put(&self, record: &NodeRecord) -> Result<(), StorageError>;
    fn remove(&self, node_id: &NodeId) -> Result<(), StorageError>;
    /// Allocate a fresh id never handed out before by this store
    fn next_id(&self) -> Result<NodeId, StorageError>;
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Asynchronous CRUD over the bookmark tree.
///
/// Every call may fail; callers treat each as settling once with success or
/// failure and never assume synchronous completion.
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Forest of top-level folders (children of the virtual root)
    async fn fetch_tree(&self) -> Result<Vec<Node>, StorageError>;

    /// Flat, unordered matches on title or url (case-insensitive substring)
    async fn search(&self, query: &str) -> Result<Vec<Node>, StorageError>;

    async fn create_folder(&self, parent_id: &NodeId, title: &str) -> Result<Node, StorageError>;

    async fn create_bookmark(
        &self,
        parent_id: &NodeId,
        title: &str,
        url: &str,
    ) -> Result<Node, StorageError>;

    async fn rename_title(&self, id: &NodeId, title: &str) -> Result<Node, StorageError>;

    async fn update_bookmark_fields(
        &self,
        id: &NodeId,
        title: Option<&str>,
        url: Option<&str>,
    ) -> Result<Node, StorageError>;

    async fn delete_subtree(&self, id: &NodeId) -> Result<(), StorageError>;
}

/// Recreate a snapshot under `parent_id`, folder first and then each child in
/// order. Returns the id of the recreated subtree root.
pub fn recreate_subtree<'a>(
    repo: &'a dyn BookmarkRepository,
    parent_id: &'a NodeId,
    snapshot: &'a NodeSnapshot,
) -> BoxFuture<'a, Result<NodeId, StorageError>> {
    Box::pin(async move {
        match snapshot {
            NodeSnapshot::Link { title, url } => {
                let created = repo.create_bookmark(parent_id, title, url).await?;
                Ok(created.id)
            }
            NodeSnapshot::Folder { title, children } => {
                let created = repo.create_folder(parent_id, title).await?;
                for child in children {
                    recreate_subtree(repo, &created.id, child).await?;
                }
                Ok(created.id)
            }
        }
    })
}
