//! Bookmark node types and id-less subtree snapshots

use crate::types::NodeId;
use serde::{Deserialize, Serialize};

/// Folder or link payload. A folder never carries a url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Folder { children: Vec<Node> },
    Link { url: String },
}

/// Bookmark node as returned by a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Owning folder; the virtual root for top-level folders
    pub parent_id: NodeId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn folder(id: NodeId, parent_id: NodeId, title: impl Into<String>, children: Vec<Node>) -> Self {
        Node {
            id,
            parent_id,
            title: title.into(),
            date_added: None,
            kind: NodeKind::Folder { children },
        }
    }

    pub fn link(id: NodeId, parent_id: NodeId, title: impl Into<String>, url: impl Into<String>) -> Self {
        Node {
            id,
            parent_id,
            title: title.into(),
            date_added: None,
            kind: NodeKind::Link { url: url.into() },
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Link { url } => Some(url),
            NodeKind::Folder { .. } => None,
        }
    }

    /// Children of a folder; empty for links
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Folder { children } => children,
            NodeKind::Link { .. } => &[],
        }
    }

    /// True when at least one child is a folder
    pub fn has_subfolders(&self) -> bool {
        self.children().iter().any(Node::is_folder)
    }

    /// Deep copy of this subtree without ids
    pub fn snapshot(&self) -> NodeSnapshot {
        match &self.kind {
            NodeKind::Link { url } => NodeSnapshot::Link {
                title: self.title.clone(),
                url: url.clone(),
            },
            NodeKind::Folder { children } => NodeSnapshot::Folder {
                title: self.title.clone(),
                children: children.iter().map(Node::snapshot).collect(),
            },
        }
    }
}

/// Subtree content captured at delete time.
///
/// Ids are deliberately absent: the repository assigns fresh ids when the
/// subtree is recreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeSnapshot {
    Folder {
        title: String,
        children: Vec<NodeSnapshot>,
    },
    Link {
        title: String,
        url: String,
    },
}

impl NodeSnapshot {
    pub fn title(&self) -> &str {
        match self {
            NodeSnapshot::Folder { title, .. } | NodeSnapshot::Link { title, .. } => title,
        }
    }

    /// Number of nodes in the snapshot, including itself
    pub fn len(&self) -> usize {
        match self {
            NodeSnapshot::Link { .. } => 1,
            NodeSnapshot::Folder { children, .. } => {
                1 + children.iter().map(NodeSnapshot::len).sum::<usize>()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_drops_ids_and_keeps_order() {
        let folder = Node::folder(
            NodeId::new("10"),
            NodeId::root(),
            "Dev",
            vec![
                Node::link(NodeId::new("11"), NodeId::new("10"), "GitHub", "https://github.com"),
                Node::folder(NodeId::new("12"), NodeId::new("10"), "Docs", vec![]),
            ],
        );
        let snap = folder.snapshot();
        assert_eq!(snap.len(), 3);
        match snap {
            NodeSnapshot::Folder { title, children } => {
                assert_eq!(title, "Dev");
                assert_eq!(children[0].title(), "GitHub");
                assert_eq!(children[1].title(), "Docs");
            }
            NodeSnapshot::Link { .. } => panic!("expected folder snapshot"),
        }
    }

    #[test]
    fn test_node_serializes_with_type_tag() {
        let link = Node::link(NodeId::new("1"), NodeId::new("0"), "News", "https://news.example.com");
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["type"], "link");
        assert_eq!(json["url"], "https://news.example.com");
        assert_eq!(json["parent_id"], "0");
        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, link);
    }
}
