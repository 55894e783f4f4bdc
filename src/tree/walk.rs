//! Read-only queries over a fetched bookmark forest.
//!
//! The forest is the list of top-level folders (children of the virtual root).
//! All walks are depth-first and allocate only for their results.

use crate::tree::node::Node;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};

/// One step of the breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub id: NodeId,
    pub title: String,
}

/// Find a node anywhere in the forest
pub fn find_node<'a>(forest: &'a [Node], id: &NodeId) -> Option<&'a Node> {
    for node in forest {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(node.children(), id) {
            return Some(found);
        }
    }
    None
}

/// Ancestor chain from the top-level folder down to `target`, inclusive.
///
/// Empty when `target` is the virtual root or unknown.
pub fn breadcrumbs(forest: &[Node], target: &NodeId) -> Vec<Breadcrumb> {
    let mut path = Vec::new();
    if !target.is_root() {
        collect_path(forest, target, &mut path);
    }
    path
}

fn collect_path(nodes: &[Node], target: &NodeId, path: &mut Vec<Breadcrumb>) -> bool {
    for node in nodes {
        let hit = &node.id == target || collect_path(node.children(), target, path);
        if hit {
            let title = if node.title.is_empty() {
                "Root".to_string()
            } else {
                node.title.clone()
            };
            path.insert(
                0,
                Breadcrumb {
                    id: node.id.clone(),
                    title,
                },
            );
            return true;
        }
    }
    false
}

/// Folder that owns `id`, or the virtual root for top-level nodes
pub fn parent_of(forest: &[Node], id: &NodeId) -> NodeId {
    let crumbs = breadcrumbs(forest, id);
    if crumbs.len() >= 2 {
        crumbs[crumbs.len() - 2].id.clone()
    } else {
        NodeId::root()
    }
}

/// Total number of links in the forest
pub fn count_links(forest: &[Node]) -> usize {
    forest
        .iter()
        .map(|n| {
            if n.is_folder() {
                count_links(n.children())
            } else {
                1
            }
        })
        .sum()
}

/// Rendered order of the main grid: folders first, then links.
pub fn grid_order(items: &[Node]) -> Vec<&Node> {
    let (mut folders, links): (Vec<&Node>, Vec<&Node>) = items.iter().partition(|n| n.is_folder());
    folders.extend(links);
    folders
}

/// Case-insensitive substring match over title and url, flattened
pub fn search_forest(forest: &[Node], query: &str) -> Vec<Node> {
    let needle = query.to_lowercase();
    let mut results = Vec::new();
    collect_matches(forest, &needle, &mut results);
    results
}

fn collect_matches(nodes: &[Node], needle: &str, out: &mut Vec<Node>) {
    for node in nodes {
        let title_match = node.title.to_lowercase().contains(needle);
        let url_match = node
            .url()
            .map(|u| u.to_lowercase().contains(needle))
            .unwrap_or(false);
        if title_match || url_match {
            out.push(node.clone());
        }
        collect_matches(node.children(), needle, out);
    }
}
