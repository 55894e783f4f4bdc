//! Bookmark tree model and read-only walks

pub mod node;
pub mod walk;

pub use node::{Node, NodeKind, NodeSnapshot};
pub use walk::{breadcrumbs, count_links, find_node, grid_order, parent_of, search_forest, Breadcrumb};
