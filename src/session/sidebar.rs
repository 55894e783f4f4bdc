//! Sidebar folder tree
//!
//! The sidebar lists folders only, indented by depth, and descends only into
//! expanded folders. Keyboard movement walks that flattened list.

use crate::tree::{breadcrumbs, find_node, Node};
use crate::types::NodeId;
use std::collections::HashSet;

/// One visible sidebar row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarRow {
    pub id: NodeId,
    pub title: String,
    pub level: usize,
    pub has_subfolders: bool,
    pub expanded: bool,
}

/// Depth-first folder rows, descending only into `expanded` folders
pub fn visible_folders(forest: &[Node], expanded: &HashSet<NodeId>) -> Vec<SidebarRow> {
    let mut rows = Vec::new();
    walk_rows(forest, expanded, 0, &mut rows);
    rows
}

fn walk_rows(nodes: &[Node], expanded: &HashSet<NodeId>, level: usize, rows: &mut Vec<SidebarRow>) {
    for node in nodes.iter().filter(|n| n.is_folder()) {
        let is_expanded = expanded.contains(&node.id);
        rows.push(SidebarRow {
            id: node.id.clone(),
            title: node.title.clone(),
            level,
            has_subfolders: node.has_subfolders(),
            expanded: is_expanded,
        });
        if is_expanded {
            walk_rows(node.children(), expanded, level + 1, rows);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarKey {
    Up,
    Down,
    Right,
    Enter,
}

/// What the session should do in response to a sidebar key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarAction {
    Select(NodeId),
    /// Expansion flipped in place; selection unchanged
    Toggled(NodeId),
    FocusMain,
    SelectAndFocusMain(NodeId),
    Nothing,
}

/// Expansion set and delete confirmation for the sidebar
#[derive(Debug, Clone, Default)]
pub struct SidebarState {
    expanded: HashSet<NodeId>,
    pending_delete: Option<NodeId>,
}

impl SidebarState {
    /// Start with every top-level folder expanded
    pub fn from_forest(forest: &[Node]) -> Self {
        Self {
            expanded: forest.iter().map(|n| n.id.clone()).collect(),
            pending_delete: None,
        }
    }

    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.expanded.contains(id)
    }

    pub fn toggle(&mut self, id: &NodeId) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.clone());
        }
    }

    /// Expand every ancestor of `id`, leaving `id` itself as it was
    pub fn reveal(&mut self, forest: &[Node], id: &NodeId) {
        let crumbs = breadcrumbs(forest, id);
        if let Some((_, ancestors)) = crumbs.split_last() {
            self.expanded.extend(ancestors.iter().map(|c| c.id.clone()));
        }
    }

    pub fn rows(&self, forest: &[Node]) -> Vec<SidebarRow> {
        visible_folders(forest, &self.expanded)
    }

    /// Resolve a key press with `selected` as the current folder
    pub fn handle_key(&mut self, forest: &[Node], selected: &NodeId, key: SidebarKey) -> SidebarAction {
        match key {
            SidebarKey::Right => SidebarAction::FocusMain,
            SidebarKey::Up | SidebarKey::Down => {
                let rows = self.rows(forest);
                let Some(idx) = rows.iter().position(|row| &row.id == selected) else {
                    // Selection off the visible rows (e.g. the virtual root): enter at the top
                    return match rows.first() {
                        Some(first) => SidebarAction::Select(first.id.clone()),
                        None => SidebarAction::Nothing,
                    };
                };
                let next = match key {
                    SidebarKey::Down => (idx + 1).min(rows.len() - 1),
                    _ => idx.saturating_sub(1),
                };
                if next == idx {
                    SidebarAction::Nothing
                } else {
                    SidebarAction::Select(rows[next].id.clone())
                }
            }
            SidebarKey::Enter => match find_node(forest, selected) {
                Some(folder) if folder.is_folder() => {
                    if folder.has_subfolders() {
                        self.toggle(selected);
                        SidebarAction::Toggled(selected.clone())
                    } else {
                        SidebarAction::SelectAndFocusMain(selected.clone())
                    }
                }
                _ => SidebarAction::Nothing,
            },
        }
    }

    /// First request arms `id`; a second request for the same id confirms.
    ///
    /// Returns true when the delete should proceed.
    pub fn request_delete(&mut self, id: &NodeId) -> bool {
        if self.pending_delete.as_ref() == Some(id) {
            self.pending_delete = None;
            true
        } else {
            self.pending_delete = Some(id.clone());
            false
        }
    }

    pub fn pending_delete(&self) -> Option<&NodeId> {
        self.pending_delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }
}
