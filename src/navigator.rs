//! Spatial Navigator
//!
//! Moves keyboard focus between rendered grid cells by geometry alone. The
//! navigator keeps no state: every decision is re-derived from the layout
//! snapshot handed in, so window reflow can never desynchronize focus from
//! what is on screen.

use crate::types::NodeId;
use serde::{Deserialize, Serialize};

/// Two items share a row when their tops differ by less than this
pub const ROW_TOLERANCE: f64 = 24.0;

/// Horizontal slack when comparing left edges
const EDGE_EPSILON: f64 = 1.0;

/// Axis-aligned bounding box in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// On-screen position of one rendered node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutItem {
    pub id: NodeId,
    pub rect: Rect,
}

impl LayoutItem {
    pub fn new(id: impl Into<NodeId>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            rect,
        }
    }
}

/// Capability to read the geometry of currently rendered cells.
///
/// Queried lazily, once per navigation decision.
pub trait LayoutSource {
    fn layout_items(&self) -> Vec<LayoutItem>;
}

impl LayoutSource for [LayoutItem] {
    fn layout_items(&self) -> Vec<LayoutItem> {
        self.to_vec()
    }
}

impl LayoutSource for Vec<LayoutItem> {
    fn layout_items(&self) -> Vec<LayoutItem> {
        self.clone()
    }
}

/// Adapts a geometry query closure into a `LayoutSource`
pub struct LayoutFn<F>(pub F);

impl<F> LayoutSource for LayoutFn<F>
where
    F: Fn() -> Vec<LayoutItem>,
{
    fn layout_items(&self) -> Vec<LayoutItem> {
        (self.0)()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Navigation decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// Focus moves to another item
    Move(NodeId),
    /// No neighbor in that direction; focus stays on this item
    Stay(NodeId),
    /// Focus should leave the grid for the sibling pane
    Handoff,
    /// Nothing is rendered
    NoTarget,
}

impl NavOutcome {
    /// Item that holds focus after the decision, if any
    pub fn target(&self) -> Option<&NodeId> {
        match self {
            NavOutcome::Move(id) | NavOutcome::Stay(id) => Some(id),
            NavOutcome::Handoff | NavOutcome::NoTarget => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpatialNavigator {
    row_tolerance: f64,
}

impl Default for SpatialNavigator {
    fn default() -> Self {
        Self::new(ROW_TOLERANCE)
    }
}

impl SpatialNavigator {
    pub fn new(row_tolerance: f64) -> Self {
        Self { row_tolerance }
    }

    pub fn row_tolerance(&self) -> f64 {
        self.row_tolerance
    }

    /// Decide where focus goes from `current` in `direction`.
    ///
    /// An unknown or absent `current` behaves as if the first rendered item
    /// were focused.
    pub fn navigate<L>(&self, layout: &L, current: Option<&NodeId>, direction: Direction) -> NavOutcome
    where
        L: LayoutSource + ?Sized,
    {
        let items = layout.layout_items();
        let Some(anchor) = current
            .and_then(|id| items.iter().find(|item| &item.id == id))
            .or_else(|| items.first())
        else {
            return NavOutcome::NoTarget;
        };
        match direction {
            Direction::Left | Direction::Right => self.horizontal(&items, anchor, direction),
            Direction::Up | Direction::Down => self.vertical(&items, anchor, direction),
        }
    }

    fn same_row<'a>(&self, items: &'a [LayoutItem], top: f64) -> Vec<&'a LayoutItem> {
        items
            .iter()
            .filter(|item| (item.rect.top - top).abs() < self.row_tolerance)
            .collect()
    }

    fn horizontal(&self, items: &[LayoutItem], current: &LayoutItem, direction: Direction) -> NavOutcome {
        let row = self.same_row(items, current.rect.top);
        let left = current.rect.left;
        let target = match direction {
            Direction::Left => row
                .iter()
                .filter(|item| item.rect.left < left - EDGE_EPSILON)
                .max_by(|a, b| a.rect.left.total_cmp(&b.rect.left)),
            _ => row
                .iter()
                .filter(|item| item.rect.left > left + EDGE_EPSILON)
                .min_by(|a, b| a.rect.left.total_cmp(&b.rect.left)),
        };
        if let Some(item) = target {
            return NavOutcome::Move(item.id.clone());
        }

        let row_min_left = row
            .iter()
            .map(|item| item.rect.left)
            .fold(f64::INFINITY, f64::min);
        let leftmost = left <= row_min_left + EDGE_EPSILON;
        if direction == Direction::Left && leftmost {
            NavOutcome::Handoff
        } else {
            NavOutcome::Stay(current.id.clone())
        }
    }

    fn vertical(&self, items: &[LayoutItem], current: &LayoutItem, direction: Direction) -> NavOutcome {
        let half = self.row_tolerance / 2.0;
        let top = current.rect.top;
        let center = current.rect.center_x();
        let best = items
            .iter()
            .filter(|item| match direction {
                Direction::Down => item.rect.top > top + half,
                _ => item.rect.top < top - half,
            })
            .map(|item| {
                let dy = (item.rect.top - top).abs();
                let dx = (item.rect.center_x() - center).abs();
                (dy, dx, item)
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        match best {
            Some((_, _, item)) => NavOutcome::Move(item.id.clone()),
            None => NavOutcome::Stay(current.id.clone()),
        }
    }
}

/// Lay out `ids` as a fixed-column grid of uniform cells.
///
/// Used by the CLI shell, which has no real renderer, and by tests.
pub fn uniform_grid(ids: &[NodeId], columns: usize, cell_width: f64, cell_height: f64) -> Vec<LayoutItem> {
    let columns = columns.max(1);
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            let col = (i % columns) as f64;
            let row = (i / columns) as f64;
            LayoutItem::new(id.clone(), Rect::new(col * cell_width, row * cell_height, cell_width, cell_height))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(s: &str) -> NodeId {
        NodeId::new(s)
    }

    /// Row one {a,b,c} at y=0, row two {d,e} at y=100
    fn two_rows() -> Vec<LayoutItem> {
        vec![
            LayoutItem::new("a", Rect::new(0.0, 0.0, 100.0, 60.0)),
            LayoutItem::new("b", Rect::new(120.0, 0.0, 100.0, 60.0)),
            LayoutItem::new("c", Rect::new(240.0, 0.0, 100.0, 60.0)),
            LayoutItem::new("d", Rect::new(0.0, 100.0, 100.0, 60.0)),
            LayoutItem::new("e", Rect::new(120.0, 100.0, 100.0, 60.0)),
        ]
    }

    #[test]
    fn test_right_moves_to_nearest_in_row() {
        let nav = SpatialNavigator::default();
        let out = nav.navigate(&two_rows(), Some(&id("a")), Direction::Right);
        assert_eq!(out, NavOutcome::Move(id("b")));
    }

    #[test]
    fn test_right_at_row_end_stays() {
        let nav = SpatialNavigator::default();
        let out = nav.navigate(&two_rows(), Some(&id("c")), Direction::Right);
        assert_eq!(out, NavOutcome::Stay(id("c")));
    }

    #[test]
    fn test_left_at_row_start_hands_off() {
        let nav = SpatialNavigator::default();
        assert_eq!(nav.navigate(&two_rows(), Some(&id("a")), Direction::Left), NavOutcome::Handoff);
        assert_eq!(nav.navigate(&two_rows(), Some(&id("d")), Direction::Left), NavOutcome::Handoff);
        assert_eq!(
            nav.navigate(&two_rows(), Some(&id("c")), Direction::Left),
            NavOutcome::Move(id("b"))
        );
    }

    #[test]
    fn test_down_picks_nearest_center() {
        let nav = SpatialNavigator::default();
        assert_eq!(
            nav.navigate(&two_rows(), Some(&id("b")), Direction::Down),
            NavOutcome::Move(id("e"))
        );
        // c has no item directly below; e is the closer center
        assert_eq!(
            nav.navigate(&two_rows(), Some(&id("c")), Direction::Down),
            NavOutcome::Move(id("e"))
        );
    }

    #[test]
    fn test_up_returns_to_first_row() {
        let nav = SpatialNavigator::default();
        assert_eq!(nav.navigate(&two_rows(), Some(&id("d")), Direction::Up), NavOutcome::Move(id("a")));
        assert_eq!(nav.navigate(&two_rows(), Some(&id("e")), Direction::Up), NavOutcome::Move(id("b")));
        assert_eq!(nav.navigate(&two_rows(), Some(&id("a")), Direction::Up), NavOutcome::Stay(id("a")));
    }

    #[test]
    fn test_jitter_within_tolerance_stays_one_row() {
        let nav = SpatialNavigator::default();
        let items = vec![
            LayoutItem::new("a", Rect::new(0.0, 0.0, 100.0, 60.0)),
            LayoutItem::new("b", Rect::new(120.0, 10.5, 100.0, 60.0)),
        ];
        assert_eq!(nav.navigate(&items, Some(&id("a")), Direction::Right), NavOutcome::Move(id("b")));
        // 10.5 is under half the tolerance, so b is not "below" a
        assert_eq!(nav.navigate(&items, Some(&id("a")), Direction::Down), NavOutcome::Stay(id("a")));
    }

    #[test]
    fn test_empty_layout_has_no_target() {
        let nav = SpatialNavigator::default();
        let empty: Vec<LayoutItem> = Vec::new();
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert_eq!(nav.navigate(&empty, Some(&id("a")), dir), NavOutcome::NoTarget);
        }
    }

    #[test]
    fn test_unknown_current_falls_back_to_first() {
        let nav = SpatialNavigator::default();
        assert_eq!(nav.navigate(&two_rows(), None, Direction::Right), NavOutcome::Move(id("b")));
        assert_eq!(nav.navigate(&two_rows(), Some(&id("zz")), Direction::Down), NavOutcome::Move(id("d")));
    }

    #[test]
    fn test_closure_layout_source() {
        let nav = SpatialNavigator::default();
        let source = LayoutFn(two_rows);
        assert_eq!(nav.navigate(&source, Some(&id("b")), Direction::Right), NavOutcome::Move(id("c")));
    }

    #[test]
    fn test_uniform_grid_wraps_rows() {
        let ids: Vec<NodeId> = ["1", "2", "3", "4", "5"].iter().map(|s| id(s)).collect();
        let grid = uniform_grid(&ids, 3, 100.0, 50.0);
        assert_eq!(grid[3].rect.top, 50.0);
        assert_eq!(grid[3].rect.left, 0.0);
        let nav = SpatialNavigator::default();
        assert_eq!(nav.navigate(&grid, Some(&id("3")), Direction::Down), NavOutcome::Move(id("5")));
    }

    proptest! {
        #[test]
        fn prop_result_is_always_a_rendered_item(
            cols in 1usize..6,
            count in 1usize..30,
            pick in 0usize..30,
            dir in prop_oneof![
                Just(Direction::Up),
                Just(Direction::Down),
                Just(Direction::Left),
                Just(Direction::Right)
            ],
        ) {
            let ids: Vec<NodeId> = (0..count).map(|i| NodeId::new(i.to_string())).collect();
            let grid = uniform_grid(&ids, cols, 80.0, 40.0);
            let current = &ids[pick % count];
            let nav = SpatialNavigator::default();
            match nav.navigate(&grid, Some(current), dir) {
                NavOutcome::Move(target) => {
                    prop_assert!(ids.contains(&target));
                    prop_assert_ne!(&target, current);
                }
                NavOutcome::Stay(target) => prop_assert_eq!(&target, current),
                NavOutcome::Handoff => {
                    prop_assert_eq!(dir, Direction::Left);
                    prop_assert_eq!((pick % count) % cols, 0);
                }
                NavOutcome::NoTarget => prop_assert!(false, "grid is not empty"),
            }
        }
    }
}
