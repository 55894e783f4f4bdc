//! Presentation-facing session events

use crate::navigator::Direction;
use crate::types::NodeId;
use parking_lot::Mutex;

/// Receives state changes from a `Session`.
///
/// Every method defaults to doing nothing, so a presentation layer implements
/// only what it renders.
pub trait SessionListener: Send + Sync {
    fn on_selection_changed(&self, _folder: &NodeId) {}
    fn on_focus_changed(&self, _item: Option<&NodeId>) {}
    fn on_request_pane_handoff(&self, _direction: Direction) {}
    fn on_command_log_changed(&self, _can_undo: bool, _can_redo: bool) {}
    fn on_search_results_changed(&self, _query: &str, _count: usize) {}
    fn on_open_url(&self, _url: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl SessionListener for NoopListener {}

/// Owned copy of one listener callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SelectionChanged(NodeId),
    FocusChanged(Option<NodeId>),
    PaneHandoff(Direction),
    CommandLogChanged { can_undo: bool, can_redo: bool },
    SearchResultsChanged { query: String, count: usize },
    OpenUrl(String),
}

/// Listener that queues every event for later inspection
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().clone()
    }

    fn push(&self, event: SessionEvent) {
        self.events.lock().push(event);
    }
}

impl SessionListener for RecordingListener {
    fn on_selection_changed(&self, folder: &NodeId) {
        self.push(SessionEvent::SelectionChanged(folder.clone()));
    }

    fn on_focus_changed(&self, item: Option<&NodeId>) {
        self.push(SessionEvent::FocusChanged(item.cloned()));
    }

    fn on_request_pane_handoff(&self, direction: Direction) {
        self.push(SessionEvent::PaneHandoff(direction));
    }

    fn on_command_log_changed(&self, can_undo: bool, can_redo: bool) {
        self.push(SessionEvent::CommandLogChanged { can_undo, can_redo });
    }

    fn on_search_results_changed(&self, query: &str, count: usize) {
        self.push(SessionEvent::SearchResultsChanged {
            query: query.to_string(),
            count,
        });
    }

    fn on_open_url(&self, url: &str) {
        self.push(SessionEvent::OpenUrl(url.to_string()));
    }
}
