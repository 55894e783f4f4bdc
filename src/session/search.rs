//! Search session state
//!
//! Typing schedules a lookup that fires once the input has been quiet for the
//! debounce window. A lookup runs only if its query is still the latest one
//! typed, and a result is only applied if its query still equals the live
//! query. Both checks compare query strings by value.

use crate::error::StorageError;
use crate::store::BookmarkRepository;
use crate::tree::Node;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Query and results captured when drilling into a folder from search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub query: String,
    pub results: Vec<Node>,
}

/// Completed lookup delivered back to the session
#[derive(Debug)]
pub struct SearchResult {
    pub query: String,
    pub outcome: Result<Vec<Node>, StorageError>,
}

/// Schedules debounced lookups on the tokio runtime
pub struct SearchDebouncer {
    window: Duration,
    latest: Arc<RwLock<String>>,
    tx: mpsc::UnboundedSender<SearchResult>,
    rx: mpsc::UnboundedReceiver<SearchResult>,
}

impl SearchDebouncer {
    pub fn new(window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            window,
            latest: Arc::new(RwLock::new(String::new())),
            tx,
            rx,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Latest query typed
    pub fn latest(&self) -> String {
        self.latest.read().clone()
    }

    /// Record `query` as the latest input without scheduling a lookup.
    ///
    /// Any lookup still waiting for a different query will not run.
    pub fn supersede(&self, query: &str) {
        *self.latest.write() = query.to_string();
    }

    /// Record `query` and, if it is non-blank, schedule a lookup.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, query: &str, repo: Arc<dyn BookmarkRepository>) {
        self.supersede(query);
        if query.trim().is_empty() {
            return;
        }
        let query = query.to_string();
        let latest = Arc::clone(&self.latest);
        let tx = self.tx.clone();
        let window = self.window;
        debug!(query = %query, window_ms = window.as_millis() as u64, "Search scheduled");
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let superseded = *latest.read() != query;
            if superseded {
                debug!(query = %query, "Search superseded before it ran");
                return;
            }
            let outcome = repo.search(&query).await;
            // Receiver gone means the session was dropped
            let _ = tx.send(SearchResult { query, outcome });
        });
    }

    /// Wait for the next completed lookup
    pub async fn next_result(&mut self) -> Option<SearchResult> {
        self.rx.recv().await
    }

    /// Take a completed lookup if one is already waiting
    pub fn try_next_result(&mut self) -> Option<SearchResult> {
        self.rx.try_recv().ok()
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// Live query, its results and the optional back-into-search snapshot
#[derive(Debug, Default, Clone)]
pub struct SearchState {
    query: String,
    results: Vec<Node>,
    snapshot: Option<SearchSnapshot>,
}

impl SearchState {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Node] {
        &self.results
    }

    pub fn snapshot(&self) -> Option<&SearchSnapshot> {
        self.snapshot.as_ref()
    }

    /// A non-blank query is active
    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Replace the live query. A blank query drops the results.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        if !self.is_active() {
            self.results.clear();
        }
    }

    /// Apply a completed lookup.
    ///
    /// Returns false, leaving everything untouched, when the lookup belongs to
    /// a query that is no longer live. An applied lookup for a non-blank query
    /// discards any pending snapshot.
    pub fn apply(&mut self, query: &str, results: Vec<Node>) -> bool {
        if query != self.query {
            return false;
        }
        if self.is_active() {
            self.snapshot = None;
            self.results = results;
        } else {
            self.results.clear();
        }
        true
    }

    /// Stash the live search before drilling into a folder, then clear it.
    ///
    /// Nothing is stashed when no search is active.
    pub fn enter_folder(&mut self) {
        if self.is_active() {
            self.snapshot = Some(SearchSnapshot {
                query: std::mem::take(&mut self.query),
                results: std::mem::take(&mut self.results),
            });
        } else {
            self.query.clear();
            self.results.clear();
        }
    }

    /// Restore the stashed search, consuming it. Returns false if none exists.
    pub fn restore(&mut self) -> bool {
        match self.snapshot.take() {
            Some(snapshot) => {
                self.query = snapshot.query;
                self.results = snapshot.results;
                true
            }
            None => false,
        }
    }

    /// Clear the query, the results and any snapshot
    pub fn reset(&mut self) {
        self.query.clear();
        self.results.clear();
        self.snapshot = None;
    }
}
