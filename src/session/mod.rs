//! Session: selection, focus, search and editing over one repository
//!
//! A `Session` is the single owner of everything the two-pane navigator
//! shows: the fetched forest, the selected folder (or the virtual root), the
//! focused grid item, the search state and the command log. Mutations go
//! through the repository first; only a confirmed mutation is recorded, after
//! which the forest is refetched so the session always mirrors the store.

pub mod listener;
pub mod prompt;
pub mod search;
pub mod sidebar;
pub mod viewport;

pub use listener::{NoopListener, RecordingListener, SessionEvent, SessionListener};
pub use prompt::{is_plausible_url, normalize_url, Prompt, PromptMode, UrlConfirmation};
pub use search::{SearchDebouncer, SearchResult, SearchSnapshot, SearchState};
pub use sidebar::{visible_folders, SidebarAction, SidebarKey, SidebarRow, SidebarState};
pub use viewport::{PaneWidth, Zoom};

use crate::concurrency::MutationGate;
use crate::config::SessionConfig;
use crate::error::{ApiError, StorageError};
use crate::history::{Command, CommandLog, ReplayOutcome};
use crate::keymap::Intent;
use crate::navigator::{Direction, LayoutSource, NavOutcome, SpatialNavigator};
use crate::store::BookmarkRepository;
use crate::tree::{breadcrumbs, find_node, grid_order, parent_of, Breadcrumb, Node};
use crate::types::NodeId;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pane holding keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Sidebar,
    Main,
    Search,
}

fn store_failure(action: &str, err: StorageError) -> ApiError {
    warn!(action, error = %err, "Store rejected operation");
    ApiError::StorageError(err)
}

pub struct Session {
    repo: Arc<dyn BookmarkRepository>,
    listener: Arc<dyn SessionListener>,
    navigator: SpatialNavigator,
    forest: Vec<Node>,
    selected: NodeId,
    search: SearchState,
    debouncer: SearchDebouncer,
    pane: Pane,
    main_active: Option<NodeId>,
    log: CommandLog,
    gate: MutationGate,
    sidebar: SidebarState,
    prompt: Option<Prompt>,
    pane_width: PaneWidth,
    zoom: Zoom,
}

impl Session {
    pub fn new(repo: Arc<dyn BookmarkRepository>, settings: &SessionConfig) -> Self {
        Self {
            repo,
            listener: Arc::new(NoopListener),
            navigator: SpatialNavigator::new(settings.row_tolerance),
            forest: Vec::new(),
            selected: NodeId::root(),
            search: SearchState::default(),
            debouncer: SearchDebouncer::new(settings.debounce()),
            pane: Pane::Sidebar,
            main_active: None,
            log: CommandLog::new(),
            gate: MutationGate::new(),
            sidebar: SidebarState::default(),
            prompt: None,
            pane_width: PaneWidth::new(
                settings.sidebar_default_width,
                settings.sidebar_min_width,
                settings.sidebar_max_width,
            ),
            zoom: Zoom::default(),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Fetch the forest and start browsing at the virtual root
    pub async fn open(&mut self) -> Result<(), ApiError> {
        self.forest = self
            .repo
            .fetch_tree()
            .await
            .map_err(|e| store_failure("open", e))?;
        self.sidebar = SidebarState::from_forest(&self.forest);
        self.selected = NodeId::root();
        self.listener.on_selection_changed(&self.selected);
        info!(folders = self.forest.len(), "Session opened");
        Ok(())
    }

    pub fn repository(&self) -> &Arc<dyn BookmarkRepository> {
        &self.repo
    }

    pub fn forest(&self) -> &[Node] {
        &self.forest
    }

    pub fn selected_folder(&self) -> &NodeId {
        &self.selected
    }

    /// Selected folder node; None at the virtual root
    pub fn active_folder(&self) -> Option<&Node> {
        if self.selected.is_root() {
            None
        } else {
            find_node(&self.forest, &self.selected)
        }
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        breadcrumbs(&self.forest, &self.selected)
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn query(&self) -> &str {
        self.search.query()
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    pub fn main_active(&self) -> Option<&NodeId> {
        self.main_active.as_ref()
    }

    pub fn command_log(&self) -> &CommandLog {
        &self.log
    }

    /// Handle to the mutation gate, shared with any other caller
    pub fn mutation_gate(&self) -> MutationGate {
        self.gate.clone()
    }

    pub fn sidebar(&self) -> &SidebarState {
        &self.sidebar
    }

    pub fn sidebar_rows(&self) -> Vec<SidebarRow> {
        self.sidebar.rows(&self.forest)
    }

    /// Main pane content in rendered order.
    ///
    /// Search results while a query is active, otherwise the children of the
    /// selected folder (the top-level folders at the virtual root).
    pub fn visible_items(&self) -> Vec<&Node> {
        if self.search.is_active() {
            return grid_order(self.search.results());
        }
        match self.active_folder() {
            Some(folder) => grid_order(folder.children()),
            None if self.selected.is_root() => grid_order(&self.forest),
            None => Vec::new(),
        }
    }

    pub fn visible_ids(&self) -> Vec<NodeId> {
        self.visible_items().into_iter().map(|n| n.id.clone()).collect()
    }

    fn set_selected(&mut self, id: NodeId) {
        if !id.is_root() {
            self.sidebar.reveal(&self.forest, &id);
        }
        if self.selected != id {
            debug!(folder = %id, "Selection changed");
            self.selected = id;
            self.listener.on_selection_changed(&self.selected);
        }
    }

    fn set_main_active(&mut self, item: Option<NodeId>) {
        if self.main_active != item {
            self.main_active = item;
            self.listener.on_focus_changed(self.main_active.as_ref());
        }
    }

    /// Drop main focus if the focused item is no longer rendered
    fn reconcile_focus(&mut self) {
        let stale = match &self.main_active {
            Some(active) => !self.visible_items().iter().any(|n| &n.id == active),
            None => false,
        };
        if stale {
            self.set_main_active(None);
        }
    }

    fn focus_first_item(&mut self) {
        let first = self.visible_items().first().map(|n| n.id.clone());
        self.set_main_active(first);
    }

    fn is_folder(&self, id: &NodeId) -> bool {
        id.is_root() || find_node(&self.forest, id).map_or(false, Node::is_folder)
    }

    fn emit_log_state(&self) {
        self.listener
            .on_command_log_changed(self.log.can_undo(), self.log.can_redo());
    }

    fn emit_search_state(&self) {
        self.listener
            .on_search_results_changed(self.search.query(), self.search.results().len());
    }

    /// Refetch the forest and re-anchor the selection.
    ///
    /// `anchor` wins when it still names a folder. Otherwise the current
    /// selection is kept, or its deepest surviving ancestor, or the root.
    pub async fn refresh(&mut self, anchor: Option<NodeId>) -> Result<(), ApiError> {
        let trail = breadcrumbs(&self.forest, &self.selected);
        self.forest = self
            .repo
            .fetch_tree()
            .await
            .map_err(|e| store_failure("refresh", e))?;

        let candidates = anchor
            .into_iter()
            .chain(std::iter::once(self.selected.clone()))
            .chain(trail.into_iter().rev().map(|crumb| crumb.id));
        let mut next = NodeId::root();
        for id in candidates {
            if self.is_folder(&id) {
                next = id;
                break;
            }
        }
        self.set_selected(next);
        self.reconcile_focus();
        Ok(())
    }

    /// Enter `folder`. An active search is stashed so `back` can return to it.
    pub fn select_folder(&mut self, folder: &NodeId) -> Result<(), ApiError> {
        if !self.is_folder(folder) {
            return Err(ApiError::FolderNotFound(folder.clone()));
        }
        let was_searching = self.search.is_active();
        self.search.enter_folder();
        self.debouncer.supersede("");
        if was_searching {
            self.emit_search_state();
        }
        self.set_selected(folder.clone());
        self.reconcile_focus();
        Ok(())
    }

    /// Virtual root, no query, no snapshot
    pub fn go_home(&mut self) {
        let was_searching = self.search.is_active() || self.search.snapshot().is_some();
        self.search.reset();
        self.debouncer.supersede("");
        if was_searching {
            self.emit_search_state();
        }
        self.set_selected(NodeId::root());
        self.reconcile_focus();
    }

    /// Return to the stashed search, or else to the parent folder.
    /// Focus lands on the first rendered item.
    pub fn back(&mut self) {
        if self.search.restore() {
            self.debouncer.supersede(self.search.query());
            debug!(query = %self.search.query(), "Returned to search results");
            self.emit_search_state();
        } else if !self.selected.is_root() {
            let parent = parent_of(&self.forest, &self.selected);
            self.set_selected(parent);
        }
        self.focus_first_item();
    }

    /// Replace the live query and schedule a debounced lookup.
    ///
    /// Must be called from within a tokio runtime.
    pub fn set_query(&mut self, query: &str) {
        let had_results = !self.search.results().is_empty();
        self.search.set_query(query);
        self.debouncer.schedule(query, Arc::clone(&self.repo));
        if !self.search.is_active() && had_results {
            self.emit_search_state();
        }
        self.reconcile_focus();
    }

    fn apply_search_result(&mut self, result: SearchResult) -> Result<bool, ApiError> {
        let results = result.outcome.map_err(|e| store_failure("search", e))?;
        let count = results.len();
        if !self.search.apply(&result.query, results) {
            debug!(query = %result.query, live = %self.search.query(), "Discarded stale search results");
            return Ok(false);
        }
        debug!(query = %result.query, count, "Search results applied");
        self.emit_search_state();
        self.reconcile_focus();
        Ok(true)
    }

    /// Wait for the next scheduled lookup to finish and apply it.
    ///
    /// Returns false when the results were stale. Only call this after
    /// scheduling a non-blank query; otherwise it waits forever.
    pub async fn await_search(&mut self) -> Result<bool, ApiError> {
        match self.debouncer.next_result().await {
            Some(result) => self.apply_search_result(result),
            None => Ok(false),
        }
    }

    /// Apply every lookup that has already finished. Returns how many applied.
    pub fn poll_search(&mut self) -> Result<usize, ApiError> {
        let mut applied = 0;
        while let Some(result) = self.debouncer.try_next_result() {
            if self.apply_search_result(result)? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Move main pane focus using the rendered geometry in `layout`
    pub fn navigate<L>(&mut self, direction: Direction, layout: &L) -> Result<NavOutcome, ApiError>
    where
        L: LayoutSource + ?Sized,
    {
        let outcome = self
            .navigator
            .navigate(layout, self.main_active.as_ref(), direction);
        debug!(?direction, ?outcome, "Grid navigation");
        match &outcome {
            NavOutcome::Move(id) | NavOutcome::Stay(id) => {
                self.pane = Pane::Main;
                self.set_main_active(Some(id.clone()));
            }
            NavOutcome::Handoff => self.hand_off_to_sidebar()?,
            NavOutcome::NoTarget => {}
        }
        Ok(outcome)
    }

    fn hand_off_to_sidebar(&mut self) -> Result<(), ApiError> {
        self.set_main_active(None);
        self.pane = Pane::Sidebar;
        self.listener.on_request_pane_handoff(Direction::Left);
        if self.selected.is_root() && !self.search.is_active() {
            if let Some(first) = self.forest.iter().find(|n| n.is_folder()).map(|n| n.id.clone()) {
                self.select_folder(&first)?;
            }
        }
        Ok(())
    }

    /// Focus the main pane, landing on the first item if nothing is focused
    pub fn focus_main(&mut self) {
        self.pane = Pane::Main;
        if self.main_active.is_none() {
            self.focus_first_item();
        }
    }

    pub fn focus_sidebar(&mut self) {
        self.pane = Pane::Sidebar;
    }

    pub fn focus_search(&mut self) {
        self.pane = Pane::Search;
    }

    /// Handle a key while the sidebar has focus
    pub fn sidebar_key(&mut self, key: SidebarKey) -> Result<SidebarAction, ApiError> {
        let selected = self.selected.clone();
        let action = self.sidebar.handle_key(&self.forest, &selected, key);
        match &action {
            SidebarAction::Select(id) => self.select_folder(id)?,
            SidebarAction::FocusMain => self.focus_main(),
            SidebarAction::SelectAndFocusMain(id) => {
                self.select_folder(id)?;
                self.focus_main();
            }
            SidebarAction::Toggled(_) | SidebarAction::Nothing => {}
        }
        Ok(action)
    }

    /// Activate the focused main item: enter a folder or open a link
    pub fn open_active(&mut self) -> Result<(), ApiError> {
        let Some(active) = self.main_active.clone() else {
            return Ok(());
        };
        let target = self
            .visible_items()
            .into_iter()
            .find(|n| n.id == active)
            .map(|n| (n.is_folder(), n.url().map(str::to_string)));
        match target {
            Some((true, _)) => {
                self.select_folder(&active)?;
                self.focus_first_item();
            }
            Some((false, Some(url))) => {
                info!(url = %url, "Opening link");
                self.listener.on_open_url(&url);
            }
            _ => {}
        }
        Ok(())
    }

    pub fn pane_width(&self) -> f64 {
        self.pane_width.width()
    }

    pub fn drag_sidebar(&mut self, x: f64) -> f64 {
        self.pane_width.drag_to(x)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom.factor()
    }

    /// Wheel events zoom only while ctrl is held
    pub fn wheel(&mut self, delta_y: f64, ctrl: bool) -> f64 {
        if ctrl {
            self.zoom.apply_wheel(delta_y);
        }
        self.zoom.factor()
    }

    fn record(&mut self, command: Command) {
        self.log.record(command);
        self.emit_log_state();
    }

    pub async fn create_folder(&mut self, parent: &NodeId, title: &str) -> Result<Node, ApiError> {
        let _permit = self.gate.try_begin("create folder")?;
        let node = self
            .repo
            .create_folder(parent, title)
            .await
            .map_err(|e| store_failure("create folder", e))?;
        info!(id = %node.id, parent = %parent, "Folder created");
        self.record(Command::Add {
            id: node.id.clone(),
            parent_id: parent.clone(),
            is_folder: true,
            title: title.to_string(),
            url: None,
        });
        self.refresh(None).await?;
        Ok(node)
    }

    /// Create a link. `url` is stored as given; validate it beforehand.
    pub async fn create_bookmark(&mut self, parent: &NodeId, title: &str, url: &str) -> Result<Node, ApiError> {
        let _permit = self.gate.try_begin("create bookmark")?;
        let node = self
            .repo
            .create_bookmark(parent, title, url)
            .await
            .map_err(|e| store_failure("create bookmark", e))?;
        info!(id = %node.id, parent = %parent, "Bookmark created");
        self.record(Command::Add {
            id: node.id.clone(),
            parent_id: parent.clone(),
            is_folder: false,
            title: title.to_string(),
            url: Some(url.to_string()),
        });
        self.refresh(None).await?;
        Ok(node)
    }

    fn current_node(&self, id: &NodeId) -> Result<&Node, ApiError> {
        if id.is_root() {
            return Err(StorageError::RootImmutable.into());
        }
        find_node(&self.forest, id).ok_or_else(|| StorageError::NotFound(id.clone()).into())
    }

    /// Change the title of any node
    pub async fn rename(&mut self, id: &NodeId, title: &str) -> Result<Node, ApiError> {
        let prev_title = self.current_node(id)?.title.clone();
        let _permit = self.gate.try_begin("rename")?;
        let node = self
            .repo
            .rename_title(id, title)
            .await
            .map_err(|e| store_failure("rename", e))?;
        info!(id = %id, "Renamed");
        self.record(Command::Update {
            id: id.clone(),
            prev_title,
            prev_url: None,
            next_title: Some(title.to_string()),
            next_url: None,
        });
        self.refresh(None).await?;
        Ok(node)
    }

    /// Change title and url of a link
    pub async fn edit_bookmark(&mut self, id: &NodeId, title: &str, url: &str) -> Result<Node, ApiError> {
        let current = self.current_node(id)?;
        let prev_title = current.title.clone();
        let prev_url = current
            .url()
            .map(str::to_string)
            .ok_or_else(|| ApiError::from(StorageError::NotALink(id.clone())))?;
        let _permit = self.gate.try_begin("edit bookmark")?;
        let node = self
            .repo
            .update_bookmark_fields(id, Some(title), Some(url))
            .await
            .map_err(|e| store_failure("edit bookmark", e))?;
        info!(id = %id, "Bookmark edited");
        self.record(Command::Update {
            id: id.clone(),
            prev_title,
            prev_url: Some(prev_url),
            next_title: Some(title.to_string()),
            next_url: Some(url.to_string()),
        });
        self.refresh(None).await?;
        Ok(node)
    }

    /// Delete a node and everything below it.
    ///
    /// Deleting the selected folder, or one of its ancestors, moves the
    /// selection to the deleted node's parent.
    pub async fn delete_node(&mut self, id: &NodeId) -> Result<(), ApiError> {
        let node = self.current_node(id)?;
        let snapshot = node.snapshot();
        let parent_id = node.parent_id.clone();
        let selection_inside = self.breadcrumbs().iter().any(|crumb| &crumb.id == id);

        let _permit = self.gate.try_begin("delete")?;
        self.repo
            .delete_subtree(id)
            .await
            .map_err(|e| store_failure("delete", e))?;
        info!(id = %id, nodes = snapshot.len(), "Deleted");
        self.record(Command::Delete {
            id: id.clone(),
            parent_id: parent_id.clone(),
            snapshot,
        });
        let anchor = selection_inside.then_some(parent_id);
        self.refresh(anchor).await
    }

    /// Two-step delete from the sidebar. The first call for an id only arms
    /// it; returns true once the delete went through.
    pub async fn request_delete(&mut self, id: &NodeId) -> Result<bool, ApiError> {
        if !self.sidebar.request_delete(id) {
            return Ok(false);
        }
        self.delete_node(id).await?;
        Ok(true)
    }

    pub async fn undo(&mut self) -> Result<ReplayOutcome, ApiError> {
        let _permit = self.gate.try_begin("undo")?;
        let outcome = self.log.undo(self.repo.as_ref()).await;
        // A restored subtree is shown from the folder it came back into
        let anchor = match &outcome {
            ReplayOutcome::Applied(Command::Delete { parent_id, .. }) => Some(parent_id.clone()),
            _ => None,
        };
        self.after_replay(&outcome, anchor).await?;
        Ok(outcome)
    }

    pub async fn redo(&mut self) -> Result<ReplayOutcome, ApiError> {
        let _permit = self.gate.try_begin("redo")?;
        let outcome = self.log.redo(self.repo.as_ref()).await;
        self.after_replay(&outcome, None).await?;
        Ok(outcome)
    }

    async fn after_replay(&mut self, outcome: &ReplayOutcome, anchor: Option<NodeId>) -> Result<(), ApiError> {
        if matches!(outcome, ReplayOutcome::Empty) {
            return Ok(());
        }
        self.emit_log_state();
        self.refresh(anchor).await
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn prompt_mut(&mut self) -> Option<&mut Prompt> {
        self.prompt.as_mut()
    }

    pub fn open_prompt(&mut self, prompt: Prompt) {
        self.prompt = Some(prompt);
    }

    /// Open the edit prompt for an existing node
    pub fn open_edit_prompt(&mut self, id: &NodeId) -> Result<(), ApiError> {
        let prompt = Prompt::edit(self.current_node(id)?);
        self.prompt = Some(prompt);
        Ok(())
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    /// Submit the open prompt.
    ///
    /// A validation or store error leaves the prompt open. On success the
    /// prompt closes: a new folder becomes selected, a new link selects its
    /// parent, an edit keeps the selection.
    pub async fn submit_prompt(&mut self) -> Result<Node, ApiError> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Err(ApiError::InvalidCommand("No prompt is open".to_string()));
        };
        let mode = prompt.mode().clone();
        let title = prompt.title().to_string();
        let url = if prompt.needs_url() {
            Some(prompt.checked_url()?)
        } else {
            None
        };

        let node = match (&mode, url) {
            (PromptMode::AddFolder { parent }, _) => {
                let node = self.create_folder(parent, &title).await?;
                self.select_folder(&node.id)?;
                node
            }
            (PromptMode::AddBookmark { parent }, Some(url)) => {
                let node = self.create_bookmark(parent, &title, &url).await?;
                self.select_folder(parent)?;
                node
            }
            (PromptMode::Edit { target, .. }, Some(url)) => self.edit_bookmark(target, &title, &url).await?,
            (PromptMode::Edit { target, .. }, None) => self.rename(target, &title).await?,
            (PromptMode::AddBookmark { .. }, None) => {
                return Err(ApiError::InvalidCommand("Bookmark prompt has no url".to_string()))
            }
        };
        self.prompt = None;
        Ok(node)
    }

    /// Execute a keyboard intent
    pub async fn dispatch<L>(&mut self, intent: Intent, layout: &L) -> Result<(), ApiError>
    where
        L: LayoutSource + ?Sized,
    {
        match intent {
            Intent::Undo => {
                self.undo().await?;
            }
            Intent::Redo => {
                self.redo().await?;
            }
            Intent::FocusSearch => self.focus_search(),
            Intent::ClearSearch => {
                if self.search.is_active() {
                    self.set_query("");
                }
            }
            Intent::Navigate(direction) => match self.pane {
                Pane::Main => {
                    self.navigate(direction, layout)?;
                }
                Pane::Sidebar => {
                    let key = match direction {
                        Direction::Up => Some(SidebarKey::Up),
                        Direction::Down => Some(SidebarKey::Down),
                        Direction::Right => Some(SidebarKey::Right),
                        Direction::Left => None,
                    };
                    if let Some(key) = key {
                        self.sidebar_key(key)?;
                    }
                }
                Pane::Search => {}
            },
            Intent::Activate => match self.pane {
                Pane::Main => self.open_active()?,
                Pane::Sidebar => {
                    self.sidebar_key(SidebarKey::Enter)?;
                }
                Pane::Search => {}
            },
            Intent::Back => self.back(),
        }
        Ok(())
    }
}
