//! Command Log
//!
//! Every completed mutation is recorded as a `Command` that knows how to replay
//! itself forward and backward against a `BookmarkRepository`. Undo and redo
//! move commands between two stacks. A repository rejection while replaying
//! drops the command from both stacks; there is no undo of a failed undo.
//!
//! Replays are not id-stable. Recreating a deleted subtree or redoing an add
//! yields fresh ids from the repository, and the command moved to the other
//! stack carries the new id so the next replay targets the live node.

use crate::error::StorageError;
use crate::store::{recreate_subtree, BookmarkRepository};
use crate::tree::NodeSnapshot;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A completed, reversible mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// A folder or link was created. Inverse: delete `id`.
    Add {
        id: NodeId,
        parent_id: NodeId,
        is_folder: bool,
        title: String,
        url: Option<String>,
    },
    /// A subtree was deleted. Inverse: recreate `snapshot` under `parent_id`.
    Delete {
        /// Current incarnation of the subtree root
        id: NodeId,
        parent_id: NodeId,
        snapshot: NodeSnapshot,
    },
    /// Title and/or url changed. Inverse: write the prev fields back.
    Update {
        id: NodeId,
        prev_title: String,
        prev_url: Option<String>,
        next_title: Option<String>,
        next_url: Option<String>,
    },
}

impl Command {
    /// Node the command currently targets
    pub fn target(&self) -> &NodeId {
        match self {
            Command::Add { id, .. } | Command::Delete { id, .. } | Command::Update { id, .. } => id,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Delete { .. } => "delete",
            Command::Update { .. } => "update",
        }
    }

    fn is_title_only(prev_url: &Option<String>, next_url: &Option<String>) -> bool {
        prev_url.is_none() && next_url.is_none()
    }

    /// Apply the inverse. Returns the command to push onto the redo stack.
    async fn revert(self, repo: &dyn BookmarkRepository) -> Result<Command, StorageError> {
        match self {
            Command::Add { ref id, .. } => {
                repo.delete_subtree(id).await?;
                Ok(self)
            }
            Command::Delete {
                id: _,
                parent_id,
                snapshot,
            } => {
                let restored = recreate_subtree(repo, &parent_id, &snapshot).await?;
                Ok(Command::Delete {
                    id: restored,
                    parent_id,
                    snapshot,
                })
            }
            Command::Update {
                ref id,
                ref prev_title,
                ref prev_url,
                ref next_url,
                ..
            } => {
                if Self::is_title_only(prev_url, next_url) {
                    repo.rename_title(id, prev_title).await?;
                } else {
                    repo.update_bookmark_fields(id, Some(prev_title), prev_url.as_deref())
                        .await?;
                }
                Ok(self)
            }
        }
    }

    /// Apply the forward operation again. Returns the command to push onto the
    /// undo stack.
    async fn replay(self, repo: &dyn BookmarkRepository) -> Result<Command, StorageError> {
        match self {
            Command::Add {
                id: _,
                parent_id,
                is_folder,
                title,
                url,
            } => {
                let created = if is_folder {
                    repo.create_folder(&parent_id, &title).await?
                } else {
                    repo.create_bookmark(&parent_id, &title, url.as_deref().unwrap_or(""))
                        .await?
                };
                Ok(Command::Add {
                    id: created.id,
                    parent_id,
                    is_folder,
                    title,
                    url,
                })
            }
            Command::Delete { ref id, .. } => {
                repo.delete_subtree(id).await?;
                Ok(self)
            }
            Command::Update {
                ref id,
                ref prev_title,
                ref prev_url,
                ref next_title,
                ref next_url,
            } => {
                let title = next_title.as_deref().unwrap_or(prev_title);
                if Self::is_title_only(prev_url, next_url) {
                    repo.rename_title(id, title).await?;
                } else {
                    let url = next_url.as_deref().or(prev_url.as_deref());
                    repo.update_bookmark_fields(id, Some(title), url).await?;
                }
                Ok(self)
            }
        }
    }
}

/// Result of one undo or redo step
#[derive(Debug)]
pub enum ReplayOutcome {
    /// The stack was empty; nothing happened
    Empty,
    /// Replay succeeded; the command now sits on the opposite stack
    Applied(Command),
    /// The repository rejected the replay; the command is gone
    Dropped {
        command: Command,
        error: StorageError,
    },
}

impl ReplayOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ReplayOutcome::Applied(_))
    }
}

/// Undo/redo stacks for one session
#[derive(Debug, Default)]
pub struct CommandLog {
    undo: Vec<Command>,
    redo: Vec<Command>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed mutation. Clears the redo stack.
    pub fn record(&mut self, command: Command) {
        debug!(kind = command.label(), target = %command.target(), "Recorded command");
        self.undo.push(command);
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Most recent undoable command
    pub fn peek_undo(&self) -> Option<&Command> {
        self.undo.last()
    }

    pub fn peek_redo(&self) -> Option<&Command> {
        self.redo.last()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Revert the most recent command
    pub async fn undo(&mut self, repo: &dyn BookmarkRepository) -> ReplayOutcome {
        let Some(command) = self.undo.pop() else {
            return ReplayOutcome::Empty;
        };
        let kind = command.label();
        let original = command.clone();
        match command.revert(repo).await {
            Ok(reverted) => {
                info!(kind, target = %reverted.target(), "Undo applied");
                self.redo.push(reverted.clone());
                ReplayOutcome::Applied(reverted)
            }
            Err(error) => {
                warn!(kind, target = %original.target(), error = %error, "Undo failed; entry discarded");
                ReplayOutcome::Dropped {
                    command: original,
                    error,
                }
            }
        }
    }

    /// Replay the most recently undone command
    pub async fn redo(&mut self, repo: &dyn BookmarkRepository) -> ReplayOutcome {
        let Some(command) = self.redo.pop() else {
            return ReplayOutcome::Empty;
        };
        let kind = command.label();
        let original = command.clone();
        match command.replay(repo).await {
            Ok(replayed) => {
                info!(kind, target = %replayed.target(), "Redo applied");
                self.undo.push(replayed.clone());
                ReplayOutcome::Applied(replayed)
            }
            Err(error) => {
                warn!(kind, target = %original.target(), error = %error, "Redo failed; entry discarded");
                ReplayOutcome::Dropped {
                    command: original,
                    error,
                }
            }
        }
    }
}
