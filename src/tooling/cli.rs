//! CLI Tooling
//!
//! Command-line interface over a bookmark store. One-shot commands run a
//! fresh `Session` per invocation; `shell` keeps one session alive so undo and
//! redo work across commands.

use crate::config::{BooknavConfig, ConfigLoader, StoreBackend};
use crate::error::{ApiError, StorageError, ValidationError};
use crate::session::{is_plausible_url, normalize_url, RecordingListener, Session};
use crate::store::sample::{sample_library, seed};
use crate::store::{BookmarkRepository, MemoryRepository, SledRepository};
use crate::tooling::format::{
    format_breadcrumbs, format_listing, format_node_line, format_search_results, format_tree_text,
};
use crate::tooling::shell::Shell;
use crate::tree::{find_node, NodeSnapshot};
use crate::types::NodeId;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// booknav - keyboard-driven bookmark navigator
#[derive(Parser)]
#[command(name = "booknav")]
#[command(about = "Browse, search and edit a bookmark tree with undo/redo")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Sled store directory (overrides store.path)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Use a throwaway in-memory store seeded with the sample library
    #[arg(long)]
    pub memory: bool,

    /// Enable verbose logging to stderr
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Load configuration and apply command-line overrides
    pub fn load_config(&self) -> Result<BooknavConfig, ApiError> {
        let mut config = ConfigLoader::load_or_default(self.config.as_deref())?;
        if let Some(store) = &self.store {
            config.store.backend = StoreBackend::Sled;
            config.store.path = Some(store.clone());
            config.store.seed_sample = false;
        }
        if self.memory {
            config.store.backend = StoreBackend::Memory;
            config.store.seed_sample = true;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
            config.logging.output = "stderr".to_string();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the top-level folders, optionally with the sample library
    Init {
        /// Seed the sample library instead of empty folders
        #[arg(long)]
        sample: bool,
        /// Wipe an existing store first
        #[arg(long)]
        force: bool,
    },
    /// Print the folder hierarchy
    Tree,
    /// List a folder (folders first, then links)
    Ls {
        /// Folder id; omit for the top level
        folder: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Case-insensitive search over titles and urls
    Search {
        query: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Create a folder
    AddFolder {
        /// Parent folder id, or `root` for a top-level folder
        parent: String,
        title: String,
    },
    /// Create a link
    AddLink {
        /// Parent folder id
        parent: String,
        title: String,
        url: String,
        /// Save a url that does not look valid
        #[arg(long)]
        force: bool,
    },
    /// Change the title of a folder or link
    Rename { id: String, title: String },
    /// Change title and/or url of a link
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        /// Save a url that does not look valid
        #[arg(long)]
        force: bool,
    },
    /// Delete a folder or link with everything below it
    Delete { id: String },
    /// Interactive session over stdin with undo/redo
    Shell,
}

/// Parse a node id argument; `root` names the virtual root
pub fn parse_node_id(raw: &str) -> NodeId {
    match raw.trim() {
        "root" | "/" => NodeId::root(),
        other => NodeId::new(other),
    }
}

/// Normalize a url for one-shot commands; `force` accepts implausible urls
fn checked_url(raw: &str, force: bool) -> Result<String, ApiError> {
    let url = normalize_url(raw)?;
    if !force && !is_plausible_url(&url) {
        return Err(ValidationError::SuspiciousUrl { url }.into());
    }
    Ok(url)
}

/// CLI context: configuration, repository and the runtime that drives it
pub struct CliContext {
    config: BooknavConfig,
    repo: Arc<dyn BookmarkRepository>,
    runtime: tokio::runtime::Runtime,
}

impl CliContext {
    /// Open the configured repository
    pub fn new(config: BooknavConfig) -> Result<Self, ApiError> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))?;

        let repo: Arc<dyn BookmarkRepository> = match config.store.backend {
            StoreBackend::Sled => {
                let path = config.store.resolve_path()?;
                info!(path = %path.display(), "Opening sled store");
                Arc::new(SledRepository::open_sled(&path)?)
            }
            StoreBackend::Memory => {
                let repo = MemoryRepository::in_memory();
                if config.store.seed_sample {
                    runtime.block_on(seed(&repo, &sample_library()))?;
                }
                Arc::new(repo)
            }
        };

        Ok(Self {
            config,
            repo,
            runtime,
        })
    }

    pub fn config(&self) -> &BooknavConfig {
        &self.config
    }

    pub fn repository(&self) -> Arc<dyn BookmarkRepository> {
        Arc::clone(&self.repo)
    }

    fn open_session(&self) -> Result<Session, ApiError> {
        let mut session = Session::new(Arc::clone(&self.repo), &self.config.session);
        self.runtime.block_on(session.open())?;
        Ok(session)
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Shell => {
                let stdin = std::io::stdin();
                let mut stdout = std::io::stdout();
                self.run_shell(stdin.lock(), &mut stdout)
            }
            other => self.execute_inner(other),
        }
    }

    /// Run the interactive shell over `input`, echoing to `output`
    pub fn run_shell<R: BufRead, W: Write>(&self, input: R, output: &mut W) -> Result<String, ApiError> {
        let listener = Arc::new(RecordingListener::new());
        let session = self.open_session()?.with_listener(listener.clone());
        let mut shell = Shell::new(session, listener);
        let executed = self.runtime.block_on(shell.run(input, output))?;
        Ok(format!("Session ended after {} commands", executed))
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Init { sample, force } => self.runtime.block_on(self.init(*sample, *force)),
            Commands::Tree => {
                let forest = self.runtime.block_on(self.repo.fetch_tree())?;
                Ok(format_tree_text(&forest))
            }
            Commands::Ls { folder, format } => {
                let mut session = self.open_session()?;
                let heading = match folder.as_deref().map(parse_node_id) {
                    Some(id) if !id.is_root() => {
                        session.select_folder(&id)?;
                        format_breadcrumbs(&session.breadcrumbs())
                    }
                    _ => "/".to_string(),
                };
                let children = match session.active_folder() {
                    Some(folder) => folder.children().to_vec(),
                    None => session.forest().to_vec(),
                };
                format_listing(&heading, &children, format)
            }
            Commands::Search { query, format } => {
                let results = self.runtime.block_on(self.repo.search(query))?;
                format_search_results(query, &results, format)
            }
            Commands::AddFolder { parent, title } => {
                let mut session = self.open_session()?;
                let parent = parse_node_id(parent);
                let node = self.runtime.block_on(session.create_folder(&parent, title))?;
                Ok(format!("Created folder {}", format_node_line(&node)))
            }
            Commands::AddLink {
                parent,
                title,
                url,
                force,
            } => {
                let url = checked_url(url, *force)?;
                let mut session = self.open_session()?;
                let parent = parse_node_id(parent);
                let node = self
                    .runtime
                    .block_on(session.create_bookmark(&parent, title, &url))?;
                Ok(format!("Created link {}", format_node_line(&node)))
            }
            Commands::Rename { id, title } => {
                let mut session = self.open_session()?;
                let node = self
                    .runtime
                    .block_on(session.rename(&parse_node_id(id), title))?;
                Ok(format!("Renamed {}", format_node_line(&node)))
            }
            Commands::Edit {
                id,
                title,
                url,
                force,
            } => {
                if title.is_none() && url.is_none() {
                    return Err(ApiError::InvalidCommand(
                        "edit needs --title and/or --url".to_string(),
                    ));
                }
                let mut session = self.open_session()?;
                let id = parse_node_id(id);
                let current = find_node(session.forest(), &id)
                    .cloned()
                    .ok_or_else(|| StorageError::NotFound(id.clone()))?;
                let title = title.clone().unwrap_or_else(|| current.title.clone());
                let node = match (url, current.url()) {
                    (Some(url), _) => {
                        let url = checked_url(url, *force)?;
                        self.runtime.block_on(session.edit_bookmark(&id, &title, &url))?
                    }
                    (None, Some(existing)) => {
                        let existing = existing.to_string();
                        self.runtime
                            .block_on(session.edit_bookmark(&id, &title, &existing))?
                    }
                    (None, None) => self.runtime.block_on(session.rename(&id, &title))?,
                };
                Ok(format!("Updated {}", format_node_line(&node)))
            }
            Commands::Delete { id } => {
                let mut session = self.open_session()?;
                let id = parse_node_id(id);
                let removed = find_node(session.forest(), &id)
                    .map(|n| n.snapshot().len())
                    .unwrap_or(0);
                self.runtime.block_on(session.delete_node(&id))?;
                Ok(format!("Deleted {} ({} nodes)", id, removed))
            }
            Commands::Shell => Err(ApiError::InvalidCommand(
                "shell must be run through execute".to_string(),
            )),
        }
    }

    async fn init(&self, sample: bool, force: bool) -> Result<String, ApiError> {
        let existing = self.repo.fetch_tree().await?;
        if !existing.is_empty() {
            if !force {
                return Ok(format!(
                    "Store already has {} top-level folders. Use --force to reinitialize.",
                    existing.len()
                ));
            }
            for node in &existing {
                self.repo.delete_subtree(&node.id).await?;
            }
        }

        let library = if sample {
            sample_library()
        } else {
            ["Bookmarks Bar", "Other Bookmarks"]
                .iter()
                .map(|title| NodeSnapshot::Folder {
                    title: title.to_string(),
                    children: Vec::new(),
                })
                .collect()
        };
        let ids = seed(self.repo.as_ref(), &library).await?;
        info!(folders = ids.len(), sample, "Store initialized");
        let nodes: usize = library.iter().map(NodeSnapshot::len).sum();
        Ok(format!(
            "Initialized store with {} top-level folders ({} nodes)",
            ids.len(),
            nodes
        ))
    }
}
