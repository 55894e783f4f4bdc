//! Line-oriented shell over one long-lived `Session`.
//!
//! Every line is one command. Errors are printed and the loop keeps going, so
//! a rejected url can be confirmed on the next line and undo/redo see the
//! whole session's history.

use crate::error::{ApiError, StorageError, ValidationError};
use crate::keymap::{resolve, KeyInput};
use crate::navigator::{uniform_grid, Direction};
use crate::session::{Pane, Prompt, RecordingListener, Session, SessionEvent};
use crate::tooling::cli::parse_node_id;
use crate::tooling::format::{
    format_breadcrumbs, format_items_table, format_node_line, format_replay_outcome,
    format_sidebar_rows,
};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::debug;

/// Columns of the virtual grid the shell lays items out on
const GRID_COLUMNS: usize = 4;
const CELL_WIDTH: f64 = 160.0;
const CELL_HEIGHT: f64 = 96.0;

/// One shell line; the first word names the command
#[derive(Debug, Parser)]
#[command(multicall = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShellCommand {
    /// List the items of the current folder or search
    Ls,
    /// Show the path to the current folder
    Crumbs,
    /// Show the folder tree
    #[command(alias = "tree")]
    Sidebar,
    /// Enter a folder
    Cd {
        /// Folder id, or `root`
        id: String,
    },
    /// Return to the previous folder
    Back,
    /// Return to the top of the tree
    Home,
    /// Filter every link by title or url; no text clears
    Search {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Create a folder in the current folder
    Mkdir {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        title: Vec<String>,
    },
    /// Create a link in the current folder
    Add {
        url: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        title: Vec<String>,
    },
    /// Retitle a node through the edit prompt
    Edit {
        id: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        title: Vec<String>,
    },
    /// Change the url of a link
    Url { id: String, url: String },
    /// Save the open prompt despite a url warning
    Confirm,
    /// Close the open prompt
    Cancel,
    /// Retitle a node directly
    Rename {
        id: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        title: Vec<String>,
    },
    /// Delete a node; asks once before deleting
    Rm { id: String },
    /// Revert the last change
    Undo,
    /// Reapply the last undone change
    Redo,
    /// Move keyboard focus to a pane
    Focus {
        #[arg(value_enum)]
        pane: FocusPane,
    },
    /// Press a key chord, e.g. `right`, `ctrl+z`, `enter`
    Key { chord: String },
    /// Open the focused link
    Open,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FocusPane {
    Main,
    Sidebar,
    Search,
}

/// A word of a shell line and the whitespace before it
#[derive(Debug, Clone, PartialEq, Eq)]
struct Word {
    text: String,
    gap: String,
}

/// Split a line on whitespace; single or double quotes group words
fn split_words(line: &str) -> Result<Vec<Word>, ApiError> {
    let mut words = Vec::new();
    let mut chars = line.chars().peekable();
    loop {
        let mut gap = String::new();
        while let Some(c) = chars.peek().copied().filter(|c| c.is_whitespace()) {
            gap.push(c);
            chars.next();
        }
        if chars.peek().is_none() {
            return Ok(words);
        }
        let mut text = String::new();
        while let Some(c) = chars.peek().copied() {
            if c.is_whitespace() {
                break;
            }
            chars.next();
            if c == '"' || c == '\'' {
                loop {
                    match chars.next() {
                        Some(q) if q == c => break,
                        Some(other) => text.push(other),
                        None => return Err(ApiError::InvalidCommand(format!("Unterminated {} quote", c))),
                    }
                }
            } else {
                text.push(c);
            }
        }
        words.push(Word { text, gap });
    }
}

/// Rejoin the last `count` words with their original spacing
fn trailing_text(words: &[Word], count: usize) -> String {
    let start = words.len().saturating_sub(count);
    let mut text = String::new();
    for (i, word) in words[start..].iter().enumerate() {
        if i > 0 {
            text.push_str(&word.gap);
        }
        text.push_str(&word.text);
    }
    text
}

/// Result of one shell line
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

pub struct Shell {
    session: Session,
    events: Arc<RecordingListener>,
}

impl Shell {
    /// `events` must be the listener installed on `session`
    pub fn new(session: Session, events: Arc<RecordingListener>) -> Self {
        Self { session, events }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read commands until EOF or `quit`. Returns how many lines ran.
    pub async fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<usize, ApiError> {
        let mut executed = 0;
        writeln!(output, "booknav shell; type `help` for commands")?;
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let reply = self.execute_line(&line).await;
            executed += 1;
            match reply {
                Ok(Reply::Quit) => break,
                Ok(Reply::Text(text)) => {
                    if !text.is_empty() {
                        writeln!(output, "{}", text)?;
                    }
                }
                Err(e) => writeln!(output, "Error: {}", e)?,
            }
            for note in self.drain_notes() {
                writeln!(output, "{}", note)?;
            }
        }
        output.flush()?;
        Ok(executed)
    }

    /// Listener events worth echoing to the terminal
    fn drain_notes(&self) -> Vec<String> {
        self.events
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::OpenUrl(url) => Some(format!("Opening {}", url)),
                SessionEvent::PaneHandoff(Direction::Left) => Some("Focus moved to the sidebar".to_string()),
                _ => None,
            })
            .collect()
    }

    pub async fn execute_line(&mut self, line: &str) -> Result<Reply, ApiError> {
        let words = split_words(line)?;
        if words.is_empty() {
            return Ok(Reply::Text(String::new()));
        }
        let command = match ShellLine::try_parse_from(words.iter().map(|word| word.text.as_str())) {
            Ok(parsed) => parsed.command,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                return Ok(Reply::Text(e.to_string().trim_end().to_string()))
            }
            Err(e) => return Err(ApiError::InvalidCommand(e.to_string().trim_end().to_string())),
        };
        debug!(?command, "Shell command");

        let text = match command {
            ShellCommand::Quit => return Ok(Reply::Quit),
            ShellCommand::Ls => self.listing(),
            ShellCommand::Crumbs => format_breadcrumbs(&self.session.breadcrumbs()),
            ShellCommand::Sidebar => {
                format_sidebar_rows(&self.session.sidebar_rows(), self.session.selected_folder())
            }
            ShellCommand::Cd { id } => {
                let id = parse_node_id(&id);
                if id.is_root() {
                    self.session.go_home();
                } else {
                    self.session.select_folder(&id)?;
                }
                format_breadcrumbs(&self.session.breadcrumbs())
            }
            ShellCommand::Back => {
                self.session.back();
                self.position()
            }
            ShellCommand::Home => {
                self.session.go_home();
                "/".to_string()
            }
            ShellCommand::Search { query } => self.search(&trailing_text(&words, query.len())).await?,
            ShellCommand::Mkdir { title } => {
                let title = trailing_text(&words, title.len());
                let parent = self.session.selected_folder().clone();
                self.session.open_prompt(Prompt::add_folder(parent));
                self.fill_prompt(Some(&title), None)?;
                self.submit().await?
            }
            ShellCommand::Add { url, title } => {
                let title = trailing_text(&words, title.len());
                let parent = self.session.selected_folder().clone();
                if parent.is_root() {
                    return Err(ApiError::InvalidCommand("cd into a folder before adding a link".to_string()));
                }
                self.session.open_prompt(Prompt::add_bookmark(parent));
                self.fill_prompt(Some(&title), Some(&url))?;
                self.submit().await?
            }
            ShellCommand::Edit { id, title } => {
                let id = parse_node_id(&id);
                let title = trailing_text(&words, title.len());
                self.session.open_edit_prompt(&id)?;
                self.fill_prompt(Some(&title), None)?;
                self.submit().await?
            }
            ShellCommand::Url { id, url } => {
                let id = parse_node_id(&id);
                self.session.open_edit_prompt(&id)?;
                if !self.session.prompt().map(Prompt::needs_url).unwrap_or(false) {
                    self.session.cancel_prompt();
                    return Err(StorageError::NotALink(id).into());
                }
                self.fill_prompt(None, Some(&url))?;
                self.submit().await?
            }
            ShellCommand::Confirm => self.submit().await?,
            ShellCommand::Cancel => {
                self.session.cancel_prompt();
                "Cancelled".to_string()
            }
            ShellCommand::Rename { id, title } => {
                let id = parse_node_id(&id);
                let title = trailing_text(&words, title.len());
                let node = self.session.rename(&id, &title).await?;
                format!("Renamed {}", format_node_line(&node))
            }
            ShellCommand::Rm { id } => {
                let id = parse_node_id(&id);
                if self.session.request_delete(&id).await? {
                    format!("Deleted {}", id)
                } else {
                    format!("Run `rm {}` again to delete it and everything inside", id)
                }
            }
            ShellCommand::Undo => format_replay_outcome("undo", &self.session.undo().await?),
            ShellCommand::Redo => format_replay_outcome("redo", &self.session.redo().await?),
            ShellCommand::Focus { pane } => {
                match pane {
                    FocusPane::Main => self.session.focus_main(),
                    FocusPane::Sidebar => self.session.focus_sidebar(),
                    FocusPane::Search => self.session.focus_search(),
                }
                self.position()
            }
            ShellCommand::Key { chord } => {
                let input: KeyInput = chord.parse()?;
                let Some(intent) = resolve(&input) else {
                    return Ok(Reply::Text(format!("No shortcut bound to {}", chord)));
                };
                let layout = uniform_grid(&self.session.visible_ids(), GRID_COLUMNS, CELL_WIDTH, CELL_HEIGHT);
                self.session.dispatch(intent, &layout).await?;
                self.session.poll_search()?;
                self.position()
            }
            ShellCommand::Open => {
                self.session.open_active()?;
                self.position()
            }
        };
        Ok(Reply::Text(text))
    }

    fn listing(&self) -> String {
        let heading = if self.session.search().is_active() {
            format!("Search \"{}\"", self.session.query())
        } else {
            format_breadcrumbs(&self.session.breadcrumbs())
        };
        let items = self.session.visible_items();
        format!(
            "{}\n{}",
            heading,
            format_items_table(&items, self.session.main_active())
        )
    }

    fn position(&self) -> String {
        let pane = match self.session.pane() {
            Pane::Sidebar => "sidebar",
            Pane::Main => "main",
            Pane::Search => "search",
        };
        let focused = self
            .session
            .main_active()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "[{}] {} focus={}",
            pane,
            format_breadcrumbs(&self.session.breadcrumbs()),
            focused
        )
    }

    async fn search(&mut self, query: &str) -> Result<String, ApiError> {
        self.session.set_query(query);
        if !self.session.search().is_active() {
            return Ok("Search cleared".to_string());
        }
        self.session.await_search().await?;
        Ok(format!(
            "{} matches for \"{}\"",
            self.session.search().results().len(),
            query
        ))
    }

    fn fill_prompt(&mut self, title: Option<&str>, url: Option<&str>) -> Result<(), ApiError> {
        let prompt = self
            .session
            .prompt_mut()
            .ok_or_else(|| ApiError::InvalidCommand("No prompt is open".to_string()))?;
        if let Some(title) = title {
            prompt.set_title(title);
        }
        if let Some(url) = url {
            prompt.set_url(url);
        }
        Ok(())
    }

    async fn submit(&mut self) -> Result<String, ApiError> {
        match self.session.submit_prompt().await {
            Ok(node) => Ok(format!("Saved {}", format_node_line(&node))),
            Err(ApiError::Validation(ValidationError::SuspiciousUrl { url })) => Ok(format!(
                "The url '{}' may be malformed. Type `confirm` to save it anyway or `cancel`.",
                url
            )),
            Err(e) => Err(e),
        }
    }
}
