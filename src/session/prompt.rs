//! Add/edit prompt and url validation
//!
//! A url that looks malformed is not rejected outright. The first submission
//! warns and arms a confirmation; submitting the same url again saves it as
//! typed. Editing any field disarms the confirmation.

use crate::error::ValidationError;
use crate::tree::Node;
use crate::types::NodeId;
use url::Url;

fn has_http_scheme(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Trim and default the scheme to `https://`. Fails only on empty input.
pub fn normalize_url(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::UrlRequired);
    }
    if has_http_scheme(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{}", trimmed))
    }
}

/// True when `url` parses and its host ends in a dot plus two or more letters
pub fn is_plausible_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    match host.to_ascii_lowercase().rsplit_once('.') {
        Some((_, tld)) => tld.len() >= 2 && tld.bytes().all(|b| b.is_ascii_lowercase()),
        None => false,
    }
}

/// Two-step confirmation for implausible urls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlConfirmation {
    armed: Option<String>,
}

impl UrlConfirmation {
    /// Normalize `input` and decide whether it may be saved.
    ///
    /// An implausible url is accepted only when it was already armed by the
    /// previous call.
    pub fn check(&mut self, input: &str) -> Result<String, ValidationError> {
        let url = match normalize_url(input) {
            Ok(url) => url,
            Err(err) => {
                self.armed = None;
                return Err(err);
            }
        };
        if is_plausible_url(&url) || self.armed.as_deref() == Some(url.as_str()) {
            self.armed = None;
            return Ok(url);
        }
        self.armed = Some(url.clone());
        Err(ValidationError::SuspiciousUrl { url })
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptMode {
    AddFolder {
        parent: NodeId,
    },
    AddBookmark {
        parent: NodeId,
    },
    /// Rename a folder, or edit title and url of a link
    Edit {
        target: NodeId,
        initial_title: String,
        initial_url: Option<String>,
    },
}

/// Open prompt with its field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    mode: PromptMode,
    title: String,
    url: String,
    confirmation: UrlConfirmation,
}

impl Prompt {
    fn open(mode: PromptMode, title: String, url: String) -> Self {
        Self {
            mode,
            title,
            url,
            confirmation: UrlConfirmation::default(),
        }
    }

    pub fn add_folder(parent: NodeId) -> Self {
        Self::open(PromptMode::AddFolder { parent }, String::new(), String::new())
    }

    pub fn add_bookmark(parent: NodeId) -> Self {
        Self::open(PromptMode::AddBookmark { parent }, String::new(), String::new())
    }

    /// Edit prompt prefilled from `node`
    pub fn edit(node: &Node) -> Self {
        let url = node.url().map(str::to_string);
        Self::open(
            PromptMode::Edit {
                target: node.id.clone(),
                initial_title: node.title.clone(),
                initial_url: url.clone(),
            },
            node.title.clone(),
            url.unwrap_or_default(),
        )
    }

    pub fn mode(&self) -> &PromptMode {
        &self.mode
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.confirmation.disarm();
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
        self.confirmation.disarm();
    }

    /// True for prompts that carry a url field
    pub fn needs_url(&self) -> bool {
        match &self.mode {
            PromptMode::AddFolder { .. } => false,
            PromptMode::AddBookmark { .. } => true,
            PromptMode::Edit { initial_url, .. } => initial_url.is_some(),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.confirmation.is_armed()
    }

    /// Validate the url field; see `UrlConfirmation::check`
    pub fn checked_url(&mut self) -> Result<String, ValidationError> {
        self.confirmation.check(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults_scheme() {
        assert_eq!(normalize_url("  github.com ").unwrap(), "https://github.com");
        assert_eq!(normalize_url("HTTP://Example.com").unwrap(), "HTTP://Example.com");
        assert_eq!(normalize_url("   "), Err(ValidationError::UrlRequired));
    }

    #[test]
    fn test_plausibility() {
        assert!(is_plausible_url("https://github.com"));
        assert!(is_plausible_url("https://news.google.com/path?q=1"));
        assert!(is_plausible_url("https://t.cc"));
        assert!(!is_plausible_url("https://localhost"));
        assert!(!is_plausible_url("https://example.c"));
        assert!(!is_plausible_url("https://10.0.0.1"));
        assert!(!is_plausible_url("https://not a url"));
    }

    #[test]
    fn test_suspicious_url_needs_second_submit() {
        let mut confirm = UrlConfirmation::default();
        let err = confirm.check("intranet").unwrap_err();
        assert_eq!(
            err,
            ValidationError::SuspiciousUrl {
                url: "https://intranet".to_string()
            }
        );
        assert!(confirm.is_armed());
        assert_eq!(confirm.check("intranet").unwrap(), "https://intranet");
        assert!(!confirm.is_armed());
    }

    #[test]
    fn test_different_url_rearms() {
        let mut confirm = UrlConfirmation::default();
        assert!(confirm.check("intranet").is_err());
        assert!(confirm.check("wiki").is_err());
        assert!(confirm.check("wiki").is_ok());
    }

    #[test]
    fn test_empty_url_is_never_armed() {
        let mut confirm = UrlConfirmation::default();
        assert_eq!(confirm.check(""), Err(ValidationError::UrlRequired));
        assert!(!confirm.is_armed());
    }

    #[test]
    fn test_editing_disarms() {
        let mut prompt = Prompt::add_bookmark(NodeId::new("1"));
        prompt.set_url("intranet");
        assert!(prompt.checked_url().is_err());
        assert!(prompt.is_armed());
        prompt.set_title("Intranet");
        assert!(!prompt.is_armed());
        assert!(prompt.checked_url().is_err());
    }

    #[test]
    fn test_edit_prompt_prefills_from_node() {
        let link = Node::link(NodeId::new("7"), NodeId::new("1"), "GitHub", "https://github.com");
        let prompt = Prompt::edit(&link);
        assert!(prompt.needs_url());
        assert_eq!(prompt.title(), "GitHub");
        assert_eq!(prompt.url(), "https://github.com");

        let folder = Node::folder(NodeId::new("1"), NodeId::root(), "Bar", vec![]);
        assert!(!Prompt::edit(&folder).needs_url());
    }
}
