//! Sample library used by `booknav init --sample` and by tests.

use super::{recreate_subtree, BookmarkRepository};
use crate::error::StorageError;
use crate::tree::NodeSnapshot;
use crate::types::NodeId;

fn link(title: &str, url: &str) -> NodeSnapshot {
    NodeSnapshot::Link {
        title: title.to_string(),
        url: url.to_string(),
    }
}

fn folder(title: &str, children: Vec<NodeSnapshot>) -> NodeSnapshot {
    NodeSnapshot::Folder {
        title: title.to_string(),
        children,
    }
}

/// Two top-level folders in the shape browsers ship with
pub fn sample_library() -> Vec<NodeSnapshot> {
    vec![
        folder(
            "Bookmarks Bar",
            vec![
                folder(
                    "Social",
                    vec![
                        link("Twitter", "https://twitter.com"),
                        link("Instagram", "https://instagram.com"),
                        link("LinkedIn", "https://linkedin.com"),
                    ],
                ),
                folder(
                    "Development",
                    vec![
                        link("GitHub", "https://github.com"),
                        link("Stack Overflow", "https://stackoverflow.com"),
                        link("MDN Web Docs", "https://developer.mozilla.org"),
                        link("Tailwind CSS", "https://tailwindcss.com"),
                        link("React", "https://react.dev"),
                    ],
                ),
                link("YouTube", "https://youtube.com"),
                link("Gmail", "https://gmail.com"),
            ],
        ),
        folder(
            "Other Bookmarks",
            vec![
                folder("Recipes", vec![link("Serious Eats", "https://seriouseats.com")]),
                link("News", "https://news.google.com"),
            ],
        ),
    ]
}

/// Create every top-level snapshot under the virtual root
pub async fn seed(repo: &dyn BookmarkRepository, library: &[NodeSnapshot]) -> Result<Vec<NodeId>, StorageError> {
    let root = NodeId::root();
    let mut ids = Vec::with_capacity(library.len());
    for top in library {
        ids.push(recreate_subtree(repo, &root, top).await?);
    }
    Ok(ids)
}
