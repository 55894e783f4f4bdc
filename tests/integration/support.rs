use booknav::config::SessionConfig;
use booknav::session::{RecordingListener, Session};
use booknav::store::sample::{sample_library, seed};
use booknav::store::{BookmarkRepository, MemoryRepository};
use booknav::tree::Node;
use booknav::types::NodeId;
use std::sync::Arc;

/// Session over the sample library with a recording listener attached
pub async fn sample_session() -> (Session, Arc<RecordingListener>) {
    let repo = MemoryRepository::in_memory();
    seed(&repo, &sample_library()).await.unwrap();
    let repo: Arc<dyn BookmarkRepository> = Arc::new(repo);
    let events = Arc::new(RecordingListener::new());
    let mut session = Session::new(repo, &SessionConfig::default()).with_listener(events.clone());
    session.open().await.unwrap();
    (session, events)
}

/// Depth-first lookup by title
pub fn find_by_title<'a>(nodes: &'a [Node], title: &str) -> Option<&'a Node> {
    nodes.iter().find_map(|node| {
        if node.title == title {
            Some(node)
        } else {
            find_by_title(node.children(), title)
        }
    })
}

pub fn id_of(session: &Session, title: &str) -> NodeId {
    find_by_title(session.forest(), title)
        .map(|node| node.id.clone())
        .unwrap_or_else(|| panic!("no node titled {}", title))
}
