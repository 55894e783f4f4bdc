use crate::integration::support::sample_session;
use booknav::history::{Command, CommandLog, ReplayOutcome};
use booknav::session::Session;
use booknav::store::{BookmarkRepository, MemoryRepository};
use booknav::tree::{find_node, Node, NodeSnapshot};
use booknav::types::NodeId;
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::HashSet;

fn titles(repo: &MemoryRepository, rt: &tokio::runtime::Runtime, ids: &[NodeId]) -> Vec<String> {
    let forest = rt.block_on(repo.fetch_tree()).unwrap();
    ids.iter()
        .map(|id| find_node(&forest, id).unwrap().title.clone())
        .collect()
}

#[derive(Debug, Clone)]
enum Edit {
    AddFolder(Index, String),
    AddLink(Index, String),
    Rename(Index, String),
    EditLink(Index, String),
    Delete(Index),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (any::<Index>(), "[a-z]{1,8}").prop_map(|(at, title)| Edit::AddFolder(at, title)),
        (any::<Index>(), "[a-z]{1,8}").prop_map(|(at, title)| Edit::AddLink(at, title)),
        (any::<Index>(), "[a-z]{1,8}").prop_map(|(at, title)| Edit::Rename(at, title)),
        (any::<Index>(), "[a-z]{1,8}").prop_map(|(at, title)| Edit::EditLink(at, title)),
        any::<Index>().prop_map(Edit::Delete),
    ]
}

/// Content of a snapshot with siblings sorted; recreated subtrees land at the
/// end of their parent, so sibling order is not part of the comparison
fn canonical(snapshot: &NodeSnapshot) -> String {
    match snapshot {
        NodeSnapshot::Link { title, url } => format!("link({title},{url})"),
        NodeSnapshot::Folder { title, children } => {
            let mut inner: Vec<String> = children.iter().map(canonical).collect();
            inner.sort();
            format!("folder({title}:[{}])", inner.join(","))
        }
    }
}

fn contents(session: &Session) -> Vec<String> {
    let mut top: Vec<String> = session
        .forest()
        .iter()
        .map(|node| canonical(&node.snapshot()))
        .collect();
    top.sort();
    top
}

fn flatten<'a>(nodes: &'a [Node], out: &mut Vec<&'a Node>) {
    for node in nodes {
        out.push(node);
        flatten(node.children(), out);
    }
}

fn subtree_ids(node: &Node) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    flatten(std::slice::from_ref(node), &mut nodes);
    nodes.into_iter().map(|n| n.id.clone()).collect()
}

/// Apply one edit through the session. Returns false when the edit has no
/// valid target. `touched` collects every id a recorded command refers to;
/// deletes avoid subtrees holding one, since recreated nodes get new ids and
/// older entries would no longer resolve.
fn apply_edit(
    rt: &tokio::runtime::Runtime,
    session: &mut Session,
    touched: &mut HashSet<NodeId>,
    edit: &Edit,
) -> bool {
    let mut nodes = Vec::new();
    flatten(session.forest(), &mut nodes);
    let folders: Vec<NodeId> = nodes.iter().filter(|n| n.is_folder()).map(|n| n.id.clone()).collect();
    let links: Vec<NodeId> = nodes.iter().filter(|n| !n.is_folder()).map(|n| n.id.clone()).collect();
    let all: Vec<NodeId> = nodes.iter().map(|n| n.id.clone()).collect();
    let deletable: Vec<(NodeId, NodeId)> = nodes
        .iter()
        .filter(|n| subtree_ids(n).iter().all(|id| !touched.contains(id)))
        .map(|n| (n.id.clone(), n.parent_id.clone()))
        .collect();

    match edit {
        Edit::AddFolder(at, title) => {
            let mut parents = vec![NodeId::root()];
            parents.extend(folders);
            let parent = parents[at.index(parents.len())].clone();
            let node = rt.block_on(session.create_folder(&parent, title)).unwrap();
            touched.extend([parent, node.id]);
        }
        Edit::AddLink(at, title) => {
            if folders.is_empty() {
                return false;
            }
            let parent = folders[at.index(folders.len())].clone();
            let url = format!("https://{title}.example");
            let node = rt.block_on(session.create_bookmark(&parent, title, &url)).unwrap();
            touched.extend([parent, node.id]);
        }
        Edit::Rename(at, title) => {
            if all.is_empty() {
                return false;
            }
            let id = all[at.index(all.len())].clone();
            rt.block_on(session.rename(&id, title)).unwrap();
            touched.insert(id);
        }
        Edit::EditLink(at, title) => {
            if links.is_empty() {
                return false;
            }
            let id = links[at.index(links.len())].clone();
            let url = format!("https://{title}.example/edited");
            rt.block_on(session.edit_bookmark(&id, title, &url)).unwrap();
            touched.insert(id);
        }
        Edit::Delete(at) => {
            if deletable.is_empty() {
                return false;
            }
            let (id, parent) = deletable[at.index(deletable.len())].clone();
            rt.block_on(session.delete_node(&id)).unwrap();
            touched.extend([id, parent]);
        }
    }
    true
}

proptest! {
    /// Undoing every rename restores the original titles in reverse order, and
    /// redoing them all lands on the final titles again.
    #[test]
    fn renames_undo_and_redo_in_lifo_order(
        renames in prop::collection::vec((0usize..3, "[a-z]{1,8}"), 1..12)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let repo = MemoryRepository::in_memory();
        let ids: Vec<NodeId> = ["A", "B", "C"]
            .iter()
            .map(|t| rt.block_on(repo.create_folder(&NodeId::root(), t)).unwrap().id)
            .collect();
        let original = titles(&repo, &rt, &ids);

        let mut log = CommandLog::new();
        for (slot, title) in &renames {
            let id = &ids[*slot];
            let prev_title = titles(&repo, &rt, std::slice::from_ref(id)).remove(0);
            rt.block_on(repo.rename_title(id, title)).unwrap();
            log.record(Command::Update {
                id: id.clone(),
                prev_title,
                prev_url: None,
                next_title: Some(title.clone()),
                next_url: None,
            });
        }
        let edited = titles(&repo, &rt, &ids);
        prop_assert_eq!(log.undo_depth(), renames.len());

        while log.can_undo() {
            prop_assert!(rt.block_on(log.undo(&repo)).is_applied());
        }
        prop_assert_eq!(titles(&repo, &rt, &ids), original);
        prop_assert_eq!(log.redo_depth(), renames.len());

        while log.can_redo() {
            prop_assert!(rt.block_on(log.redo(&repo)).is_applied());
        }
        prop_assert_eq!(titles(&repo, &rt, &ids), edited);
        prop_assert!(matches!(rt.block_on(log.redo(&repo)), ReplayOutcome::Empty));
    }

    /// Mixed session edits: each undo restores the content from before the
    /// latest remaining edit, and undo then redo lands back on the content
    /// from after it.
    #[test]
    fn mixed_edits_undo_in_lifo_order_and_redo_reapplies(
        edits in prop::collection::vec(edit_strategy(), 1..10)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (mut session, _) = rt.block_on(sample_session());
        let mut touched = HashSet::new();
        let mut states = vec![contents(&session)];
        for edit in &edits {
            if apply_edit(&rt, &mut session, &mut touched, edit) {
                states.push(contents(&session));
            }
        }
        let applied = states.len() - 1;
        prop_assert_eq!(session.command_log().undo_depth(), applied);

        for level in (1..=applied).rev() {
            prop_assert!(rt.block_on(session.undo()).unwrap().is_applied());
            prop_assert_eq!(&contents(&session), &states[level - 1]);

            prop_assert!(rt.block_on(session.redo()).unwrap().is_applied());
            prop_assert_eq!(&contents(&session), &states[level]);

            prop_assert!(rt.block_on(session.undo()).unwrap().is_applied());
            prop_assert_eq!(&contents(&session), &states[level - 1]);
        }
        prop_assert!(!session.command_log().can_undo());
        prop_assert!(matches!(rt.block_on(session.undo()).unwrap(), ReplayOutcome::Empty));
    }
}

#[tokio::test]
async fn undo_delete_of_nested_folder_restores_whole_subtree() {
    let repo = MemoryRepository::in_memory();
    let bar = repo.create_folder(&NodeId::root(), "Bar").await.unwrap();
    let dev = repo.create_folder(&bar.id, "Dev").await.unwrap();
    let tools = repo.create_folder(&dev.id, "Tools").await.unwrap();
    repo.create_bookmark(&tools.id, "Rust", "https://rust-lang.org").await.unwrap();
    repo.create_bookmark(&dev.id, "GitHub", "https://github.com").await.unwrap();

    let forest = repo.fetch_tree().await.unwrap();
    let snapshot = find_node(&forest, &dev.id).unwrap().snapshot();
    repo.delete_subtree(&dev.id).await.unwrap();

    let mut log = CommandLog::new();
    log.record(Command::Delete {
        id: dev.id.clone(),
        parent_id: bar.id.clone(),
        snapshot: snapshot.clone(),
    });
    let outcome = log.undo(&repo).await;
    let ReplayOutcome::Applied(Command::Delete { id: restored, .. }) = outcome else {
        panic!("expected applied delete, got {:?}", outcome);
    };
    assert_ne!(restored, dev.id);

    let forest = repo.fetch_tree().await.unwrap();
    let node = find_node(&forest, &restored).unwrap();
    assert_eq!(node.snapshot(), snapshot);
    assert_eq!(node.children()[0].title, "Tools");
    assert_eq!(node.children()[1].title, "GitHub");
}

#[tokio::test]
async fn failed_redo_is_dropped_from_both_stacks() {
    let repo = MemoryRepository::in_memory();
    let bar = repo.create_folder(&NodeId::root(), "Bar").await.unwrap();
    let reading = repo.create_folder(&bar.id, "Reading").await.unwrap();

    let mut log = CommandLog::new();
    log.record(Command::Add {
        id: reading.id.clone(),
        parent_id: bar.id.clone(),
        is_folder: true,
        title: "Reading".to_string(),
        url: None,
    });
    assert!(log.undo(&repo).await.is_applied());
    assert!(log.can_redo());

    // The parent disappears behind the log's back
    repo.delete_subtree(&bar.id).await.unwrap();

    let outcome = log.redo(&repo).await;
    let ReplayOutcome::Dropped { command, .. } = outcome else {
        panic!("expected dropped redo, got {:?}", outcome);
    };
    assert_eq!(command.target(), &reading.id);
    assert!(!log.can_undo());
    assert!(!log.can_redo());
    assert_eq!(log.undo_depth() + log.redo_depth(), 0);
    assert!(matches!(log.redo(&repo).await, ReplayOutcome::Empty));
}
