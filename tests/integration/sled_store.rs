use booknav::store::sample::{sample_library, seed};
use booknav::store::{BookmarkRepository, SledRepository};
use booknav::tree::{count_links, find_node};
use booknav::types::NodeId;
use tempfile::TempDir;

#[tokio::test]
async fn tree_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store");

    let (bar, before) = {
        let repo = SledRepository::open_sled(&path).unwrap();
        let ids = seed(&repo, &sample_library()).await.unwrap();
        repo.rename_title(&ids[0], "Toolbar").await.unwrap();
        (ids[0].clone(), repo.fetch_tree().await.unwrap())
    };

    let repo = SledRepository::open_sled(&path).unwrap();
    let after = repo.fetch_tree().await.unwrap();
    assert_eq!(after, before);
    assert_eq!(find_node(&after, &bar).unwrap().title, "Toolbar");
    assert_eq!(count_links(&after), 12);
}

#[tokio::test]
async fn ids_are_not_reused_after_delete_and_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store");

    let deleted = {
        let repo = SledRepository::open_sled(&path).unwrap();
        let folder = repo.create_folder(&NodeId::root(), "Temp").await.unwrap();
        repo.delete_subtree(&folder.id).await.unwrap();
        folder.id
    };

    let repo = SledRepository::open_sled(&path).unwrap();
    let fresh = repo.create_folder(&NodeId::root(), "Temp").await.unwrap();
    assert_ne!(fresh.id, deleted);
    assert_eq!(repo.fetch_tree().await.unwrap().len(), 1);
}

#[tokio::test]
async fn search_reads_persisted_links() {
    let temp_dir = TempDir::new().unwrap();
    let repo = SledRepository::open_sled(temp_dir.path()).unwrap();
    seed(&repo, &sample_library()).await.unwrap();

    let hits = repo.search("GITHUB").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url(), Some("https://github.com"));
    assert!(repo.search("nothing-matches-this").await.unwrap().is_empty());
}
