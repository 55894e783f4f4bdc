use crate::integration::support::{find_by_title, id_of, sample_session};
use booknav::history::{Command, ReplayOutcome};
use booknav::keymap::{resolve, KeyInput};
use booknav::navigator::{uniform_grid, Direction, LayoutFn};
use booknav::session::{Pane, Prompt, SessionEvent};
use booknav::tree::find_node;

async fn press(session: &mut booknav::session::Session, chord: &str) {
    let input: KeyInput = chord.parse().unwrap();
    let intent = resolve(&input).unwrap_or_else(|| panic!("{} is not bound", chord));
    let ids = session.visible_ids();
    let layout = LayoutFn(move || uniform_grid(&ids, 3, 200.0, 120.0));
    session.dispatch(intent, &layout).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn search_drill_in_and_back_returns_to_results() {
    let (mut session, _) = sample_session().await;
    session.set_query("Development");
    assert!(session.await_search().await.unwrap());
    assert_eq!(session.search().results().len(), 1);

    session.focus_main();
    let dev = id_of(&session, "Development");
    assert_eq!(session.main_active(), Some(&dev));

    press(&mut session, "enter").await;
    assert_eq!(session.selected_folder(), &dev);
    assert_eq!(session.query(), "");
    assert_eq!(session.visible_items().len(), 5);
    assert_eq!(session.main_active(), Some(&id_of(&session, "GitHub")));

    press(&mut session, "backspace").await;
    assert_eq!(session.query(), "Development");
    assert_eq!(session.visible_ids(), vec![dev.clone()]);
    assert_eq!(session.main_active(), Some(&dev));
    assert!(session.search().snapshot().is_none());
}

#[tokio::test(start_paused = true)]
async fn fresh_search_drops_pending_snapshot() {
    let (mut session, _) = sample_session().await;
    session.set_query("git");
    session.await_search().await.unwrap();
    session.select_folder(&id_of(&session, "Social")).unwrap();
    assert!(session.search().snapshot().is_some());

    session.set_query("react");
    assert!(session.await_search().await.unwrap());
    assert!(session.search().snapshot().is_none());

    session.set_query("");
    session.back();
    // No snapshot: back climbs to the parent of Social
    assert_eq!(session.selected_folder(), &id_of(&session, "Bookmarks Bar"));
}

#[tokio::test]
async fn grid_keys_walk_rows_and_hand_off_left() {
    let (mut session, events) = sample_session().await;
    session.select_folder(&id_of(&session, "Development")).unwrap();
    session.focus_main();
    // Three columns: GitHub, Stack Overflow, MDN / Tailwind, React
    press(&mut session, "down").await;
    assert_eq!(session.main_active(), Some(&id_of(&session, "Tailwind CSS")));
    press(&mut session, "right").await;
    assert_eq!(session.main_active(), Some(&id_of(&session, "React")));
    press(&mut session, "right").await;
    assert_eq!(session.main_active(), Some(&id_of(&session, "React")));

    press(&mut session, "left").await;
    press(&mut session, "left").await;
    assert_eq!(session.pane(), Pane::Sidebar);
    assert_eq!(session.main_active(), None);
    assert!(events.events().contains(&SessionEvent::PaneHandoff(Direction::Left)));
}

#[tokio::test]
async fn delete_undo_redo_follows_recreated_ids() {
    let (mut session, events) = sample_session().await;
    let dev = id_of(&session, "Development");
    session.select_folder(&dev).unwrap();
    events.drain();

    session.delete_node(&dev).await.unwrap();
    assert!(find_by_title(session.forest(), "Development").is_none());
    assert_eq!(session.selected_folder(), &id_of(&session, "Bookmarks Bar"));
    assert!(events.events().contains(&SessionEvent::CommandLogChanged {
        can_undo: true,
        can_redo: false
    }));

    press(&mut session, "ctrl+z").await;
    let restored = id_of(&session, "Development");
    assert_ne!(restored, dev);
    assert_eq!(find_node(session.forest(), &restored).unwrap().children().len(), 5);
    assert!(session.command_log().can_redo());

    press(&mut session, "ctrl+shift+z").await;
    assert!(find_by_title(session.forest(), "Development").is_none());
    assert!(session.command_log().can_undo());
    assert!(!session.command_log().can_redo());
}

#[tokio::test]
async fn new_mutation_after_undo_discards_redo() {
    let (mut session, _) = sample_session().await;
    let bar = id_of(&session, "Bookmarks Bar");
    session.create_folder(&bar, "Reading").await.unwrap();
    assert!(session.undo().await.unwrap().is_applied());
    assert!(find_by_title(session.forest(), "Reading").is_none());

    session.create_folder(&bar, "Music").await.unwrap();
    assert!(matches!(session.redo().await.unwrap(), ReplayOutcome::Empty));
    assert!(find_by_title(session.forest(), "Reading").is_none());
    assert!(find_by_title(session.forest(), "Music").is_some());
}

#[tokio::test]
async fn edit_prompt_undo_restores_title_and_url() {
    let (mut session, _) = sample_session().await;
    let github = id_of(&session, "GitHub");
    session.open_edit_prompt(&github).unwrap();
    let prompt = session.prompt_mut().unwrap();
    prompt.set_title("GitLab");
    prompt.set_url("gitlab.com");
    let node = session.submit_prompt().await.unwrap();
    assert_eq!(node.url(), Some("https://gitlab.com"));

    let outcome = session.undo().await.unwrap();
    assert!(matches!(outcome, ReplayOutcome::Applied(Command::Update { .. })));
    let node = find_node(session.forest(), &github).unwrap();
    assert_eq!(node.title, "GitHub");
    assert_eq!(node.url(), Some("https://github.com"));
}

#[tokio::test]
async fn add_bookmark_prompt_selects_parent() {
    let (mut session, _) = sample_session().await;
    let recipes = id_of(&session, "Recipes");
    session.open_prompt(Prompt::add_bookmark(recipes.clone()));
    let prompt = session.prompt_mut().unwrap();
    prompt.set_title("Bon Appetit");
    prompt.set_url("bonappetit.com");
    session.submit_prompt().await.unwrap();

    assert_eq!(session.selected_folder(), &recipes);
    assert_eq!(session.visible_items().len(), 2);
    assert!(session.prompt().is_none());
}

#[tokio::test]
async fn sidebar_arrows_enter_the_tree_from_the_root() {
    let (mut session, _) = sample_session().await;
    assert!(session.selected_folder().is_root());
    session.focus_sidebar();
    assert_eq!(session.pane(), Pane::Sidebar);

    press(&mut session, "down").await;
    assert_eq!(session.selected_folder(), &id_of(&session, "Bookmarks Bar"));

    press(&mut session, "down").await;
    assert_eq!(session.selected_folder(), &id_of(&session, "Social"));
}
