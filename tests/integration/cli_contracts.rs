use booknav::config::{BooknavConfig, StoreBackend};
use booknav::tooling::cli::{CliContext, Commands};
use std::io::Cursor;
use tempfile::TempDir;

fn sled_context(temp_dir: &TempDir) -> CliContext {
    let mut config = BooknavConfig::default();
    config.store.backend = StoreBackend::Sled;
    config.store.path = Some(temp_dir.path().join("store"));
    CliContext::new(config).unwrap()
}

fn ls_json(cli: &CliContext, folder: Option<&str>) -> Vec<serde_json::Value> {
    let output = cli
        .execute(&Commands::Ls {
            folder: folder.map(str::to_string),
            format: "json".to_string(),
        })
        .unwrap();
    serde_json::from_str(&output).unwrap()
}

#[test]
fn init_sample_then_ls_json_contract() {
    let temp_dir = TempDir::new().unwrap();
    let cli = sled_context(&temp_dir);
    let output = cli
        .execute(&Commands::Init {
            sample: true,
            force: false,
        })
        .unwrap();
    assert!(output.contains("2 top-level folders"));

    let top = ls_json(&cli, None);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0]["title"], "Bookmarks Bar");
    assert_eq!(top[0]["kind"], "folder");

    let bar = top[0]["id"].as_str().unwrap().to_string();
    let rows = ls_json(&cli, Some(&bar));
    let kinds: Vec<&str> = rows.iter().map(|r| r["kind"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["folder", "folder", "link", "link"]);
    for row in &rows {
        assert!(row.get("id").and_then(|v| v.as_str()).is_some());
        assert_eq!(row["parent_id"].as_str(), Some(bar.as_str()));
        assert!(row.get("date_added").and_then(|v| v.as_str()).is_some());
    }
    assert_eq!(rows[2]["url"], "https://youtube.com");
}

#[test]
fn add_link_rejects_suspicious_url_without_force() {
    let temp_dir = TempDir::new().unwrap();
    let cli = sled_context(&temp_dir);
    cli.execute(&Commands::Init {
        sample: false,
        force: false,
    })
    .unwrap();
    let bar = ls_json(&cli, None)[0]["id"].as_str().unwrap().to_string();

    let add = |url: &str, force: bool| {
        cli.execute(&Commands::AddLink {
            parent: bar.clone(),
            title: "Wiki".to_string(),
            url: url.to_string(),
            force,
        })
    };
    assert!(add("intranet", false).is_err());
    assert!(ls_json(&cli, Some(&bar)).is_empty());

    add("intranet", true).unwrap();
    let rows = ls_json(&cli, Some(&bar));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["url"], "https://intranet");
}

#[test]
fn edit_rename_and_delete_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let cli = sled_context(&temp_dir);
    cli.execute(&Commands::Init {
        sample: true,
        force: false,
    })
    .unwrap();

    let hits: Vec<serde_json::Value> = serde_json::from_str(
        &cli.execute(&Commands::Search {
            query: "youtube".to_string(),
            format: "json".to_string(),
        })
        .unwrap(),
    )
    .unwrap();
    let youtube = hits[0]["id"].as_str().unwrap().to_string();

    let output = cli
        .execute(&Commands::Edit {
            id: youtube.clone(),
            title: None,
            url: Some("m.youtube.com".to_string()),
            force: false,
        })
        .unwrap();
    assert!(output.contains("YouTube"));
    assert!(output.contains("https://m.youtube.com"));

    cli.execute(&Commands::Rename {
        id: youtube.clone(),
        title: "Videos".to_string(),
    })
    .unwrap();
    let tree = cli.execute(&Commands::Tree).unwrap();
    assert!(tree.contains("Total links: 12"));

    let output = cli.execute(&Commands::Delete { id: youtube }).unwrap();
    assert!(output.contains("(1 nodes)"));
    let tree = cli.execute(&Commands::Tree).unwrap();
    assert!(tree.contains("Total links: 11"));
}

#[test]
fn shell_keeps_history_across_lines() {
    let temp_dir = TempDir::new().unwrap();
    let cli = sled_context(&temp_dir);
    cli.execute(&Commands::Init {
        sample: false,
        force: false,
    })
    .unwrap();
    let bar = ls_json(&cli, None)[0]["id"].as_str().unwrap().to_string();

    let script = format!("cd {bar}\nmkdir Reading List\nundo\nredo\nquit\n");
    let mut output = Vec::new();
    let summary = cli.run_shell(Cursor::new(script), &mut output).unwrap();
    assert_eq!(summary, "Session ended after 5 commands");

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("Saved Reading List"));
    assert!(output.contains("undo: add folder \"Reading List\""));
    assert!(output.contains("redo: add folder \"Reading List\""));

    let rows = ls_json(&cli, Some(&bar));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Reading List");
}
