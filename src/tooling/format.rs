//! Format trees, listings and search results for the terminal.

use crate::error::ApiError;
use crate::history::{Command, ReplayOutcome};
use crate::session::SidebarRow;
use crate::tree::{count_links, grid_order, Breadcrumb, Node};
use crate::types::NodeId;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn kind_label(node: &Node) -> &'static str {
    if node.is_folder() {
        "folder"
    } else {
        "link"
    }
}

fn detail(node: &Node) -> String {
    match node.url() {
        Some(url) => url.to_string(),
        None => format!("{} items", node.children().len()),
    }
}

fn display_title(title: &str) -> &str {
    if title.is_empty() {
        "(untitled)"
    } else {
        title
    }
}

/// Indented folder hierarchy with link counts
pub fn format_tree_text(forest: &[Node]) -> String {
    let mut out = format!("{}\n", format_section_heading("Bookmarks"));
    if forest.is_empty() {
        out.push_str("  (empty store; run `booknav init`)\n");
        return out;
    }
    fn walk(nodes: &[Node], depth: usize, out: &mut String) {
        for node in nodes.iter().filter(|n| n.is_folder()) {
            out.push_str(&format!(
                "{}{} [{}] ({} links)\n",
                "  ".repeat(depth + 1),
                display_title(&node.title),
                node.id,
                count_links(node.children())
            ));
            walk(node.children(), depth + 1, out);
        }
    }
    walk(forest, 0, &mut out);
    out.push_str(&format!("\nTotal links: {}\n", count_links(forest)));
    out
}

/// Sidebar rows with the selected folder marked
pub fn format_sidebar_rows(rows: &[SidebarRow], selected: &NodeId) -> String {
    let mut out = String::new();
    for row in rows {
        let marker = if &row.id == selected { ">" } else { " " };
        let fold = match (row.has_subfolders, row.expanded) {
            (false, _) => " ",
            (true, true) => "v",
            (true, false) => "+",
        };
        out.push_str(&format!(
            "{} {}{} {} [{}]\n",
            marker,
            "  ".repeat(row.level),
            fold,
            display_title(&row.title),
            row.id
        ));
    }
    out
}

pub fn format_breadcrumbs(crumbs: &[Breadcrumb]) -> String {
    if crumbs.is_empty() {
        return "/".to_string();
    }
    let titles: Vec<&str> = crumbs.iter().map(|c| c.title.as_str()).collect();
    format!("/ {}", titles.join(" / "))
}

/// Table of `items` in grid order; `focused` is marked with `*`
pub fn format_items_table(items: &[&Node], focused: Option<&NodeId>) -> String {
    if items.is_empty() {
        return "(no items)".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["", "Kind", "Title", "Url / Items", "Id"]);
    for node in items {
        let mark = if Some(&node.id) == focused { "*" } else { "" };
        table.add_row(vec![
            mark.to_string(),
            kind_label(node).to_string(),
            display_title(&node.title).to_string(),
            detail(node),
            node.id.to_string(),
        ]);
    }
    table.to_string()
}

#[derive(Serialize)]
struct ItemJson<'a> {
    id: &'a NodeId,
    parent_id: &'a NodeId,
    kind: &'static str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_added: Option<String>,
}

fn format_timestamp(millis: i64) -> Option<String> {
    chrono::DateTime::from_timestamp_millis(millis).map(|ts| ts.to_rfc3339())
}

/// Flat JSON array of `items` without children
pub fn format_items_json(items: &[&Node]) -> Result<String, ApiError> {
    let rows: Vec<ItemJson<'_>> = items
        .iter()
        .map(|node| ItemJson {
            id: &node.id,
            parent_id: &node.parent_id,
            kind: kind_label(node),
            title: &node.title,
            url: node.url(),
            date_added: node.date_added.and_then(format_timestamp),
        })
        .collect();
    serde_json::to_string_pretty(&rows).map_err(|e| ApiError::InvalidCommand(e.to_string()))
}

/// Folder listing in text or json
pub fn format_listing(heading: &str, children: &[Node], format: &str) -> Result<String, ApiError> {
    let items = grid_order(children);
    match format {
        "json" => format_items_json(&items),
        "text" => Ok(format!(
            "{}\n\n{}",
            format_section_heading(heading),
            format_items_table(&items, None)
        )),
        other => Err(ApiError::InvalidCommand(format!(
            "Unknown format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

pub fn format_search_results(query: &str, results: &[Node], format: &str) -> Result<String, ApiError> {
    let heading = format!("Search \"{}\": {} matches", query, results.len());
    format_listing(&heading, results, format)
}

pub fn format_node_line(node: &Node) -> String {
    match node.url() {
        Some(url) => format!("{} [{}] -> {}", display_title(&node.title), node.id, url),
        None => format!("{} [{}]", display_title(&node.title), node.id),
    }
}

fn describe_command(command: &Command) -> String {
    match command {
        Command::Add { title, is_folder, .. } => {
            let kind = if *is_folder { "folder" } else { "link" };
            format!("add {} \"{}\"", kind, title)
        }
        Command::Delete { snapshot, .. } => format!("delete \"{}\"", snapshot.title()),
        Command::Update { prev_title, next_title, .. } => format!(
            "update \"{}\" -> \"{}\"",
            prev_title,
            next_title.as_deref().unwrap_or(prev_title)
        ),
    }
}

/// One line describing an undo or redo step
pub fn format_replay_outcome(verb: &str, outcome: &ReplayOutcome) -> String {
    match outcome {
        ReplayOutcome::Empty => format!("Nothing to {}", verb),
        ReplayOutcome::Applied(command) => format!("{}: {}", verb, describe_command(command)),
        ReplayOutcome::Dropped { command, error } => format!(
            "{} failed for {} ({}); entry discarded",
            verb,
            describe_command(command),
            error
        ),
    }
}
