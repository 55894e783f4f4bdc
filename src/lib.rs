//! Booknav: Keyboard-Driven Bookmark Navigation
//!
//! A bookmark tree browser core: an asynchronous repository contract with
//! in-memory and sled backends, a command log with undo/redo, a geometric
//! grid navigator and the session that ties selection, search and editing
//! together.

pub mod concurrency;
pub mod config;
pub mod error;
pub mod history;
pub mod keymap;
pub mod logging;
pub mod navigator;
pub mod session;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
