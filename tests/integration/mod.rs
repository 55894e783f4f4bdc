//! Integration tests for the bookmark navigator

mod cli_contracts;
mod command_log;
mod session_flow;
mod sled_store;
mod support;
