//! Config merge: defaults policy and the service that layers sources.

pub mod merge_policy;
pub mod service;
