//! Mutation serialization for a session
//!
//! A session admits one store mutation at a time. Reads (search, navigation)
//! never take the gate. A second mutation attempted while one is in flight is
//! rejected with `ApiError::Busy` instead of queueing behind it.

use crate::error::ApiError;
use parking_lot::Mutex;
use std::sync::Arc;

/// Single-slot gate shared by every handle to the same session
#[derive(Debug, Clone, Default)]
pub struct MutationGate {
    /// Label of the mutation currently in flight
    in_flight: Arc<Mutex<Option<String>>>,
}

impl MutationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate for `label`.
    ///
    /// The returned permit releases the gate when dropped.
    pub fn try_begin(&self, label: &str) -> Result<MutationPermit, ApiError> {
        let mut slot = self.in_flight.lock();
        if let Some(current) = slot.as_ref() {
            return Err(ApiError::Busy(current.clone()));
        }
        *slot = Some(label.to_string());
        Ok(MutationPermit {
            slot: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Label of the in-flight mutation, if any
    pub fn current(&self) -> Option<String> {
        self.in_flight.lock().clone()
    }
}

/// Proof that the holder owns the gate
#[derive(Debug)]
pub struct MutationPermit {
    slot: Arc<Mutex<Option<String>>>,
}

impl Drop for MutationPermit {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}
