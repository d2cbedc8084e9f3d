//! PathDeduplicator: per-drop seen set and result list

use crate::model::FileDescriptor;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct DropState {
    seen: HashSet<String>,
    recorded: Vec<FileDescriptor>,
}

/// Gate for "is this path new in this drop", plus the drop's growing item list.
///
/// Both live under one coarse lock that is held only for the insert or
/// append, never across filesystem work. One instance per drop run; runs
/// never share it.
#[derive(Debug, Default)]
pub struct PathDeduplicator {
    state: Mutex<DropState>,
}

impl PathDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, DropState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim `path` for this drop. True iff nobody claimed it before.
    pub fn try_claim(&self, path: &str) -> bool {
        self.state().seen.insert(path.to_string())
    }

    /// Append a finished descriptor to the drop's item list.
    pub fn record(&self, descriptor: FileDescriptor) {
        self.state().recorded.push(descriptor);
    }

    /// Drain the recorded descriptors.
    pub fn take_recorded(&self) -> Vec<FileDescriptor> {
        std::mem::take(&mut self.state().recorded)
    }

    pub fn claimed_count(&self) -> usize {
        self.state().seen.len()
    }
}
