//! Physical-identity tracking for cycle-safe directory traversal.

use crate::platform::FileIdentity;
use dashmap::DashSet;

/// Tracks (device, inode) pairs of directories already dispatched in the
/// current run.
///
/// Symlinked or hard-linked directory graphs can reach the same physical
/// directory through many logical paths; registering the identity before
/// enqueueing guarantees each physical directory is expanded at most once.
/// The check-and-insert is a single atomic step, so two workers can never
/// both observe "not visited" for the same pair.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: DashSet<FileIdentity>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
        }
    }

    /// Register an identity. Returns `true` the first time it is seen in
    /// this run and `false` on every subsequent call.
    pub fn mark_visited(&self, identity: FileIdentity) -> bool {
        self.seen.insert(identity)
    }

    /// Number of distinct physical directories registered so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
