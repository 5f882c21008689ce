//! Shared work queue of pending directory paths.
//!
//! The tree being walked has no a-priori known size, so completion cannot be
//! a count. Instead every claim is bracketed by a [`ClaimGuard`], and the run
//! is over when the queue is empty AND no claims are in flight. Workers poll
//! with a bounded timeout so they can observe that condition without a
//! separate termination signal.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct WorkQueue {
    sender: Sender<PathBuf>,
    receiver: Receiver<PathBuf>,
    active_claims: Arc<AtomicUsize>,
}

impl WorkQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            active_claims: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Push a pending directory. Each discovered subdirectory is pushed
    /// exactly once (the caller gates on the visited set).
    pub fn push(&self, path: PathBuf) {
        // The queue owns both ends of the channel, so send cannot fail.
        let _ = self.sender.send(path);
    }

    /// Claim a pending directory, waiting at most `timeout`.
    pub fn claim(&self, timeout: Duration) -> Option<PathBuf> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Mark a claim as in flight for the duration of the returned guard.
    pub fn claim_guard(&self) -> ClaimGuard<'_> {
        self.active_claims.fetch_add(1, Ordering::SeqCst);
        ClaimGuard { queue: self }
    }

    /// True when the queue is drained and no worker is mid-directory.
    pub fn is_idle(&self) -> bool {
        self.receiver.is_empty() && self.active_claims.load(Ordering::SeqCst) == 0
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII marker for an in-flight claim.
pub struct ClaimGuard<'a> {
    queue: &'a WorkQueue,
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        self.queue.active_claims.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_claim() {
        let queue = WorkQueue::new();
        queue.push(PathBuf::from("/test"));
        assert!(!queue.is_empty());
        assert_eq!(queue.len(), 1);

        let path = queue.claim(Duration::from_millis(10)).unwrap();
        assert_eq!(path, PathBuf::from("/test"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_claim_timeout_on_empty() {
        let queue = WorkQueue::new();
        assert!(queue.claim(Duration::from_millis(10)).is_none());
    }

    #[test]
    fn test_idle_accounts_for_in_flight_claims() {
        let queue = WorkQueue::new();
        assert!(queue.is_idle());

        queue.push(PathBuf::from("/a"));
        assert!(!queue.is_idle());

        let _path = queue.claim(Duration::from_millis(10)).unwrap();
        let guard = queue.claim_guard();

        // Queue drained but a claim is still in flight.
        assert!(queue.is_empty());
        assert!(!queue.is_idle());

        drop(guard);
        assert!(queue.is_idle());
    }

    #[test]
    fn test_reintroduced_work_keeps_queue_alive() {
        let queue = WorkQueue::new();
        queue.push(PathBuf::from("/parent"));

        let _parent = queue.claim(Duration::from_millis(10)).unwrap();
        let guard = queue.claim_guard();
        // A worker discovering a subdirectory keeps the queue non-idle for
        // everyone else.
        queue.push(PathBuf::from("/parent/child"));
        drop(guard);

        assert!(!queue.is_idle());
        assert!(queue.claim(Duration::from_millis(10)).is_some());
        assert!(queue.is_idle());
    }
}
