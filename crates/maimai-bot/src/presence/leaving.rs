use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Usernames currently pending leave.
///
/// Each mark carries a generation ticket. Every check-and-act runs under the
/// shard lock of a single `DashMap` call, so the deferred confirmation and the
/// join handler never interleave on the same user.
#[derive(Default)]
pub struct LeavingSet {
    pending: DashMap<String, u64>,
    generation: AtomicU64,
}

impl LeavingSet {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            generation: AtomicU64::new(0),
        }
    }

    /// Mark `user` pending-leave. Returns the ticket the confirmation must
    /// present; a later mark for the same user supersedes it.
    pub fn mark(&self, user: &str) -> u64 {
        let ticket = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.pending.insert(user.to_string(), ticket);
        ticket
    }

    pub fn is_leaving(&self, user: &str) -> bool {
        self.pending.contains_key(user)
    }

    /// Clear on rejoin. True if the user was pending-leave.
    pub fn clear(&self, user: &str) -> bool {
        self.pending.remove(user).is_some()
    }

    /// Fire-time check: clears and returns true only if `ticket` is still the
    /// current mark for `user`.
    pub fn confirm(&self, user: &str, ticket: u64) -> bool {
        self.pending
            .remove_if(user, |_, current| *current == ticket)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_after_rejoin_is_refused() {
        let set = LeavingSet::new();
        let t = set.mark("alice");
        assert!(set.clear("alice"));
        assert!(!set.confirm("alice", t));
    }

    #[test]
    fn stale_ticket_does_not_clear_newer_mark() {
        let set = LeavingSet::new();
        let first = set.mark("alice");
        set.clear("alice");
        let second = set.mark("alice");
        assert!(!set.confirm("alice", first));
        assert!(set.is_leaving("alice"));
        assert!(set.confirm("alice", second));
        assert!(set.is_empty());
    }
}
