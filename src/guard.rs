//! Mutual exclusion for remote mutations.
//!
//! Upload batches and reindex runs must never overlap against the same
//! remote state. The guard holds one flag per operation kind and admits a
//! new operation only when both flags are clear. There is no queueing and
//! no retry: a denied operation is simply not performed, and the caller
//! reports the denial to the user.

use std::sync::atomic::{AtomicBool, Ordering};

/// Operation kinds that hold a guard flag while running. Deletion sets no
/// flag of its own; it only reads the guard via [`OperationGuard::is_busy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Upload,
    Reindex,
}

/// The shared exclusion-state value object. Exposes only `try_enter` /
/// `leave` / `is_busy` — never the raw flags — so the at-most-one-operation
/// invariant stays enforceable.
#[derive(Debug, Default)]
pub struct OperationGuard {
    uploading: AtomicBool,
    reindexing: AtomicBool,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit an operation: returns `false` if either flag is already set,
    /// otherwise atomically sets the flag for `kind` and returns `true`.
    pub fn try_enter(&self, kind: OpKind) -> bool {
        let (own, other) = match kind {
            OpKind::Upload => (&self.uploading, &self.reindexing),
            OpKind::Reindex => (&self.reindexing, &self.uploading),
        };

        if other.load(Ordering::Acquire) {
            return false;
        }

        own.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Clear the flag for `kind` unconditionally.
    pub fn leave(&self, kind: OpKind) {
        let flag = match kind {
            OpKind::Upload => &self.uploading,
            OpKind::Reindex => &self.reindexing,
        };
        flag.store(false, Ordering::Release);
    }

    /// True while any upload or reindex is in flight. Consulted by the
    /// deletion controller before issuing its request.
    pub fn is_busy(&self) -> bool {
        self.uploading.load(Ordering::Acquire) || self.reindexing.load(Ordering::Acquire)
    }
}
