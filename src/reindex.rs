//! Derived-index rebuild: delete the old context, then create a new one.
//!
//! The index has no partial-update path — it is rebuilt wholesale after any
//! mutation. The two remote steps are strictly sequential and dependent:
//! the create step must never run when the delete step failed, because a
//! stale-but-intact index beats a partially built one. A failed create
//! leaves the index absent, which is a degraded but known state.

use anyhow::Result;

use crate::config::Config;
use crate::error::ApiError;
use crate::guard::{OpKind, OperationGuard};
use crate::notify::{Notice, Notifier};
use crate::remote::{HttpBackend, RemoteStore};

/// Fallback confirmation when the backend returns an empty body.
const DEFAULT_CONFIRMATION: &str = "Context has been updated successfully.";

/// Rebuild the derived index. Holds the `reindexing` flag for the whole
/// two-step sequence, not just the create step. Returns the server's
/// confirmation text verbatim.
pub async fn rebuild_context(
    remote: &dyn RemoteStore,
    guard: &OperationGuard,
) -> Result<String, ApiError> {
    if !guard.try_enter(OpKind::Reindex) {
        return Err(ApiError::OperationInProgress);
    }

    let result = rebuild_steps(remote).await;
    guard.leave(OpKind::Reindex);
    result
}

async fn rebuild_steps(remote: &dyn RemoteStore) -> Result<String, ApiError> {
    // Step (a): drop the old index. Abort before (b) on failure.
    remote.delete_context().await?;

    // Step (b): build a new index from the current document set.
    let message = remote.create_embeddings().await?;

    if message.trim().is_empty() {
        Ok(DEFAULT_CONFIRMATION.to_string())
    } else {
        Ok(message)
    }
}

/// Run a rebuild and convert the outcome into notices. Used after a
/// successful upload batch or deletion, where a reindex failure must be
/// reported but must not undo the mutation that triggered it.
pub async fn rebuild_and_notify(
    remote: &dyn RemoteStore,
    guard: &OperationGuard,
    notifier: &dyn Notifier,
) {
    notifier.notify(Notice::ReindexStarted);
    match rebuild_context(remote, guard).await {
        Ok(message) => notifier.notify(Notice::ReindexComplete { message }),
        Err(e) => notifier.notify(Notice::ReindexFailed {
            message: e.to_string(),
        }),
    }
}

/// CLI entry point for `ragctl reindex`.
pub async fn run_reindex(config: &Config) -> Result<()> {
    let remote = HttpBackend::new(&config.backend)?;
    let guard = OperationGuard::new();

    match rebuild_context(&remote, &guard).await {
        Ok(message) => {
            println!("{}", message);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error updating context: {}", e);
            std::process::exit(1);
        }
    }
}
