//! Single-document deletion with optimistic local removal and rollback.
//!
//! The document is removed from the local list before the remote call
//! resolves, so the caller's view reflects intent without waiting on network
//! latency. If the remote delete fails, the pre-deletion snapshot is
//! restored — the post-call list always equals either the pre-call list
//! (failure) or the pre-call list minus the document (success).

use anyhow::Result;

use crate::config::Config;
use crate::error::ApiError;
use crate::guard::OperationGuard;
use crate::notify::{confirm, Notice, Notifier};
use crate::reindex;
use crate::remote::{HttpBackend, RemoteStore};
use crate::store::DocumentList;

/// Delete one document. Rejected without a network call while an upload or
/// reindex is in flight. On success the reindex trigger runs; a reindex
/// failure is surfaced through the notifier but does not undo the deletion.
pub async fn delete_document(
    remote: &dyn RemoteStore,
    guard: &OperationGuard,
    list: &mut DocumentList,
    notifier: &dyn Notifier,
    id: &str,
) -> Result<(), ApiError> {
    // Deletion sets no flag of its own but must not overlap a batch upload
    // or reindex.
    if guard.is_busy() {
        return Err(ApiError::OperationInProgress);
    }

    let snapshot = list.snapshot();
    if list.remove(id).is_none() {
        return Err(ApiError::Validation(format!("no document with id {}", id)));
    }

    match remote.delete_file(id).await {
        Ok(()) => {
            reindex::rebuild_and_notify(remote, guard, notifier).await;
            Ok(())
        }
        Err(e) => {
            list.restore(snapshot);
            notifier.notify(Notice::DeleteRolledBack {
                id: id.to_string(),
                reason: e.to_string(),
            });
            Err(e)
        }
    }
}

/// CLI entry point for `ragctl delete`.
pub async fn run_delete(config: &Config, id: &str, yes: bool, notifier: &dyn Notifier) -> Result<()> {
    if !yes && !confirm(&format!("Delete document {}?", id))? {
        println!("aborted");
        return Ok(());
    }

    let remote = HttpBackend::new(&config.backend)?;
    let guard = OperationGuard::new();
    let mut list = DocumentList::new();

    if let Err(e) = list.reload(&remote).await {
        eprintln!("Error: failed to load documents: {}", e);
        std::process::exit(1);
    }

    match delete_document(&remote, &guard, &mut list, notifier, id).await {
        Ok(()) => {
            println!("deleted {}", id);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
