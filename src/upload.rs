//! Multi-file upload pipeline.
//!
//! Filters a batch of candidate files to the accepted content types, uploads
//! the survivors **strictly sequentially**, and aggregates one
//! [`UploadOutcome`] per attempted file into a [`BatchSummary`]. Upload N+1
//! is not issued until upload N settles: this bounds concurrent server load
//! and keeps failure attribution per-file unambiguous. A failed file never
//! aborts the batch.
//!
//! If at least one file succeeded, the local list is refreshed by a full
//! reload (never incrementally per file — the list must not show documents
//! the not-yet-rebuilt context does not cover) and the reindex trigger runs.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::ApiError;
use crate::guard::{OpKind, OperationGuard};
use crate::models::{BatchSummary, UploadOutcome};
use crate::notify::{Notice, Notifier};
use crate::reindex;
use crate::remote::{HttpBackend, RemoteStore};
use crate::store::DocumentList;

/// A file selected for upload, before filtering.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Run one upload batch end to end. Returns the batch summary, or an error
/// when the batch never started (nothing valid to upload, or the guard
/// denied entry) — in both of those cases zero network calls were issued.
pub async fn upload_batch(
    remote: &dyn RemoteStore,
    guard: &OperationGuard,
    list: &mut DocumentList,
    notifier: &dyn Notifier,
    config: &Config,
    candidates: Vec<UploadCandidate>,
) -> Result<BatchSummary, ApiError> {
    let accepted = &config.upload.accepted_types;
    let valid: Vec<UploadCandidate> = candidates
        .into_iter()
        .filter(|c| accepted.iter().any(|t| t == &c.content_type))
        .collect();

    if valid.is_empty() {
        return Err(ApiError::Validation(format!(
            "no valid files selected (accepted: {})",
            accepted.join(", ")
        )));
    }

    if !guard.try_enter(OpKind::Upload) {
        return Err(ApiError::OperationInProgress);
    }

    // One file at a time; every valid file yields exactly one outcome.
    let mut outcomes = Vec::with_capacity(valid.len());
    for candidate in valid {
        let UploadCandidate {
            name,
            content_type,
            bytes,
        } = candidate;

        match remote.upload_file(&name, &content_type, bytes).await {
            Ok(()) => outcomes.push(UploadOutcome::Succeeded(name)),
            Err(e) => outcomes.push(UploadOutcome::Failed {
                name,
                reason: e.to_string(),
            }),
        }
    }

    guard.leave(OpKind::Upload);

    let summary = BatchSummary::from_outcomes(outcomes);
    notifier.notify(Notice::UploadSummary(summary.clone()));

    if summary.any_succeeded() {
        if let Err(e) = list.reload(remote).await {
            notifier.notify(Notice::Warning(format!(
                "failed to reload document list: {}",
                e
            )));
        }
        reindex::rebuild_and_notify(remote, guard, notifier).await;
    }

    Ok(summary)
}

/// Content type inferred from the file extension. Only PDF is recognized;
/// everything else falls through to the generic type and gets filtered.
pub fn content_type_for(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf".to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

/// CLI entry point for `ragctl upload`.
pub async fn run_upload(config: &Config, files: &[PathBuf], notifier: &dyn Notifier) -> Result<()> {
    let mut candidates = Vec::with_capacity(files.len());
    for path in files {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        candidates.push(UploadCandidate {
            name,
            content_type: content_type_for(path),
            bytes,
        });
    }

    let remote = HttpBackend::new(&config.backend)?;
    let guard = OperationGuard::new();
    let mut list = DocumentList::new();

    match upload_batch(&remote, &guard, &mut list, notifier, config, candidates).await {
        Ok(summary) => {
            println!("upload");
            println!("  attempted: {}", summary.total());
            println!("  succeeded: {}", summary.succeeded.len());
            println!("  failed: {}", summary.failed.len());
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
