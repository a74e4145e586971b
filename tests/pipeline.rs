//! End-to-end synchronization tests against an in-memory backend fake.
//!
//! The fake records every remote call, so these tests can assert not just
//! outcomes but which requests were (and were not) issued, in what order.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use ragctl::config::{BackendConfig, Config, HistoryConfig, UploadConfig};
use ragctl::delete::delete_document;
use ragctl::error::ApiError;
use ragctl::guard::{OpKind, OperationGuard};
use ragctl::models::Document;
use ragctl::notify::{Notice, Notifier};
use ragctl::reindex::rebuild_context;
use ragctl::remote::RemoteStore;
use ragctl::store::DocumentList;
use ragctl::upload::{upload_batch, UploadCandidate};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    List,
    Upload(String),
    DeleteFile(String),
    DeleteContext,
    CreateEmbeddings,
    Send(String),
}

/// In-memory `RemoteStore` with programmable failures and a call log.
#[derive(Default)]
struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    files: Mutex<Vec<Document>>,
    fail_uploads: HashSet<String>,
    fail_list: bool,
    fail_delete_file: bool,
    fail_delete_context: bool,
    fail_create: bool,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
}

impl FakeBackend {
    fn with_files(files: Vec<Document>) -> Self {
        let backend = FakeBackend::default();
        *backend.files.lock().unwrap() = files;
        backend
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn server_error(message: &str) -> ApiError {
        ApiError::Server {
            status: 500,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl RemoteStore for FakeBackend {
    async fn list_files(&self) -> Result<Vec<Document>, ApiError> {
        self.record(Call::List);
        if self.fail_list {
            return Err(ApiError::Server {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(self.files.lock().unwrap().clone())
    }

    async fn upload_file(
        &self,
        name: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<(), ApiError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.record(Call::Upload(name.to_string()));

        // Give any concurrently issued upload a chance to show up.
        tokio::task::yield_now().await;

        let result = if self.fail_uploads.contains(name) {
            Err(Self::server_error("upload rejected"))
        } else {
            self.files.lock().unwrap().push(doc(name, name));
            Ok(())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn delete_file(&self, id: &str) -> Result<(), ApiError> {
        self.record(Call::DeleteFile(id.to_string()));
        if self.fail_delete_file {
            return Err(Self::server_error("Failed to delete file"));
        }
        self.files.lock().unwrap().retain(|d| d.id != id);
        Ok(())
    }

    async fn delete_context(&self) -> Result<(), ApiError> {
        self.record(Call::DeleteContext);
        if self.fail_delete_context {
            return Err(Self::server_error("Failed to clear old context."));
        }
        Ok(())
    }

    async fn create_embeddings(&self) -> Result<String, ApiError> {
        self.record(Call::CreateEmbeddings);
        if self.fail_create {
            return Err(Self::server_error("embedding build failed"));
        }
        Ok("Context has been updated successfully.".to_string())
    }

    async fn send_query(&self, query: &str) -> Result<String, ApiError> {
        self.record(Call::Send(query.to_string()));
        Ok("reply".to_string())
    }
}

/// Notifier that captures everything the user would have seen.
#[derive(Default)]
struct CaptureNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CaptureNotifier {
    fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    fn saw_reindex_failed(&self) -> bool {
        self.notices()
            .iter()
            .any(|n| matches!(n, Notice::ReindexFailed { .. }))
    }
}

impl Notifier for CaptureNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

fn doc(id: &str, name: &str) -> Document {
    Document {
        id: id.to_string(),
        name: name.to_string(),
        size: 1024,
        upload_date: None,
        url: None,
    }
}

fn pdf(name: &str) -> UploadCandidate {
    UploadCandidate {
        name: name.to_string(),
        content_type: "application/pdf".to_string(),
        bytes: vec![0x25, 0x50, 0x44, 0x46],
    }
}

fn test_config() -> Config {
    Config {
        backend: BackendConfig {
            base_url: "http://localhost:0".to_string(),
            timeout_secs: 5,
        },
        upload: UploadConfig::default(),
        history: HistoryConfig::default(),
    }
}

// ─── Upload pipeline ────────────────────────────────────────────────

#[tokio::test]
async fn scenario_a_three_valid_files_all_succeed() {
    let backend = FakeBackend::default();
    let guard = OperationGuard::new();
    let mut list = DocumentList::new();
    let notifier = CaptureNotifier::default();

    let summary = upload_batch(
        &backend,
        &guard,
        &mut list,
        &notifier,
        &test_config(),
        vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")],
    )
    .await
    .unwrap();

    assert_eq!(summary.succeeded.len(), 3);
    assert!(summary.failed.is_empty());
    assert!(summary.render().contains("3 file(s) uploaded successfully"));

    // Uploads, then exactly one reload, then exactly one rebuild pair.
    assert_eq!(
        backend.calls(),
        vec![
            Call::Upload("a.pdf".to_string()),
            Call::Upload("b.pdf".to_string()),
            Call::Upload("c.pdf".to_string()),
            Call::List,
            Call::DeleteContext,
            Call::CreateEmbeddings,
        ]
    );
    assert_eq!(list.len(), 3);
}

#[tokio::test]
async fn scenario_b_filtered_files_are_not_failures() {
    let backend = FakeBackend::default();
    let guard = OperationGuard::new();
    let mut list = DocumentList::new();
    let notifier = CaptureNotifier::default();

    let summary = upload_batch(
        &backend,
        &guard,
        &mut list,
        &notifier,
        &test_config(),
        vec![
            pdf("a.pdf"),
            UploadCandidate {
                name: "notes.txt".to_string(),
                content_type: "text/plain".to_string(),
                bytes: vec![1],
            },
        ],
    )
    .await
    .unwrap();

    assert_eq!(backend.count(|c| matches!(c, Call::Upload(_))), 1);
    assert_eq!(summary.succeeded.len(), 1);
    assert_eq!(summary.failed.len(), 0);
}

#[tokio::test]
async fn empty_filtered_batch_issues_no_network_calls() {
    let backend = FakeBackend::default();
    let guard = OperationGuard::new();
    let mut list = DocumentList::new();
    let notifier = CaptureNotifier::default();

    let err = upload_batch(
        &backend,
        &guard,
        &mut list,
        &notifier,
        &test_config(),
        vec![UploadCandidate {
            name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: vec![1],
        }],
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn denied_upload_issues_no_network_calls() {
    let backend = FakeBackend::default();
    let guard = OperationGuard::new();
    assert!(guard.try_enter(OpKind::Reindex));

    let mut list = DocumentList::new();
    let notifier = CaptureNotifier::default();

    let err = upload_batch(
        &backend,
        &guard,
        &mut list,
        &notifier,
        &test_config(),
        vec![pdf("a.pdf")],
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::OperationInProgress));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn every_valid_file_yields_exactly_one_outcome() {
    let mut backend = FakeBackend::default();
    backend.fail_uploads.insert("b.pdf".to_string());

    let guard = OperationGuard::new();
    let mut list = DocumentList::new();
    let notifier = CaptureNotifier::default();

    let summary = upload_batch(
        &backend,
        &guard,
        &mut list,
        &notifier,
        &test_config(),
        vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")],
    )
    .await
    .unwrap();

    // No fail-fast: c.pdf still uploads after b.pdf fails.
    assert_eq!(summary.total(), 3);
    assert_eq!(summary.succeeded, vec!["a.pdf", "c.pdf"]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].name, "b.pdf");

    // A partial failure still triggers the rebuild.
    assert_eq!(backend.count(|c| matches!(c, Call::DeleteContext)), 1);
    assert_eq!(backend.count(|c| matches!(c, Call::CreateEmbeddings)), 1);
}

#[tokio::test]
async fn all_failed_batch_skips_reload_and_reindex() {
    let mut backend = FakeBackend::default();
    backend.fail_uploads.insert("a.pdf".to_string());
    backend.fail_uploads.insert("b.pdf".to_string());

    let guard = OperationGuard::new();
    let mut list = DocumentList::new();
    let notifier = CaptureNotifier::default();

    let summary = upload_batch(
        &backend,
        &guard,
        &mut list,
        &notifier,
        &test_config(),
        vec![pdf("a.pdf"), pdf("b.pdf")],
    )
    .await
    .unwrap();

    assert!(!summary.any_succeeded());
    assert_eq!(backend.count(|c| matches!(c, Call::List)), 0);
    assert_eq!(backend.count(|c| matches!(c, Call::DeleteContext)), 0);
    assert_eq!(backend.count(|c| matches!(c, Call::CreateEmbeddings)), 0);
}

#[tokio::test]
async fn uploads_within_a_batch_never_overlap() {
    let backend = FakeBackend::default();
    let guard = OperationGuard::new();
    let mut list = DocumentList::new();
    let notifier = CaptureNotifier::default();

    upload_batch(
        &backend,
        &guard,
        &mut list,
        &notifier,
        &test_config(),
        vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf"), pdf("d.pdf")],
    )
    .await
    .unwrap();

    assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn guard_is_released_after_the_batch() {
    let backend = FakeBackend::default();
    let guard = OperationGuard::new();
    let mut list = DocumentList::new();
    let notifier = CaptureNotifier::default();

    upload_batch(
        &backend,
        &guard,
        &mut list,
        &notifier,
        &test_config(),
        vec![pdf("a.pdf")],
    )
    .await
    .unwrap();

    assert!(!guard.is_busy());
    assert!(guard.try_enter(OpKind::Upload));
}

// ─── Deletion controller ────────────────────────────────────────────

#[tokio::test]
async fn delete_success_removes_locally_and_reindexes() {
    let backend = FakeBackend::with_files(vec![doc("doc-1", "a.pdf"), doc("doc-2", "b.pdf")]);
    let guard = OperationGuard::new();
    let mut list = DocumentList::new();
    list.reload(&backend).await.unwrap();
    let notifier = CaptureNotifier::default();

    delete_document(&backend, &guard, &mut list, &notifier, "doc-1")
        .await
        .unwrap();

    assert!(list.get("doc-1").is_none());
    assert_eq!(list.len(), 1);
    assert_eq!(backend.count(|c| matches!(c, Call::DeleteContext)), 1);
    assert_eq!(backend.count(|c| matches!(c, Call::CreateEmbeddings)), 1);
    assert!(!guard.is_busy());
}

#[tokio::test]
async fn delete_rollback_restores_the_pre_call_list() {
    let mut backend = FakeBackend::with_files(vec![doc("doc-1", "a.pdf"), doc("doc-2", "b.pdf")]);
    backend.fail_delete_file = true;

    let guard = OperationGuard::new();
    let mut list = DocumentList::new();
    list.reload(&backend).await.unwrap();
    let before = list.snapshot();
    let notifier = CaptureNotifier::default();

    let err = delete_document(&backend, &guard, &mut list, &notifier, "doc-2")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    let after: Vec<&str> = list.documents().iter().map(|d| d.id.as_str()).collect();
    let expected: Vec<&str> = before.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(after, expected);

    // The failure never reaches the reindex trigger.
    assert_eq!(backend.count(|c| matches!(c, Call::DeleteContext)), 0);
    assert!(notifier
        .notices()
        .iter()
        .any(|n| matches!(n, Notice::DeleteRolledBack { .. })));
}

#[tokio::test]
async fn scenario_c_delete_rejected_while_reindexing() {
    let backend = FakeBackend::with_files(vec![doc("doc-42", "a.pdf")]);
    let guard = OperationGuard::new();
    assert!(guard.try_enter(OpKind::Reindex));

    let mut list = DocumentList::new();
    list.replace(vec![doc("doc-42", "a.pdf")]);
    let notifier = CaptureNotifier::default();

    let err = delete_document(&backend, &guard, &mut list, &notifier, "doc-42")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::OperationInProgress));
    assert_eq!(backend.count(|c| matches!(c, Call::DeleteFile(_))), 0);
    assert!(list.get("doc-42").is_some());
}

#[tokio::test]
async fn scenario_d_reindex_failure_does_not_undo_the_delete() {
    let mut backend = FakeBackend::with_files(vec![doc("doc-42", "a.pdf"), doc("doc-7", "b.pdf")]);
    backend.fail_delete_context = true;

    let guard = OperationGuard::new();
    let mut list = DocumentList::new();
    list.reload(&backend).await.unwrap();
    let notifier = CaptureNotifier::default();

    delete_document(&backend, &guard, &mut list, &notifier, "doc-42")
        .await
        .unwrap();

    // Create step never runs after the delete-old-index step failed.
    assert_eq!(backend.count(|c| matches!(c, Call::CreateEmbeddings)), 0);
    assert!(notifier.saw_reindex_failed());
    // The document deletion itself stands.
    assert!(list.get("doc-42").is_none());
}

// ─── Reindex trigger ────────────────────────────────────────────────

#[tokio::test]
async fn reindex_create_never_runs_when_delete_fails() {
    let mut backend = FakeBackend::default();
    backend.fail_delete_context = true;
    let guard = OperationGuard::new();

    let err = rebuild_context(&backend, &guard).await.unwrap_err();

    assert!(matches!(err, ApiError::Server { .. }));
    assert!(err.to_string().contains("Failed to clear old context."));
    assert_eq!(backend.count(|c| matches!(c, Call::CreateEmbeddings)), 0);
    assert!(!guard.is_busy());
}

#[tokio::test]
async fn reindex_surfaces_the_confirmation_verbatim() {
    let backend = FakeBackend::default();
    let guard = OperationGuard::new();

    let message = rebuild_context(&backend, &guard).await.unwrap();
    assert_eq!(message, "Context has been updated successfully.");
}

#[tokio::test]
async fn reindex_failed_create_leaves_guard_clear() {
    let mut backend = FakeBackend::default();
    backend.fail_create = true;
    let guard = OperationGuard::new();

    let err = rebuild_context(&backend, &guard).await.unwrap_err();

    assert!(err.to_string().contains("embedding build failed"));
    assert_eq!(backend.count(|c| matches!(c, Call::DeleteContext)), 1);
    assert!(!guard.is_busy());
}

#[tokio::test]
async fn reindex_denied_while_uploading() {
    let backend = FakeBackend::default();
    let guard = OperationGuard::new();
    assert!(guard.try_enter(OpKind::Upload));

    let err = rebuild_context(&backend, &guard).await.unwrap_err();

    assert!(matches!(err, ApiError::OperationInProgress));
    assert!(backend.calls().is_empty());
}

// ─── Document list reload ───────────────────────────────────────────

#[tokio::test]
async fn scenario_e_list_failure_falls_back_to_empty() {
    let mut backend = FakeBackend::with_files(vec![doc("doc-1", "a.pdf")]);
    backend.fail_list = true;

    let mut list = DocumentList::new();
    list.replace(vec![doc("stale", "old.pdf")]);

    let err = list.reload(&backend).await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 503, .. }));
    assert!(list.is_empty());
}

#[tokio::test]
async fn reload_reconciles_to_remote_truth() {
    let backend = FakeBackend::with_files(vec![doc("doc-1", "a.pdf"), doc("doc-2", "b.pdf")]);

    let mut list = DocumentList::new();
    list.replace(vec![doc("stale", "old.pdf")]);
    list.reload(&backend).await.unwrap();

    let ids: Vec<&str> = list.documents().iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["doc-1", "doc-2"]);
}
