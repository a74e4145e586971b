//! Core data models for the document-context client.
//!
//! These types represent the documents tracked by the remote store, the
//! per-file outcomes collected by the upload pipeline, and the chat messages
//! kept in the local history log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A document tracked by the remote store.
///
/// The remote store owns these; any local copy is a cached, possibly-stale
/// projection that reconciles on a full reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "uploadDate", default)]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Wire shape of `GET /files`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<Document>,
}

/// Outcome of one attempted upload. Every file that passes the content-type
/// filter yields exactly one of these.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Succeeded(String),
    Failed { name: String, reason: String },
}

/// One failed upload in a batch summary.
#[derive(Debug, Clone, Serialize)]
pub struct FailedUpload {
    pub name: String,
    pub reason: String,
}

/// Aggregated report of an upload batch, consumed once to produce the
/// user-facing summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedUpload>,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: Vec<UploadOutcome>) -> Self {
        let mut summary = BatchSummary::default();
        for outcome in outcomes {
            match outcome {
                UploadOutcome::Succeeded(name) => summary.succeeded.push(name),
                UploadOutcome::Failed { name, reason } => {
                    summary.failed.push(FailedUpload { name, reason })
                }
            }
        }
        summary
    }

    /// Number of files attempted (succeeded + failed). Filtered-out files
    /// are not counted — they never produced an outcome.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn any_succeeded(&self) -> bool {
        !self.succeeded.is_empty()
    }

    /// Human-readable report: a success count line plus, if any, one line
    /// per failed file with its reason.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.succeeded.is_empty() {
            out.push_str(&format!(
                "{} file(s) uploaded successfully.",
                self.succeeded.len()
            ));
        }
        if !self.failed.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("{} file(s) failed to upload:", self.failed.len()));
            for failure in &self.failed {
                out.push_str(&format!("\n- {} ({})", failure.name, failure.reason));
            }
        }
        out
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry of the local chat history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}
