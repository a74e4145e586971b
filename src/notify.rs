//! User-facing operation notices and prompts.
//!
//! Notices report what the synchronization engine did — upload summaries,
//! reindex progress, rollbacks — and are emitted on **stderr** so stdout
//! remains parseable for scripts. Components receive a [`Notifier`] rather
//! than printing directly, so tests can capture what would be shown.

use std::io::Write;

use crate::models::BatchSummary;

/// A single notice from the synchronization engine.
#[derive(Clone, Debug)]
pub enum Notice {
    /// Aggregated report after an upload batch.
    UploadSummary(BatchSummary),
    /// The derived index is being rebuilt.
    ReindexStarted,
    /// Rebuild finished; `message` is the server's confirmation verbatim.
    ReindexComplete { message: String },
    /// Rebuild failed; the index may be stale (delete step failed) or
    /// absent (create step failed), but never partially built.
    ReindexFailed { message: String },
    /// A remote delete failed and the local list was restored.
    DeleteRolledBack { id: String, reason: String },
    /// Non-fatal problem the user should know about.
    Warning(String),
}

/// Sink for notices. Implementations write to stderr (human or JSON).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Human-friendly notices on stderr.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        let line = match &notice {
            Notice::UploadSummary(summary) => format!("{}\n", summary.render()),
            Notice::ReindexStarted => "Creating vector embeddings...\n".to_string(),
            Notice::ReindexComplete { message } => format!("{}\n", message),
            Notice::ReindexFailed { message } => {
                format!("Error updating context: {}\n", message)
            }
            Notice::DeleteRolledBack { id, reason } => {
                format!("Delete of {} failed, local list restored: {}\n", id, reason)
            }
            Notice::Warning(message) => format!("Warning: {}\n", message),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }
}

/// Machine-readable notices: one JSON object per line on stderr.
pub struct JsonNotifier;

impl Notifier for JsonNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(line) = serde_json::to_string(&notice_json(&notice)) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }
}

/// No-op sink when notices are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notice: Notice) {}
}

fn notice_json(notice: &Notice) -> serde_json::Value {
    match notice {
        Notice::UploadSummary(summary) => serde_json::json!({
            "event": "upload_summary",
            "succeeded": summary.succeeded,
            "failed": summary.failed,
        }),
        Notice::ReindexStarted => serde_json::json!({
            "event": "reindex",
            "phase": "started",
        }),
        Notice::ReindexComplete { message } => serde_json::json!({
            "event": "reindex",
            "phase": "complete",
            "message": message,
        }),
        Notice::ReindexFailed { message } => serde_json::json!({
            "event": "reindex",
            "phase": "failed",
            "message": message,
        }),
        Notice::DeleteRolledBack { id, reason } => serde_json::json!({
            "event": "delete_rolled_back",
            "id": id,
            "reason": reason,
        }),
        Notice::Warning(message) => serde_json::json!({
            "event": "warning",
            "message": message,
        }),
    }
}

/// Notice mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NotifyMode {
    Off,
    Human,
    Json,
}

impl NotifyMode {
    /// Default: human notices when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            NotifyMode::Human
        } else {
            NotifyMode::Off
        }
    }

    pub fn notifier(&self) -> Box<dyn Notifier> {
        match self {
            NotifyMode::Off => Box::new(NullNotifier),
            NotifyMode::Human => Box::new(StderrNotifier),
            NotifyMode::Json => Box::new(JsonNotifier),
        }
    }
}

/// Blocking y/N confirmation on stdin. Anything other than an explicit yes
/// declines.
pub fn confirm(prompt: &str) -> std::io::Result<bool> {
    use std::io::BufRead;

    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
