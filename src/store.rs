//! Local document list — a cached projection of the remote store.
//!
//! The list is the only mutable shared state in the client. Optimistic
//! mutations (deletion) snapshot it first and restore the snapshot on remote
//! failure, so after any failed operation the list equals its pre-operation
//! state, and after any full reload it equals the remote truth.

use anyhow::Result;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::Document;
use crate::remote::{HttpBackend, RemoteStore};

#[derive(Debug, Default)]
pub struct DocumentList {
    docs: Vec<Document>,
}

impl DocumentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.docs.iter().find(|d| d.id == id)
    }

    pub fn replace(&mut self, docs: Vec<Document>) {
        self.docs = docs;
    }

    /// Remove a document by id, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<Document> {
        let index = self.docs.iter().position(|d| d.id == id)?;
        Some(self.docs.remove(index))
    }

    /// Capture the current state for a reversible optimistic mutation.
    pub fn snapshot(&self) -> Vec<Document> {
        self.docs.clone()
    }

    pub fn restore(&mut self, snapshot: Vec<Document>) {
        self.docs = snapshot;
    }

    /// Full reload from the remote store. On failure the list becomes empty
    /// (the empty-safe fallback) and the error is returned for reporting —
    /// a failed reload never leaves stale entries behind.
    pub async fn reload(&mut self, remote: &dyn RemoteStore) -> Result<(), ApiError> {
        match remote.list_files().await {
            Ok(files) => {
                self.docs = files;
                Ok(())
            }
            Err(e) => {
                self.docs.clear();
                Err(e)
            }
        }
    }
}

pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 MB".to_string();
    }
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

/// CLI entry point for `ragctl list`.
pub async fn run_list(config: &Config) -> Result<()> {
    let remote = HttpBackend::new(&config.backend)?;
    let mut list = DocumentList::new();

    if let Err(e) = list.reload(&remote).await {
        eprintln!("Error: failed to load documents: {}", e);
        std::process::exit(1);
    }

    if list.is_empty() {
        println!("No documents uploaded yet.");
        return Ok(());
    }

    println!("{} document(s)", list.len());
    for doc in list.documents() {
        let date = doc
            .upload_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  {}  {}  {}",
            doc.id,
            doc.name,
            format_file_size(doc.size),
            date
        );
    }

    Ok(())
}
