//! Local chat-message log.
//!
//! An append-only JSON document stored under a fixed storage key, holding
//! the chat view's message history: full-read, append with a generated id
//! and timestamp, and full-clear. The read is idempotent — reloading always
//! reflects the file's current contents, and a missing file is an empty
//! log. Dependents subscribe through [`LogObserver`] rather than listening
//! to an implicit global broadcast.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::{Config, HistoryConfig};
use crate::models::{ChatMessage, Role};
use crate::notify::confirm;

/// Storage key the log file is kept under.
pub const STORAGE_KEY: &str = "rag_chat_messages";

/// Change notification emitted to subscribers.
#[derive(Clone, Debug)]
pub enum LogEvent {
    MessageAdded(ChatMessage),
    Cleared,
}

pub trait LogObserver: Send + Sync {
    fn on_event(&self, event: LogEvent);
}

pub struct MessageLog {
    path: PathBuf,
    observers: Vec<Box<dyn LogObserver>>,
}

impl MessageLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            observers: Vec::new(),
        }
    }

    pub fn open(config: &HistoryConfig) -> Self {
        Self::new(config.path.clone())
    }

    pub fn subscribe(&mut self, observer: Box<dyn LogObserver>) {
        self.observers.push(observer);
    }

    /// Read every message in insertion order. A missing file is an empty log.
    pub fn read_all(&self) -> Result<Vec<ChatMessage>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read message log: {}", self.path.display()))?;
        let messages = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse message log: {}", self.path.display()))?;
        Ok(messages)
    }

    pub fn message_count(&self) -> Result<usize> {
        Ok(self.read_all()?.len())
    }

    /// Append one message with a generated id and timestamp.
    pub fn append(&self, role: Role, content: &str) -> Result<ChatMessage> {
        let mut messages = self.read_all()?;
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        };
        messages.push(message.clone());
        self.write(&messages)?;

        self.emit(LogEvent::MessageAdded(message.clone()));
        Ok(message)
    }

    /// Remove all messages.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).with_context(|| {
                format!("Failed to clear message log: {}", self.path.display())
            })?;
        }
        self.emit(LogEvent::Cleared);
        Ok(())
    }

    fn write(&self, messages: &[ChatMessage]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(messages)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write message log: {}", self.path.display()))
    }

    fn emit(&self, event: LogEvent) {
        for observer in &self.observers {
            observer.on_event(event.clone());
        }
    }
}

/// CLI entry point for `ragctl history show`.
pub fn run_history_show(config: &Config) -> Result<()> {
    let log = MessageLog::open(&config.history);
    let messages = log.read_all()?;

    if messages.is_empty() {
        println!("No messages.");
        return Ok(());
    }

    for message in &messages {
        println!(
            "[{}] {}: {}",
            message.timestamp.format("%Y-%m-%d %H:%M:%S"),
            message.role,
            message.content
        );
    }

    Ok(())
}

/// CLI entry point for `ragctl history clear`.
pub fn run_history_clear(config: &Config, yes: bool) -> Result<()> {
    if !yes && !confirm("Clear all chat messages?")? {
        println!("aborted");
        return Ok(());
    }

    let log = MessageLog::open(&config.history);
    let count = log.message_count()?;
    log.clear()?;
    println!("cleared {} message(s)", count);

    Ok(())
}
