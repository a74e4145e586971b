//! # ragctl
//!
//! Command-line client for managing the document context of a
//! retrieval-augmented chat backend. It keeps three things mutually
//! consistent: the local document list, the remote document store, and the
//! remote derived index ("context") built from the documents.
//!
//! ## Architecture
//!
//! ```text
//! user command
//!      │
//!      ▼
//! ┌───────────────┐  denies overlapping     ┌──────────────────┐
//! │ OperationGuard│  upload / reindex       │  RemoteStore     │
//! └──────┬────────┘                         │  (HTTP backend)  │
//!        ▼                                  └───────▲──────────┘
//! ┌──────────────────────────────┐                  │
//! │ Upload Pipeline / Deletion   │──────────────────┤
//! │ Controller / Reindex Trigger │                  │
//! └──────┬───────────────────────┘                  │
//!        ▼                                          │
//! ┌───────────────┐   full reload on mutation       │
//! │ DocumentList  │─────────────────────────────────┘
//! └───────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Remote-operation error taxonomy |
//! | [`guard`] | Upload/reindex mutual exclusion |
//! | [`remote`] | Backend HTTP client and the `RemoteStore` seam |
//! | [`store`] | Local document list with snapshot/rollback |
//! | [`upload`] | Sequential multi-file upload pipeline |
//! | [`delete`] | Optimistic single-document deletion |
//! | [`reindex`] | Delete-then-rebuild of the derived index |
//! | [`notify`] | User-facing notices (stderr, human or JSON) |
//! | [`history`] | Local chat-message log with change observers |
//! | [`chat`] | Chat query forwarding |

pub mod chat;
pub mod config;
pub mod delete;
pub mod error;
pub mod guard;
pub mod history;
pub mod models;
pub mod notify;
pub mod reindex;
pub mod remote;
pub mod store;
pub mod upload;
