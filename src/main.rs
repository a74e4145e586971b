//! # ragctl CLI
//!
//! Command-line client for a document-grounded chat assistant backend.
//!
//! ## Usage
//!
//! ```bash
//! ragctl --config ./config/ragctl.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragctl list` | List documents in the remote store |
//! | `ragctl upload <files>...` | Upload documents and rebuild the context |
//! | `ragctl delete <id>` | Delete one document and rebuild the context |
//! | `ragctl reindex` | Rebuild the derived context from the current documents |
//! | `ragctl ask "<query>"` | Send a chat query to the backend |
//! | `ragctl history show` | Print the local chat history |
//! | `ragctl history clear` | Clear the local chat history |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ragctl::notify::NotifyMode;
use ragctl::{chat, config, delete, history, reindex, store, upload};

/// ragctl — manage the document context of a RAG chat backend.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/ragctl.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "ragctl",
    about = "Manage the document context of a RAG chat backend",
    version,
    long_about = "ragctl keeps a local document list, a remote document store, and the remote \
    derived index (\"context\") mutually consistent: documents are uploaded and deleted through \
    the backend, and the context is rebuilt wholesale after every mutation."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ragctl.toml")]
    config: PathBuf,

    /// Notice channel: `off`, `human`, or `json`.
    /// Defaults to `human` when stderr is a terminal, otherwise `off`.
    #[arg(long, global = true)]
    notify: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List documents in the remote store.
    ///
    /// Issues a cache-busted fetch so the list reflects the latest server
    /// state, and prints id, name, size, and upload date per document.
    List,

    /// Upload one or more documents and rebuild the context.
    ///
    /// Files are filtered to the accepted content types (PDF by default),
    /// uploaded one at a time, and summarized per file. If at least one
    /// upload succeeds, the context is rebuilt.
    Upload {
        /// Files to upload.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Delete one document by id and rebuild the context.
    ///
    /// Asks for confirmation unless `--yes` is given. The deletion is
    /// applied optimistically and rolled back if the backend rejects it.
    Delete {
        /// Document id as reported by `ragctl list`.
        id: String,

        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Rebuild the derived context from the current document set.
    ///
    /// Deletes the existing context, then creates new vector embeddings.
    /// If the delete step fails, the create step is never attempted.
    Reindex,

    /// Send a chat query to the backend.
    ///
    /// The query and the reply are appended to the local chat history.
    Ask {
        /// The query text.
        query: String,
    },

    /// Inspect or clear the local chat history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

/// Chat history subcommands.
#[derive(Subcommand)]
enum HistoryAction {
    /// Print all messages in order.
    Show,
    /// Remove all messages.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

fn parse_notify_mode(flag: Option<&str>) -> anyhow::Result<NotifyMode> {
    match flag {
        None => Ok(NotifyMode::default_for_tty()),
        Some("off") => Ok(NotifyMode::Off),
        Some("human") => Ok(NotifyMode::Human),
        Some("json") => Ok(NotifyMode::Json),
        Some(other) => anyhow::bail!(
            "Unknown notify mode: '{}'. Must be off, human, or json.",
            other
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config(&cli.config)?;
    let notifier = parse_notify_mode(cli.notify.as_deref())?.notifier();

    match cli.command {
        Commands::List => {
            store::run_list(&cfg).await?;
        }
        Commands::Upload { files } => {
            upload::run_upload(&cfg, &files, notifier.as_ref()).await?;
        }
        Commands::Delete { id, yes } => {
            delete::run_delete(&cfg, &id, yes, notifier.as_ref()).await?;
        }
        Commands::Reindex => {
            reindex::run_reindex(&cfg).await?;
        }
        Commands::Ask { query } => {
            chat::run_ask(&cfg, &query).await?;
        }
        Commands::History { action } => match action {
            HistoryAction::Show => {
                history::run_history_show(&cfg)?;
            }
            HistoryAction::Clear { yes } => {
                history::run_history_clear(&cfg, yes)?;
            }
        },
    }

    Ok(())
}
