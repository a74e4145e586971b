//! Chat query forwarding.
//!
//! Sends one user query to the backend and records both sides of the
//! exchange in the local message log. The query is appended before the
//! request goes out, matching the chat view's behavior; a failed request
//! leaves the user message in the log so a retry reads naturally.

use anyhow::Result;

use crate::config::Config;
use crate::history::MessageLog;
use crate::models::Role;
use crate::remote::{HttpBackend, RemoteStore};

/// CLI entry point for `ragctl ask`.
pub async fn run_ask(config: &Config, query: &str) -> Result<()> {
    let remote = HttpBackend::new(&config.backend)?;
    let log = MessageLog::open(&config.history);

    log.append(Role::User, query)?;

    match remote.send_query(query).await {
        Ok(reply) => {
            log.append(Role::Assistant, &reply)?;
            println!("{}", reply);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
