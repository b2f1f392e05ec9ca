//! Library root for `lore-bot`.
//!
//! Lore-bot is a Slack bot that collects a team's memorable quotes:
//! - Reacting to a message with the trigger emoji records it as lore
//! - Reacting to an already recorded message upvotes it instead
//! - Mentioning the bot answers `help`, `recent`, `user`, and `search` queries
//!
//! The bot integrates with Slack for chat and SurrealDB for storage. The
//! architecture is built around traits that allow for different implementations
//! of each service.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use anyhow::anyhow;
use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the lore-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with database and chat clients
/// - Starts the main event loop for processing events
pub async fn start(config: Config) -> Void {
    info!("Starting lore-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().map_err(|_| anyhow!("Failed to install the crypto provider"))?;

    // Initialize the runtime.
    let (runtime, outbox) = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start(outbox).await?;

    Ok(())
}
