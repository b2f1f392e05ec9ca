//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for various services used by the lore-bot:
//! - Chat services (e.g., Slack)
//! - Database services (e.g., SurrealDB)
//! - The outbound delivery queue in front of the chat service
//!
//! Each external service module defines both a generic trait and a concrete implementation,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod db;
pub mod outbox;
