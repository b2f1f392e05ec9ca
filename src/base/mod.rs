//! Core components, types, and utilities for the lore-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Chat text formatting for replies and announcements.
//! - Common types and result handling.

pub mod config;
pub mod format;
pub mod types;
