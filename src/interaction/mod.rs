//! Event handling and user interactions for lore-bot.
//!
//! This module provides functionality for handling chat events:
//! - Dispatching inbound events to per-event handler tasks
//! - Capturing and upvoting lore from trigger reactions
//! - Answering commands addressed to the bot

pub mod command;
pub mod dispatch;
pub mod reaction;
