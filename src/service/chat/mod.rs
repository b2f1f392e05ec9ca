pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::base::types::{BotIdentity, HistoryMessage, InboundEvent, Res, Void};

// Types.

/// Sending half of the live event stream produced by a chat client.
pub type EventSender = mpsc::Sender<InboundEvent>;

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Slack. Implementing this trait allows different chat services to be used
/// with the lore-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Messages authored by this ID are never captured, and commands must
    /// mention it to be answered.
    fn bot_user_id(&self) -> &str;

    /// Start the chat client listener.
    ///
    /// Decoded events are forwarded into `events` until the connection ends.
    /// A rejected connection is reported as [`InboundEvent::AuthFailed`].
    async fn start(&self, events: EventSender) -> Void;

    /// Get the recent message history of a channel.
    async fn fetch_history(&self, channel_id: &str) -> Res<Vec<HistoryMessage>>;

    /// Post a message to a channel under the given identity.
    async fn post_message(&self, channel_id: &str, text: &str, identity: &BotIdentity) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
