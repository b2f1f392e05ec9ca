use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// A captured note, keyed by its `(content, author)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lore {
    /// The user who originally wrote the message.
    pub author: String,
    /// The raw message text, exactly as it was received.
    pub content: String,
    /// How many times the lore has been re-submitted after creation.
    #[serde(default)]
    pub upvotes: i64,
}

impl Lore {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            upvotes: 0,
        }
    }
}

/// Result of asking the store to insert a new lore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new record was written.
    Created,
    /// A record with the same content and author already existed, so it was upvoted instead.
    Merged,
}

/// A pending post, consumed exactly once by the delivery worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub channel_id: String,
    pub text: String,
}

impl OutboundMessage {
    pub fn new(channel_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            text: text.into(),
        }
    }
}

/// A single message out of a channel's recent history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    /// The transport's message identifier (a Slack `ts`).
    pub id: String,
    pub text: String,
    /// The author's user identifier; empty when the transport did not report one.
    pub author: String,
}

/// The transport events the bot reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    TextMessage { channel_id: String, text: String, sender: String },
    ReactionAdded { reaction: String, channel_id: String, message_id: String },
    AuthFailed { reason: String },
}

/// The fixed name and icon every bot post is tagged with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub display_name: String,
    pub icon_emoji: String,
}
