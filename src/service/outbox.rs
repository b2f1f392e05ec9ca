//! Outbound delivery queue.
//!
//! Every bot post goes through a single bounded FIFO queue that is drained by
//! exactly one worker, so handlers never talk to the chat transport directly.

use tokio::sync::mpsc;
use tracing::{error, info, instrument};

use crate::base::types::{BotIdentity, OutboundMessage, Void};

use super::chat::ChatClient;

// Types.

/// Receiving half of the outbound queue.
///
/// It is not cloneable, so whoever owns it is the only consumer.
pub type OutboxReceiver = mpsc::Receiver<OutboundMessage>;

// Structs.

/// Producer handle for the outbound queue.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Outbox {
    sender: mpsc::Sender<OutboundMessage>,
}

impl Outbox {
    /// Creates a queue holding at most `capacity` pending messages.
    pub fn new(capacity: usize) -> (Self, OutboxReceiver) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Enqueues a message, waiting for room if the queue is full.
    pub async fn enqueue(&self, message: OutboundMessage) -> Void {
        self.sender.send(message).await.map_err(|_| anyhow::anyhow!("Outbound delivery worker has stopped"))
    }
}

/// Drains the queue in order, posting each message under `identity`.
///
/// Returns once every [`Outbox`] handle has been dropped and the queue is empty.
/// Failed posts are logged and skipped.
#[instrument(skip_all)]
pub async fn run_delivery_worker(mut receiver: OutboxReceiver, chat: ChatClient, identity: BotIdentity) {
    info!("Outbound delivery worker started.");

    while let Some(message) = receiver.recv().await {
        if let Err(err) = chat.post_message(&message.channel_id, &message.text, &identity).await {
            error!("Error while posting to `{}`: {}", message.channel_id, err);
        }
    }

    info!("Outbound delivery worker stopped.");
}

// Tests.
