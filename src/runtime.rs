//! Runtime services and shared state for the lore-bot.

use tokio::sync::mpsc;
use tracing::{Instrument, error, info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::dispatch,
    service::{
        chat::ChatClient,
        db::DbClient,
        outbox::{self, Outbox, OutboxReceiver},
    },
};

/// Capacity of the queue between the transport task and the event loop.
const EVENT_BUFFER_SIZE: usize = 256;

/// Runtime service context that is handed to every handler.
///
/// This struct holds the configuration, the database client, the chat client,
/// and the producer side of the outbound queue.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The database client instance.
    pub db: DbClient,
    /// The chat client instance.
    pub chat: ChatClient,
    /// The outbound delivery queue.
    pub outbox: Outbox,
}

impl Runtime {
    /// Create a new runtime instance, connecting to the database and chat services.
    ///
    /// The returned receiver must be handed to [`Runtime::start`].
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<(Self, OutboxReceiver)> {
        // Initialize the database.
        let db = DbClient::surreal(&config).await?;

        // Initialize the chat client.
        let chat = ChatClient::slack(&config).await?;

        Ok(Self::with_services(config, db, chat))
    }

    /// Create a runtime around already constructed services.
    pub fn with_services(config: Config, db: DbClient, chat: ChatClient) -> (Self, OutboxReceiver) {
        let (outbox, receiver) = Outbox::new(config.outbound_queue_capacity);

        (Self { config, db, chat, outbox }, receiver)
    }

    /// The bot's own user ID.
    pub fn bot_user_id(&self) -> &str {
        self.chat.bot_user_id()
    }

    /// Runs the bot until the chat connection ends.
    ///
    /// Spawns the outbound delivery worker and the transport listener, then runs
    /// the event loop on the current task. An authentication failure is returned as an error.
    pub async fn start(self, receiver: OutboxReceiver) -> Void {
        // Start the single outbound consumer.
        tokio::spawn(outbox::run_delivery_worker(receiver, self.chat.clone(), self.config.bot_identity()).in_current_span());

        // Start the transport listener.
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER_SIZE);
        let chat = self.chat.clone();
        tokio::spawn(
            async move {
                if let Err(err) = chat.start(events_tx).await {
                    error!("Chat listener stopped with an error: {}", err);
                }
            }
            .in_current_span(),
        );

        info!("Listening for events ...");

        dispatch::run_event_loop(self, events_rx).await
    }
}
