//! This module turns a trigger reaction into a new lore, or an upvote of an existing one.

use tracing::{Instrument, debug, error, info, instrument, warn};

use crate::{
    base::{
        format,
        types::{InsertOutcome, Lore, OutboundMessage, Void},
    },
    runtime::Runtime,
};

/// Handles a trigger reaction on a message.
///
/// It spawns a new task to handle the event asynchronously.
#[instrument(skip_all)]
pub fn handle_reaction(runtime: Runtime, channel_id: String, message_id: String) {
    tokio::spawn(
        async move {
            // Process the event.
            let result = resolve_reaction(&runtime, &channel_id, &message_id).await;

            // Log any errors.
            if let Err(err) = &result {
                error!("Error while handling: {}", err);
            }
        }
        .in_current_span(),
    );
}

/// Looks up the reacted-to message in the channel's recent history and records it.
///
/// Enqueues exactly one announcement when a lore is added or upvoted, and none
/// otherwise. Messages that have scrolled out of the history window are ignored.
#[instrument(skip(runtime))]
pub async fn resolve_reaction(runtime: &Runtime, channel_id: &str, message_id: &str) -> Void {
    let history = match runtime.chat.fetch_history(channel_id).await {
        Ok(history) => history,
        Err(err) => {
            error!("Failed to fetch history for `{}`: {}", channel_id, err);
            return Ok(());
        }
    };

    let Some(message) = history.into_iter().find(|m| m.id == message_id) else {
        debug!("Message `{}` is not in the recent history.", message_id);
        return Ok(());
    };

    let lore = Lore::new(message.author, message.text);

    if runtime.db.lore_exists(&lore.content, &lore.author).await? {
        runtime.db.upvote_lore(&lore.author, &lore.content).await?;
        runtime.outbox.enqueue(OutboundMessage::new(channel_id, format::lore_upvoted(&lore))).await?;
        return Ok(());
    }

    // The bot never records its own output.
    if lore.author.is_empty() || lore.author == runtime.bot_user_id() {
        warn!("Ignoring reaction on the bot's own message.");
        return Ok(());
    }

    let text = match runtime.db.insert_lore(&lore.author, &lore.content).await? {
        InsertOutcome::Created => format::lore_added(&lore),
        InsertOutcome::Merged => format::lore_upvoted(&lore),
    };

    info!("Recorded lore from `{}`.", lore.author);

    runtime.outbox.enqueue(OutboundMessage::new(channel_id, text)).await?;

    Ok(())
}
