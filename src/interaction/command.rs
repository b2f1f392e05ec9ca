//! This module handles commands addressed to the bot, e.g. `@lorebot search fire`.

use tracing::{Instrument, debug, error, instrument};

use crate::{
    base::{
        format,
        types::{OutboundMessage, Void},
    },
    runtime::Runtime,
};

/// A command the bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Recent,
    User(String),
    Search(String),
}

/// Parses a message into a command, if it is addressed to `bot_user_id`.
///
/// Returns `None` for messages that mention someone else, unknown commands, and
/// commands with the wrong number of arguments.
pub fn parse_command(text: &str, bot_user_id: &str) -> Option<Command> {
    let tokens = text.split_whitespace().collect::<Vec<_>>();

    let [target, name, args @ ..] = tokens.as_slice() else {
        return None;
    };

    if format::parse_user_id(target) != bot_user_id {
        return None;
    }

    match (*name, args) {
        ("help", _) => Some(Command::Help),
        ("recent", _) => Some(Command::Recent),
        ("user", [user]) => Some(Command::User(format::parse_user_id(user))),
        ("search", [_, ..]) => Some(Command::Search(args.join(" "))),
        _ => None,
    }
}

/// Handles a message event.
///
/// It spawns a new task to handle the event asynchronously.
#[instrument(skip_all)]
pub fn handle_message(runtime: Runtime, channel_id: String, text: String, sender: String) {
    tokio::spawn(
        async move {
            // Process the event.
            let result = process_message(&runtime, &channel_id, &text, &sender).await;

            // Log any errors.
            if let Err(err) = &result {
                error!("Error while handling: {}", err);
            }
        }
        .in_current_span(),
    );
}

/// Answers a command, enqueueing at most one reply.
#[instrument(skip(runtime, text))]
pub async fn process_message(runtime: &Runtime, channel_id: &str, text: &str, sender: &str) -> Void {
    let Some(command) = parse_command(text, runtime.bot_user_id()) else {
        return Ok(());
    };

    debug!("Running command {:?}.", command);

    let lores = match command {
        Command::Help => {
            runtime.outbox.enqueue(OutboundMessage::new(channel_id, format::USAGE)).await?;
            return Ok(());
        }
        Command::Recent => runtime.db.recent_lore().await?,
        Command::User(user) => runtime.db.lore_for_user(&user).await?,
        Command::Search(query) => runtime.db.search_lore(&query).await?,
    };

    runtime.outbox.enqueue(OutboundMessage::new(channel_id, format::format_listing(&lores))).await?;

    Ok(())
}

// Tests.
