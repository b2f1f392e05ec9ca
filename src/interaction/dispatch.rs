//! The event loop: classifies each inbound event and fans it out to a handler task.

use tokio::sync::mpsc;
use tracing::{error, info, instrument, trace};

use crate::{
    base::types::{InboundEvent, Void},
    runtime::Runtime,
};

use super::{command, reaction};

/// Consumes events until the transport stream ends.
///
/// Messages and trigger reactions are each handled on their own task, so a slow
/// handler never blocks the loop. An [`InboundEvent::AuthFailed`] stops the loop
/// with an error.
#[instrument(skip_all)]
pub async fn run_event_loop(runtime: Runtime, mut events: mpsc::Receiver<InboundEvent>) -> Void {
    while let Some(event) = events.recv().await {
        match event {
            InboundEvent::TextMessage { channel_id, text, sender } => {
                command::handle_message(runtime.clone(), channel_id, text, sender);
            }
            InboundEvent::ReactionAdded { reaction: name, channel_id, message_id } if name == runtime.config.trigger_reaction => {
                reaction::handle_reaction(runtime.clone(), channel_id, message_id);
            }
            InboundEvent::ReactionAdded { reaction: name, .. } => {
                trace!("Ignoring `{}` reaction.", name);
            }
            InboundEvent::AuthFailed { reason } => {
                error!("Invalid credentials: {}", reason);
                return Err(anyhow::anyhow!("Invalid credentials: {}", reason));
            }
        }
    }

    info!("Event stream ended.");

    Ok(())
}
