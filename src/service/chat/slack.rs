//! Slack implementation of the chat transport.
//!
//! This module provides the lore-bot's connection to Slack:
//! - Receiving message and reaction events over socket mode
//! - Fetching channel history
//! - Posting messages under the bot's display identity

use crate::base::{
    config::Config,
    types::{BotIdentity, HistoryMessage, InboundEvent, Res, Void},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::{errors::SlackClientError, prelude::*};
use tracing::{debug, info, instrument, warn};

use std::{ops::Deref, sync::Arc};

use super::{ChatClient, EventSender, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Constants.

/// Number of history messages searched for a reacted-to message.
const HISTORY_LIMIT: u16 = 100;

/// Slack API error codes that mean the credentials were rejected.
const AUTH_ERROR_CODES: &[&str] = &["invalid_auth", "not_authed", "account_inactive", "token_revoked", "token_expired"];

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    events: EventSender,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub app_token: SlackApiToken,
    pub bot_token: SlackApiToken,
    pub bot_user_id: String,
    pub client: Arc<FullClient>,
}

impl Deref for SlackChatClient {
    type Target = FullClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Verify the bot token, and get the bot's user ID unless it is configured explicitly.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await.map_err(|e| anyhow::anyhow!("Failed to authenticate with Slack: {}", e))?;

        let bot_user_id = match &config.bot_user_id {
            Some(id) if *id != bot_user.user_id.0 => {
                warn!("Configured bot user ID `{}` differs from the token's user `{}`.", id, bot_user.user_id.0);
                id.clone()
            }
            Some(id) => id.clone(),
            None => bot_user.user_id.0,
        };

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id,
            client,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn start(&self, events: EventSender) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new()
            .with_command_events(handle_command_event)
            .with_interaction_events(handle_interaction_event)
            .with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState { events: events.clone() }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // `listen_for` only registers the token, and `serve` retries rejected tokens forever,
        // so the app token is checked here first. A rejected token is fatal for the bot.
        let session = self.client.open_session(&self.app_token);
        if let Err(err) = session.apps_connections_open(&SlackApiAppsConnectionOpenRequest::new()).await {
            if is_auth_error(&err) {
                events.send(InboundEvent::AuthFailed { reason: err.to_string() }).await?;
                return Ok(());
            }

            return Err(anyhow::anyhow!("Failed to open a socket mode connection: {}", err));
        }

        // Register an app token to listen for events.
        socket_mode_listener.listen_for(&self.app_token).await?;

        // Start WS connections calling Slack API to get WS url for the token,
        // and wait for Ctrl-C to shutdown.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_history(&self, channel_id: &str) -> Res<Vec<HistoryMessage>> {
        let request = SlackApiConversationsHistoryRequest::new().with_channel(SlackChannelId(channel_id.to_string())).with_limit(HISTORY_LIMIT);

        let session = self.client.open_session(&self.bot_token);

        let response = session.conversations_history(&request).await.map_err(|e| anyhow::anyhow!("Failed to fetch history: {}", e))?;

        Ok(response.messages.into_iter().map(to_history_message).collect())
    }

    #[instrument(skip(self, text))]
    async fn post_message(&self, channel_id: &str, text: &str, identity: &BotIdentity) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message)
            .with_username(identity.display_name.clone())
            .with_icon_emoji(identity.icon_emoji.clone());

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Helpers.

/// Whether Slack rejected the request because of bad credentials.
fn is_auth_error(err: &SlackClientError) -> bool {
    matches!(err, SlackClientError::ApiError(api_error) if AUTH_ERROR_CODES.contains(&api_error.code.as_str()))
}

fn to_history_message(message: SlackHistoryMessage) -> HistoryMessage {
    HistoryMessage {
        id: message.origin.ts.0,
        text: message.content.text.unwrap_or_default(),
        author: message.sender.user.map(|u| u.0).unwrap_or_default(),
    }
}

fn decode_message_event(event: SlackMessageEvent) -> Option<InboundEvent> {
    let channel_id = event.origin.channel?.0;
    let text = event.content?.text?;
    let sender = event.sender.user.map(|u| u.0).unwrap_or_default();

    Some(InboundEvent::TextMessage { channel_id, text, sender })
}

fn decode_reaction_event(event: SlackReactionAddedEvent) -> Option<InboundEvent> {
    let SlackReactionsItem::Message(item) = event.item else {
        return None;
    };

    Some(InboundEvent::ReactionAdded {
        reaction: event.reaction.0,
        channel_id: item.origin.channel?.0,
        message_id: item.origin.ts.0,
    })
}

// Socket mode listener callbacks for Slack.

/// Handles command events from Slack.
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    warn!("[COMMAND] {:#?}", event);
    Ok(SlackCommandEventResponse::new(SlackMessageContent::new().with_text("No app commands are supported; mention the bot instead.".into())))
}

/// Handles interaction events from Slack.
async fn handle_interaction_event(event: SlackInteractionEvent, _client: Arc<SlackHyperClient>, _states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    warn!("[INTERACTION] {:#?}", event);
    Ok(())
}

/// Handles push events from Slack, forwarding the ones the bot understands.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let events = {
        let states = states.read().await;
        let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;
        user_state.events.clone()
    };

    let event = match event_callback.event {
        SlackEventCallbackBody::Message(slack_message_event) => decode_message_event(slack_message_event),
        SlackEventCallbackBody::ReactionAdded(slack_reaction_added_event) => decode_reaction_event(slack_reaction_added_event),
        _ => None,
    };

    match event {
        Some(event) => events.send(event).await.map_err(|_| anyhow::anyhow!("Event loop is no longer running"))?,
        None => debug!("Ignoring push event."),
    }

    Ok(())
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: &str) -> SlackClientError {
        SlackClientError::ApiError(slack_morphism::errors::SlackClientApiError::new(code.to_string()))
    }

    fn origin(channel: Option<&str>, ts: &str) -> SlackMessageOrigin {
        let origin = SlackMessageOrigin::new(SlackTs(ts.to_string()));

        match channel {
            Some(channel) => origin.with_channel(SlackChannelId(channel.to_string())),
            None => origin,
        }
    }

    fn sender(user: Option<&str>) -> SlackMessageSender {
        match user {
            Some(user) => SlackMessageSender::new().with_user(SlackUserId(user.to_string())),
            None => SlackMessageSender::new().with_bot_id(SlackBotId("B01LORE".to_string())),
        }
    }

    fn history(channel: Option<&str>, ts: &str, user: Option<&str>, text: &str) -> SlackHistoryMessage {
        SlackHistoryMessage::new(origin(channel, ts), SlackMessageContent::new().with_text(text.to_string()), sender(user), SlackParentMessageParams::new())
    }

    fn reaction(item: SlackReactionsItem) -> SlackReactionAddedEvent {
        SlackReactionAddedEvent::new(SlackUserId("UC".to_string()), SlackReactionName("lore".to_string()), item, SlackTs("1700000009.000900".to_string()))
    }

    #[test]
    fn auth_errors_are_recognized_by_code() {
        for code in AUTH_ERROR_CODES {
            assert!(is_auth_error(&api_error(code)), "`{code}` should be an auth error");
        }

        for code in ["channel_not_found", "ratelimited", "invalid_auth_extra"] {
            assert!(!is_auth_error(&api_error(code)), "`{code}` should not be an auth error");
        }
    }

    #[test]
    fn history_messages_map_to_domain_messages() {
        let cases = [
            (history(None, "1.1", Some("UA"), "it was DNS"), "UA"),
            (history(None, "1.1", None, "it was DNS"), ""),
        ];

        for (message, author) in cases {
            assert_eq!(
                to_history_message(message),
                HistoryMessage {
                    id: "1.1".to_string(),
                    text: "it was DNS".to_string(),
                    author: author.to_string(),
                }
            );
        }
    }

    #[test]
    fn message_events_need_a_channel_and_text() {
        let full = SlackMessageEvent::new(origin(Some("C1"), "1.1"), sender(Some("UA"))).with_content(SlackMessageContent::new().with_text("<@UBOT> help".to_string()));
        let bot_post = SlackMessageEvent::new(origin(Some("C1"), "1.1"), sender(None)).with_content(SlackMessageContent::new().with_text("Lore added".to_string()));
        let no_content = SlackMessageEvent::new(origin(Some("C1"), "1.1"), sender(Some("UA")));
        let no_text = SlackMessageEvent::new(origin(Some("C1"), "1.1"), sender(Some("UA"))).with_content(SlackMessageContent::new());
        let no_channel = SlackMessageEvent::new(origin(None, "1.1"), sender(Some("UA"))).with_content(SlackMessageContent::new().with_text("hi".to_string()));

        let cases = [
            (full, Some(("<@UBOT> help", "UA"))),
            (bot_post, Some(("Lore added", ""))),
            (no_content, None),
            (no_text, None),
            (no_channel, None),
        ];

        for (event, expected) in cases {
            let expected = expected.map(|(text, sender)| InboundEvent::TextMessage {
                channel_id: "C1".to_string(),
                text: text.to_string(),
                sender: sender.to_string(),
            });

            assert_eq!(decode_message_event(event), expected);
        }
    }

    #[test]
    fn reaction_events_need_a_message_item_with_a_channel() {
        let on_message = reaction(SlackReactionsItem::Message(history(Some("C1"), "1.1", Some("UA"), "it was DNS")));
        let on_file = reaction(SlackReactionsItem::File(SlackFile::new(SlackFileId("F01LORE".to_string()), SlackFileFlags::new())));
        let without_channel = reaction(SlackReactionsItem::Message(history(None, "1.1", Some("UA"), "it was DNS")));

        assert_eq!(
            decode_reaction_event(on_message),
            Some(InboundEvent::ReactionAdded {
                reaction: "lore".to_string(),
                channel_id: "C1".to_string(),
                message_id: "1.1".to_string(),
            })
        );
        assert_eq!(decode_reaction_event(on_file), None);
        assert_eq!(decode_reaction_event(without_channel), None);
    }
}
