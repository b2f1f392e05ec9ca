//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::{BotIdentity, Res};

/// Default reaction name that marks a message as lore.
fn default_trigger_reaction() -> String {
    "lore".to_string()
}

/// Default display name used for every bot post.
fn default_bot_display_name() -> String {
    "Lorebot".to_string()
}

/// Default icon emoji used for every bot post.
fn default_bot_icon_emoji() -> String {
    ":lore:".to_string()
}

/// Default capacity of the outbound delivery queue.
fn default_outbound_queue_capacity() -> usize {
    1000
}

/// Default number of lores returned by `recent`.
fn default_recent_limit() -> usize {
    10
}

/// Default database endpoint (embedded, in-memory).
fn default_db_endpoint() -> String {
    "mem://".to_string()
}

/// Default database namespace.
fn default_db_namespace() -> String {
    "lore".to_string()
}

/// Default database name.
fn default_db_database() -> String {
    "bot".to_string()
}

/// Configuration for the lore-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Slack app-level token used for socket mode (`SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// The bot's own Slack user ID (`BOT_USER_ID`).
    /// When unset, it is discovered via `auth.test` at startup.
    #[serde(default)]
    pub bot_user_id: Option<String>,
    /// Reaction name that captures or upvotes a message (`TRIGGER_REACTION`).
    #[serde(default = "default_trigger_reaction")]
    pub trigger_reaction: String,
    /// Display name attached to every bot post (`BOT_DISPLAY_NAME`).
    #[serde(default = "default_bot_display_name")]
    pub bot_display_name: String,
    /// Icon emoji attached to every bot post (`BOT_ICON_EMOJI`).
    #[serde(default = "default_bot_icon_emoji")]
    pub bot_icon_emoji: String,
    /// Capacity of the outbound delivery queue (`OUTBOUND_QUEUE_CAPACITY`).
    /// Producers wait once the queue is full.
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,
    /// Number of lores returned by the `recent` command (`RECENT_LIMIT`).
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    /// Database endpoint URL (`DB_ENDPOINT`), e.g. `ws://localhost:8000` or `mem://`.
    #[serde(default = "default_db_endpoint")]
    pub db_endpoint: String,
    /// Database username (`DB_USERNAME`).
    #[serde(default)]
    pub db_username: Option<String>,
    /// Database password (`DB_PASSWORD`).
    #[serde(default)]
    pub db_password: Option<String>,
    /// Database namespace (`DB_NAMESPACE`).
    #[serde(default = "default_db_namespace")]
    pub db_namespace: String,
    /// Database name (`DB_DATABASE`).
    #[serde(default = "default_db_database")]
    pub db_database: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            slack_app_token: String::new(),
            slack_bot_token: String::new(),
            bot_user_id: None,
            trigger_reaction: default_trigger_reaction(),
            bot_display_name: default_bot_display_name(),
            bot_icon_emoji: default_bot_icon_emoji(),
            outbound_queue_capacity: default_outbound_queue_capacity(),
            recent_limit: default_recent_limit(),
            db_endpoint: default_db_endpoint(),
            db_username: None,
            db_password: None,
            db_namespace: default_db_namespace(),
            db_database: default_db_database(),
        }
    }
}

impl ConfigInner {
    /// The name and icon every bot post is tagged with.
    pub fn bot_identity(&self) -> BotIdentity {
        BotIdentity {
            display_name: self.bot_display_name.clone(),
            icon_emoji: self.bot_icon_emoji.clone(),
        }
    }

    fn validate(&self) -> Res<()> {
        if self.trigger_reaction.is_empty() {
            return Err(anyhow::anyhow!("Trigger reaction must not be empty."));
        }

        if self.outbound_queue_capacity < 1 {
            return Err(anyhow::anyhow!("Outbound queue capacity must be at least 1."));
        }

        if self.recent_limit < 1 {
            return Err(anyhow::anyhow!("Recent limit must be at least 1."));
        }

        if self.db_username.is_some() != self.db_password.is_some() {
            return Err(anyhow::anyhow!("Database username and password must be set together."));
        }

        Ok(())
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("LORE_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let inner: ConfigInner = cfg.build()?.try_deserialize()?;
        inner.validate()?;

        Ok(Self::from(inner))
    }
}

// Tests.
