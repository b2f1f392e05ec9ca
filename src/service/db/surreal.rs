//! SurrealDB implementation of the lore store.

use std::sync::Arc;

use async_trait::async_trait;
use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::base::{
    config::Config,
    types::{InsertOutcome, Lore, Res, Void},
};

use super::{DbClient, GenericDbClient};

// Extra methods on `DbClient` applied by the surreal implementation.

impl DbClient {
    /// Creates a new SurrealDB client from the application configuration.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let client = SurrealDbClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }

    /// Creates a new in-memory SurrealDB client.
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealDbClient::memory(10).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// SurrealDB client for lore-bot.
///
/// Each lore is stored under the record ID `lore:[author, content]`, so the
/// record ID itself guarantees at most one lore per pair. Writes made through one
/// client are serialized, so concurrent upvotes never hit a transaction conflict.
#[derive(Clone)]
pub struct SurrealDbClient {
    db: Surreal<Any>,
    recent_limit: usize,
    writes: Arc<Mutex<()>>,
}

impl SurrealDbClient {
    /// Connects to the configured endpoint, signs in (if credentials are set), and defines the schema.
    #[instrument(name = "SurrealDbClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let db = any::connect(config.db_endpoint.as_str()).await?;

        if let (Some(username), Some(password)) = (&config.db_username, &config.db_password) {
            db.signin(Root { username, password }).await?;
        }

        db.use_ns(config.db_namespace.as_str()).use_db(config.db_database.as_str()).await?;

        let client = Self {
            db,
            recent_limit: config.recent_limit,
            writes: Arc::new(Mutex::new(())),
        };
        client.define_schema().await?;

        info!("Database initialized successfully.");

        Ok(client)
    }

    /// Creates an embedded, in-memory database.
    #[instrument(name = "SurrealDbClient::memory", skip_all)]
    pub async fn memory(recent_limit: usize) -> Res<Self> {
        let db = any::connect("mem://").await?;
        db.use_ns("lore").use_db("bot").await?;

        let client = Self {
            db,
            recent_limit,
            writes: Arc::new(Mutex::new(())),
        };
        client.define_schema().await?;

        Ok(client)
    }

    async fn define_schema(&self) -> Void {
        self.db
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS lore SCHEMAFULL;
                DEFINE FIELD IF NOT EXISTS author ON lore TYPE string;
                DEFINE FIELD IF NOT EXISTS content ON lore TYPE string;
                DEFINE FIELD IF NOT EXISTS upvotes ON lore TYPE int DEFAULT 0;
                DEFINE FIELD IF NOT EXISTS created_at ON lore TYPE datetime DEFAULT time::now();
                DEFINE INDEX IF NOT EXISTS lore_identity ON lore FIELDS content, author UNIQUE;
                "#,
            )
            .await?
            .check()?;

        Ok(())
    }

    async fn create_lore(&self, author: &str, content: &str) -> Void {
        self.db
            .query("CREATE type::thing('lore', [$author, $content]) CONTENT { author: $author, content: $content }")
            .bind(("author", author.to_string()))
            .bind(("content", content.to_string()))
            .await?
            .check()?;

        Ok(())
    }

    async fn increment_upvotes(&self, author: &str, content: &str) -> Void {
        self.db
            .query("UPDATE type::thing('lore', [$author, $content]) SET upvotes += 1")
            .bind(("author", author.to_string()))
            .bind(("content", content.to_string()))
            .await?
            .check()?;

        Ok(())
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    #[instrument(skip(self))]
    async fn find_lore(&self, content: &str, author: &str) -> Res<Option<Lore>> {
        let mut response = self
            .db
            .query("SELECT author, content, upvotes FROM type::thing('lore', [$author, $content])")
            .bind(("author", author.to_string()))
            .bind(("content", content.to_string()))
            .await?;

        let lores: Vec<Lore> = response.take(0)?;

        Ok(lores.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn upvote_lore(&self, author: &str, content: &str) -> Void {
        let _writes = self.writes.lock().await;

        self.increment_upvotes(author, content).await
    }

    #[instrument(skip(self))]
    async fn insert_lore(&self, author: &str, content: &str) -> Res<InsertOutcome> {
        let _writes = self.writes.lock().await;

        let Err(err) = self.create_lore(author, content).await else {
            return Ok(InsertOutcome::Created);
        };

        // The create only fails on a collision if the lore is now there.
        if self.find_lore(content, author).await?.is_none() {
            return Err(err);
        }

        warn!("Lore was inserted concurrently, upvoting instead.");
        self.increment_upvotes(author, content).await?;

        Ok(InsertOutcome::Merged)
    }

    #[instrument(skip(self))]
    async fn recent_lore(&self) -> Res<Vec<Lore>> {
        let mut response = self
            .db
            .query("SELECT author, content, upvotes, created_at FROM lore ORDER BY created_at DESC LIMIT $limit")
            .bind(("limit", self.recent_limit as i64))
            .await?;

        Ok(response.take(0)?)
    }

    #[instrument(skip(self))]
    async fn lore_for_user(&self, author: &str) -> Res<Vec<Lore>> {
        let mut response = self
            .db
            .query("SELECT author, content, upvotes, created_at FROM lore WHERE author = $author ORDER BY created_at DESC")
            .bind(("author", author.to_string()))
            .await?;

        Ok(response.take(0)?)
    }

    #[instrument(skip(self))]
    async fn search_lore(&self, query: &str) -> Res<Vec<Lore>> {
        let mut response = self
            .db
            .query("SELECT author, content, upvotes, created_at FROM lore WHERE string::contains(string::lowercase(content), string::lowercase($query)) ORDER BY created_at DESC")
            .bind(("query", query.to_string()))
            .await?;

        Ok(response.take(0)?)
    }
}

// Tests.
