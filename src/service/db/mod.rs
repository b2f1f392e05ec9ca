//! Record store for captured lore.

pub mod surreal;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{InsertOutcome, Lore, Res, Void};

// Traits.

/// Generic database client trait that clients must implement.
///
/// Implementations must guarantee that at most one lore exists per
/// `(content, author)` pair, even when two inserts for the same pair race.
/// Every list query returns an explicit, possibly empty, `Vec`.
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    /// Gets the lore with exactly this content and author, if any.
    async fn find_lore(&self, content: &str, author: &str) -> Res<Option<Lore>>;

    /// Checks whether a lore with exactly this content and author exists.
    async fn lore_exists(&self, content: &str, author: &str) -> Res<bool> {
        Ok(self.find_lore(content, author).await?.is_some())
    }

    /// Increments the upvote counter of an existing lore.
    async fn upvote_lore(&self, author: &str, content: &str) -> Void;

    /// Inserts a new lore with the default upvote count.
    ///
    /// If the pair already exists (e.g., a concurrent insert won the race), the
    /// existing lore is upvoted and [`InsertOutcome::Merged`] is returned.
    async fn insert_lore(&self, author: &str, content: &str) -> Res<InsertOutcome>;

    /// Gets the most recently created lores across all users, newest first.
    async fn recent_lore(&self) -> Res<Vec<Lore>>;

    /// Gets every lore written by the given user, newest first.
    async fn lore_for_user(&self, author: &str) -> Res<Vec<Lore>>;

    /// Gets every lore whose content contains the query (case-insensitive), newest first.
    async fn search_lore(&self, query: &str) -> Res<Vec<Lore>>;
}

// Structs.

/// Database client for lore-bot.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl DbClient {
    pub fn new(inner: Arc<dyn GenericDbClient>) -> Self {
        Self { inner }
    }
}
