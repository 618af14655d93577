//! Read-side store interface consumed by session validation and login.
//!
//! The production implementation is the Postgres pool; tests substitute an
//! in-memory store so session behaviour can be exercised without a
//! database. Every method is a live read: session freshness decisions must
//! never be made from cached user state.

use async_trait::async_trait;
use stanchion_core::types::{DbId, Timestamp};

use crate::models::user::User;
use crate::repositories::UserRepo;
use crate::DbPool;

#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Fetch a user by ID. `None` when the row does not exist.
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, sqlx::Error>;

    /// Fetch a user by username (case-sensitive exact match).
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;

    /// Read only the last-modified stamp for a user.
    ///
    /// `None` when the row is missing or has never been mutated; callers
    /// that need to tell those cases apart follow up with [`find_by_id`].
    ///
    /// [`find_by_id`]: AuthStore::find_by_id
    async fn last_updated_at(&self, id: DbId) -> Result<Option<Timestamp>, sqlx::Error>;
}

#[async_trait]
impl AuthStore for DbPool {
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, sqlx::Error> {
        UserRepo::find_by_id(self, id).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        UserRepo::find_by_username(self, username).await
    }

    async fn last_updated_at(&self, id: DbId) -> Result<Option<Timestamp>, sqlx::Error> {
        UserRepo::last_updated_at(self, id).await
    }
}
