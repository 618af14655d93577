//! Repository for the `users` table.

use sqlx::PgPool;
use stanchion_core::paging::{Page, SortOrder};
use stanchion_core::types::{DbId, Timestamp};

use crate::models::user::{CreateUser, UpdateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, username, password_hash, first_name, last_name, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, password_hash, first_name, last_name)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.password_hash)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Read only the `updated_at` stamp for a user.
    ///
    /// Returns `None` when the row is missing or the stamp has never been
    /// set, matching what session validation wants to compare against.
    pub async fn last_updated_at(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        let stamp: Option<Option<Timestamp>> =
            sqlx::query_scalar("SELECT updated_at FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(stamp.flatten())
    }

    /// List one page of users plus the unpaginated total.
    ///
    /// `sort` supports: `"id"`, `"username"`, `"first_name"`, `"last_name"`,
    /// `"created_at"`, `"updated_at"`. Anything else falls back to `"id"`.
    pub async fn list_page(
        pool: &PgPool,
        sort: &str,
        order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> Result<Page<User>, sqlx::Error> {
        let sort_column = match sort {
            "username" => "username",
            "first_name" => "first_name",
            "last_name" => "last_name",
            "created_at" => "created_at",
            "updated_at" => "updated_at",
            _ => "id",
        };

        let query = format!(
            "SELECT {COLUMNS} FROM users
             ORDER BY {sort_column} {} NULLS LAST, id ASC
             LIMIT $1 OFFSET $2",
            order.as_sql()
        );
        let rows = sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(Page::new(rows, total))
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Any applied update stamps `updated_at = NOW()`, which invalidates
    /// session tokens issued before this instant. Returns `None` if no row
    /// with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(&input.password_hash)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a user by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check whether a username is already taken, optionally excluding one
    /// row (the row being edited).
    pub async fn username_taken(
        pool: &PgPool,
        username: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM users WHERE username = $1 AND ($2::bigint IS NULL OR id <> $2)
             )",
        )
        .bind(username)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;
        Ok(taken)
    }
}
