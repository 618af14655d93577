//! Persistence layer: connection pool, migrations, bootstrap seeding and
//! the repositories over the `users` table.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod store;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Apply any pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Cheap liveness probe for health endpoints.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Insert the bootstrap admin account if no user with that username exists.
///
/// The caller supplies an already-hashed password. Returns `true` when the
/// row was inserted, `false` when the username was already present.
pub async fn seed_admin(
    pool: &DbPool,
    username: &str,
    password_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, updated_at)
         VALUES ($1, $2, NOW())
         ON CONFLICT (username) DO NOTHING",
    )
    .bind(username)
    .bind(password_hash)
    .execute(pool)
    .await?;

    let created = result.rows_affected() > 0;
    if created {
        tracing::info!(username, "seeded bootstrap admin user");
    }
    Ok(created)
}
