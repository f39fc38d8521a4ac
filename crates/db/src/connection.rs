//! SQLite pool setup.
//!
//! Every connection gets the same pragma set: foreign keys on (artifact rows
//! reference their quote), WAL for concurrent readers, and a busy timeout so
//! document generation does not fail on a briefly locked database.

use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use banquet_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

const SESSION_PRAGMAS: &[&str] =
    &["PRAGMA foreign_keys = ON", "PRAGMA journal_mode = WAL", "PRAGMA busy_timeout = 5000"];

/// Connects with the pool settings from the loaded [`DatabaseConfig`].
pub async fn connect_from_config(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&config.url, config.max_connections, config.timeout_secs).await
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                for pragma in SESSION_PRAGMAS {
                    sqlx::query(pragma).execute(&mut *conn).await?;
                }
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

#[cfg(test)]
mod tests {
    use banquet_core::config::DatabaseConfig;

    use super::connect_from_config;

    #[tokio::test]
    async fn pool_is_built_from_config_with_session_pragmas() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 2,
            timeout_secs: 5,
        };

        let pool = connect_from_config(&config).await.expect("connect");

        let foreign_keys: i64 =
            sqlx::query_scalar("PRAGMA foreign_keys").fetch_one(&pool).await.expect("pragma");
        assert_eq!(foreign_keys, 1);
    }
}
