//! Settings table access

use crate::Result;
use sqlx::SqlitePool;

/// Load a setting value by key
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(row.and_then(|(value,)| value))
}

/// Load an integer setting, falling back to `default` when the key is
/// missing or not parseable
pub async fn get_setting_i64(pool: &SqlitePool, key: &str, default: i64) -> Result<i64> {
    Ok(get_setting(pool, key)
        .await?
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default))
}

/// Store a setting value, replacing any existing value
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        // Single connection so the in-memory database is shared
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::init::create_settings_table(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_get_missing_setting_is_none() {
        let pool = test_pool().await;
        assert_eq!(get_setting(&pool, "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_and_get_roundtrip() {
        let pool = test_pool().await;

        set_setting(&pool, "payment_environment", "TEST").await.unwrap();
        assert_eq!(
            get_setting(&pool, "payment_environment").await.unwrap(),
            Some("TEST".to_string())
        );

        // Overwrite
        set_setting(&pool, "payment_environment", "PRODUCTION").await.unwrap();
        assert_eq!(
            get_setting(&pool, "payment_environment").await.unwrap(),
            Some("PRODUCTION".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_setting_i64_parses_and_defaults() {
        let pool = test_pool().await;

        set_setting(&pool, "session_timeout_seconds", "3600").await.unwrap();
        assert_eq!(
            get_setting_i64(&pool, "session_timeout_seconds", 60).await.unwrap(),
            3600
        );

        // Missing key falls back
        assert_eq!(get_setting_i64(&pool, "missing", 60).await.unwrap(), 60);

        // Unparseable value falls back
        set_setting(&pool, "garbage", "not-a-number").await.unwrap();
        assert_eq!(get_setting_i64(&pool, "garbage", 42).await.unwrap(), 42);
    }
}
