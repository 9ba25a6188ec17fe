//! Login session database operations
//!
//! Sessions are opaque UUID tokens with a server-side expiry. Expiry
//! arithmetic stays inside SQLite (datetime('now', ...)) so there is a
//! single clock.

use bandstand_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// The identity a valid session resolves to
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_guid: Uuid,
    pub username: String,
}

/// Create a session for a user, returning the opaque token
pub async fn create_session(pool: &SqlitePool, user_guid: Uuid, ttl_seconds: i64) -> Result<String> {
    let token = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO sessions (token, user_guid, created_at, expires_at)
        VALUES (?, ?, CURRENT_TIMESTAMP, datetime('now', ? || ' seconds'))
        "#,
    )
    .bind(&token)
    .bind(user_guid.to_string())
    .bind(ttl_seconds)
    .execute(pool)
    .await?;

    Ok(token)
}

/// Resolve a session token to its user, if the session is still valid
pub async fn load_session_user(pool: &SqlitePool, token: &str) -> Result<Option<SessionUser>> {
    let row = sqlx::query(
        r#"
        SELECT u.guid, u.username
        FROM sessions s
        JOIN users u ON u.guid = s.user_guid
        WHERE s.token = ? AND s.expires_at > datetime('now')
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");
            let user_guid = Uuid::parse_str(&guid_str).map_err(|e| {
                bandstand_common::Error::Internal(format!("Invalid user guid: {}", e))
            })?;

            Ok(Some(SessionUser {
                user_guid,
                username: row.get("username"),
            }))
        }
        None => Ok(None),
    }
}

/// Delete a session (logout)
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove expired sessions, returning how many were purged
///
/// Called once at startup; expired rows are otherwise only filtered out
/// at lookup time.
pub async fn purge_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= datetime('now')")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
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
        sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await.unwrap();
        bandstand_common::db::init::create_users_table(&pool).await.unwrap();
        bandstand_common::db::init::create_sessions_table(&pool).await.unwrap();
        pool
    }

    async fn insert_user(pool: &SqlitePool) -> Uuid {
        let guid = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (guid, username, email, password_hash, password_salt)
             VALUES (?, 'alice', 'a@example.com', 'hash', 'salt')",
        )
        .bind(guid.to_string())
        .execute(pool)
        .await
        .unwrap();
        guid
    }

    #[tokio::test]
    async fn test_session_roundtrip() {
        let pool = test_pool().await;
        let user_guid = insert_user(&pool).await;

        let token = create_session(&pool, user_guid, 3600).await.unwrap();

        let session = load_session_user(&pool, &token)
            .await
            .unwrap()
            .expect("Session should resolve");
        assert_eq!(session.user_guid, user_guid);
        assert_eq!(session.username, "alice");
    }

    #[tokio::test]
    async fn test_unknown_token_is_none() {
        let pool = test_pool().await;
        insert_user(&pool).await;

        let result = load_session_user(&pool, "not-a-real-token").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let pool = test_pool().await;
        let user_guid = insert_user(&pool).await;

        // Negative TTL puts expiry in the past
        let token = create_session(&pool, user_guid, -10).await.unwrap();

        let result = load_session_user(&pool, &token).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let pool = test_pool().await;
        let user_guid = insert_user(&pool).await;

        let token = create_session(&pool, user_guid, 3600).await.unwrap();
        delete_session(&pool, &token).await.unwrap();

        assert!(load_session_user(&pool, &token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired_sessions() {
        let pool = test_pool().await;
        let user_guid = insert_user(&pool).await;

        let live = create_session(&pool, user_guid, 3600).await.unwrap();
        create_session(&pool, user_guid, -10).await.unwrap();

        let purged = purge_expired_sessions(&pool).await.unwrap();
        assert_eq!(purged, 1);

        assert!(load_session_user(&pool, &live).await.unwrap().is_some());
    }
}
