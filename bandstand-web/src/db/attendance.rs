//! Concert attendance and payment-state database operations
//!
//! One row per (user, concert) pair. Toggling off deletes the row;
//! payment completion is a guarded pending → completed transition.

use bandstand_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Attendance record for one user at one concert
#[derive(Debug, Clone)]
pub struct Attendance {
    pub user_guid: Uuid,
    pub concert_guid: Uuid,
    pub attending: bool,
    pub payment_status: String,
    pub payment_id: Option<String>,
}

/// Load the attendance row for a (user, concert) pair
pub async fn load_attendance(
    pool: &SqlitePool,
    user_guid: Uuid,
    concert_guid: Uuid,
) -> Result<Option<Attendance>> {
    let row = sqlx::query(
        r#"
        SELECT attending, payment_status, payment_id
        FROM concert_attendance
        WHERE user_guid = ? AND concert_guid = ?
        "#,
    )
    .bind(user_guid.to_string())
    .bind(concert_guid.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| {
        let attending: i64 = row.get("attending");
        Attendance {
            user_guid,
            concert_guid,
            attending: attending != 0,
            payment_status: row.get("payment_status"),
            payment_id: row.get("payment_id"),
        }
    }))
}

/// Mark a user as attending, with payment still pending
pub async fn insert_pending(pool: &SqlitePool, user_guid: Uuid, concert_guid: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO concert_attendance (user_guid, concert_guid, attending, payment_status, created_at)
        VALUES (?, ?, 1, 'pending', CURRENT_TIMESTAMP)
        "#,
    )
    .bind(user_guid.to_string())
    .bind(concert_guid.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove a user's attendance; returns false when there was none
pub async fn delete_attendance(
    pool: &SqlitePool,
    user_guid: Uuid,
    concert_guid: Uuid,
) -> Result<bool> {
    let result = sqlx::query(
        "DELETE FROM concert_attendance WHERE user_guid = ? AND concert_guid = ?",
    )
    .bind(user_guid.to_string())
    .bind(concert_guid.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Complete payment for a pending attendance
///
/// Only the pending → completed transition is allowed; returns false when
/// no pending row exists (never attended, or already paid). A replayed
/// completion therefore cannot take effect twice.
pub async fn complete_payment(
    pool: &SqlitePool,
    user_guid: Uuid,
    concert_guid: Uuid,
    payment_id: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE concert_attendance
        SET payment_status = 'completed', payment_id = ?
        WHERE user_guid = ? AND concert_guid = ? AND payment_status = 'pending'
        "#,
    )
    .bind(payment_id)
    .bind(user_guid.to_string())
    .bind(concert_guid.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    async fn test_pool() -> (SqlitePool, Uuid, Uuid) {
        // Single connection so the in-memory database is shared
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await.unwrap();
        bandstand_common::db::init::create_users_table(&pool).await.unwrap();
        bandstand_common::db::init::create_concerts_table(&pool).await.unwrap();
        bandstand_common::db::init::create_concert_attendance_table(&pool)
            .await
            .unwrap();

        let user_guid = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (guid, username, email, password_hash, password_salt)
             VALUES (?, 'alice', 'a@example.com', 'hash', 'salt')",
        )
        .bind(user_guid.to_string())
        .execute(&pool)
        .await
        .unwrap();

        let concert = crate::db::concerts::Concert::new(
            "Summer Night",
            "Riverside Arena",
            Utc.with_ymd_and_hms(2026, 9, 12, 20, 0, 0).unwrap(),
            4500,
            10,
        );
        crate::db::concerts::save_concert(&pool, &concert).await.unwrap();

        (pool, user_guid, concert.guid)
    }

    #[tokio::test]
    async fn test_insert_and_load_pending() {
        let (pool, user, concert) = test_pool().await;

        assert!(load_attendance(&pool, user, concert).await.unwrap().is_none());

        insert_pending(&pool, user, concert).await.unwrap();

        let record = load_attendance(&pool, user, concert).await.unwrap().unwrap();
        assert!(record.attending);
        assert_eq!(record.payment_status, "pending");
        assert!(record.payment_id.is_none());
    }

    #[tokio::test]
    async fn test_delete_attendance() {
        let (pool, user, concert) = test_pool().await;

        assert!(!delete_attendance(&pool, user, concert).await.unwrap());

        insert_pending(&pool, user, concert).await.unwrap();
        assert!(delete_attendance(&pool, user, concert).await.unwrap());
        assert!(load_attendance(&pool, user, concert).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_complete_payment_once_only() {
        let (pool, user, concert) = test_pool().await;
        insert_pending(&pool, user, concert).await.unwrap();

        assert!(complete_payment(&pool, user, concert, "pay-1").await.unwrap());

        let record = load_attendance(&pool, user, concert).await.unwrap().unwrap();
        assert_eq!(record.payment_status, "completed");
        assert_eq!(record.payment_id.as_deref(), Some("pay-1"));

        // Replay finds no pending row
        assert!(!complete_payment(&pool, user, concert, "pay-2").await.unwrap());

        let record = load_attendance(&pool, user, concert).await.unwrap().unwrap();
        assert_eq!(record.payment_id.as_deref(), Some("pay-1"));
    }

    #[tokio::test]
    async fn test_complete_without_attendance_fails() {
        let (pool, user, concert) = test_pool().await;
        assert!(!complete_payment(&pool, user, concert, "pay-1").await.unwrap());
    }
}
