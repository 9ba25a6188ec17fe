//! Concert database operations
//!
//! The listing query carries per-viewer attendance state via one LEFT
//! JOIN against concert_attendance, so anonymous and logged-in callers
//! share a single code path.

use bandstand_common::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Concert record
#[derive(Debug, Clone, Serialize)]
pub struct Concert {
    pub guid: Uuid,
    pub name: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub price_cents: i64,
    pub available_tickets: i64,
}

impl Concert {
    /// Create a new concert with a fresh guid
    pub fn new(
        name: &str,
        location: &str,
        starts_at: DateTime<Utc>,
        price_cents: i64,
        available_tickets: i64,
    ) -> Self {
        Self {
            guid: Uuid::new_v4(),
            name: name.to_string(),
            location: location.to_string(),
            starts_at,
            price_cents,
            available_tickets,
        }
    }
}

/// Concert row joined with the viewing user's attendance state
#[derive(Debug, Clone, Serialize)]
pub struct ConcertListing {
    #[serde(flatten)]
    pub concert: Concert,
    pub is_attending: bool,
    pub payment_status: Option<String>,
}

/// Save concert to database
pub async fn save_concert(pool: &SqlitePool, concert: &Concert) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO concerts (guid, name, location, starts_at, price_cents, available_tickets,
                              created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(guid) DO UPDATE SET
            name = excluded.name,
            location = excluded.location,
            starts_at = excluded.starts_at,
            price_cents = excluded.price_cents,
            available_tickets = excluded.available_tickets,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(concert.guid.to_string())
    .bind(&concert.name)
    .bind(&concert.location)
    .bind(concert.starts_at)
    .bind(concert.price_cents)
    .bind(concert.available_tickets)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load concert by guid
pub async fn load_concert(pool: &SqlitePool, guid: Uuid) -> Result<Option<Concert>> {
    let row = sqlx::query(
        r#"
        SELECT guid, name, location, starts_at, price_cents, available_tickets
        FROM concerts
        WHERE guid = ?
        "#,
    )
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(row_to_concert(&row)?)),
        None => Ok(None),
    }
}

/// List all concerts in date order with the viewer's attendance state
///
/// For anonymous viewers pass `None`; every row comes back with
/// is_attending = false.
pub async fn list_concerts(
    pool: &SqlitePool,
    viewer: Option<Uuid>,
) -> Result<Vec<ConcertListing>> {
    let rows = sqlx::query(
        r#"
        SELECT c.guid, c.name, c.location, c.starts_at, c.price_cents, c.available_tickets,
               a.user_guid IS NOT NULL AS is_attending,
               a.payment_status
        FROM concerts c
        LEFT JOIN concert_attendance a
               ON a.concert_guid = c.guid AND a.user_guid = ?
        ORDER BY c.starts_at
        "#,
    )
    .bind(viewer.map(|u| u.to_string()))
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let is_attending: i64 = row.get("is_attending");
            Ok(ConcertListing {
                concert: row_to_concert(row)?,
                is_attending: is_attending != 0,
                payment_status: row.get("payment_status"),
            })
        })
        .collect()
}

/// Take one ticket off a concert's availability
///
/// Guarded so availability never goes below zero. Returns false when no
/// tickets were left to take.
pub async fn decrement_available_tickets(pool: &SqlitePool, guid: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE concerts
        SET available_tickets = available_tickets - 1,
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ? AND available_tickets > 0
        "#,
    )
    .bind(guid.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn row_to_concert(row: &sqlx::sqlite::SqliteRow) -> Result<Concert> {
    let guid_str: String = row.get("guid");
    let guid = Uuid::parse_str(&guid_str)
        .map_err(|e| bandstand_common::Error::Internal(format!("Invalid concert guid: {}", e)))?;

    Ok(Concert {
        guid,
        name: row.get("name"),
        location: row.get("location"),
        starts_at: row.get("starts_at"),
        price_cents: row.get("price_cents"),
        available_tickets: row.get("available_tickets"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn test_pool() -> SqlitePool {
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
        pool
    }

    fn sample_concert() -> Concert {
        Concert::new(
            "Summer Night",
            "Riverside Arena",
            Utc.with_ymd_and_hms(2026, 9, 12, 20, 0, 0).unwrap(),
            4500,
            200,
        )
    }

    async fn insert_user(pool: &SqlitePool, guid: &str, username: &str) {
        sqlx::query(
            "INSERT INTO users (guid, username, email, password_hash, password_salt)
             VALUES (?, ?, 'x@example.com', 'hash', 'salt')",
        )
        .bind(guid)
        .bind(username)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_save_and_load_concert() {
        let pool = test_pool().await;
        let concert = sample_concert();

        save_concert(&pool, &concert).await.expect("Failed to save concert");

        let loaded = load_concert(&pool, concert.guid)
            .await
            .unwrap()
            .expect("Concert not found");
        assert_eq!(loaded.name, "Summer Night");
        assert_eq!(loaded.price_cents, 4500);
        assert_eq!(loaded.starts_at, concert.starts_at);
    }

    #[tokio::test]
    async fn test_load_missing_concert_is_none() {
        let pool = test_pool().await;
        assert!(load_concert(&pool, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_anonymous_listing_has_no_attendance() {
        let pool = test_pool().await;
        save_concert(&pool, &sample_concert()).await.unwrap();

        let listings = list_concerts(&pool, None).await.unwrap();
        assert_eq!(listings.len(), 1);
        assert!(!listings[0].is_attending);
        assert!(listings[0].payment_status.is_none());
    }

    #[tokio::test]
    async fn test_listing_reflects_viewer_attendance() {
        let pool = test_pool().await;
        let concert = sample_concert();
        save_concert(&pool, &concert).await.unwrap();

        let viewer = Uuid::new_v4();
        let other = Uuid::new_v4();
        insert_user(&pool, &viewer.to_string(), "viewer").await;
        insert_user(&pool, &other.to_string(), "other").await;

        sqlx::query(
            "INSERT INTO concert_attendance (user_guid, concert_guid) VALUES (?, ?)",
        )
        .bind(viewer.to_string())
        .bind(concert.guid.to_string())
        .execute(&pool)
        .await
        .unwrap();

        let listings = list_concerts(&pool, Some(viewer)).await.unwrap();
        assert!(listings[0].is_attending);
        assert_eq!(listings[0].payment_status.as_deref(), Some("pending"));

        // A different viewer does not see someone else's attendance
        let listings = list_concerts(&pool, Some(other)).await.unwrap();
        assert!(!listings[0].is_attending);
    }

    #[tokio::test]
    async fn test_decrement_stops_at_zero() {
        let pool = test_pool().await;
        let mut concert = sample_concert();
        concert.available_tickets = 1;
        save_concert(&pool, &concert).await.unwrap();

        assert!(decrement_available_tickets(&pool, concert.guid).await.unwrap());
        assert!(!decrement_available_tickets(&pool, concert.guid).await.unwrap());

        let loaded = load_concert(&pool, concert.guid).await.unwrap().unwrap();
        assert_eq!(loaded.available_tickets, 0);
    }
}
