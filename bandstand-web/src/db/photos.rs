//! Photo gallery database operations

use bandstand_common::Result;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Photo record
///
/// image_path is relative to the media directory and served under /media.
#[derive(Debug, Clone, Serialize)]
pub struct Photo {
    pub guid: Uuid,
    pub title: String,
    pub image_path: String,
    pub event_date: NaiveDate,
    pub description: String,
}

impl Photo {
    /// Create a new photo with a fresh guid
    pub fn new(title: &str, image_path: &str, event_date: NaiveDate, description: &str) -> Self {
        Self {
            guid: Uuid::new_v4(),
            title: title.to_string(),
            image_path: image_path.to_string(),
            event_date,
            description: description.to_string(),
        }
    }
}

/// Save photo to database
pub async fn save_photo(pool: &SqlitePool, photo: &Photo) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO photos (guid, title, image_path, event_date, description, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(guid) DO UPDATE SET
            title = excluded.title,
            image_path = excluded.image_path,
            event_date = excluded.event_date,
            description = excluded.description,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(photo.guid.to_string())
    .bind(&photo.title)
    .bind(&photo.image_path)
    .bind(photo.event_date)
    .bind(&photo.description)
    .execute(pool)
    .await?;

    Ok(())
}

/// Total number of photos
pub async fn count_photos(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM photos")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Load one page of photos, most recent event first
pub async fn list_photos(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Photo>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, title, image_path, event_date, description
        FROM photos
        ORDER BY event_date DESC, title
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let guid_str: String = row.get("guid");
            let guid = Uuid::parse_str(&guid_str).map_err(|e| {
                bandstand_common::Error::Internal(format!("Invalid photo guid: {}", e))
            })?;

            Ok(Photo {
                guid,
                title: row.get("title"),
                image_path: row.get("image_path"),
                event_date: row.get("event_date"),
                description: row.get("description"),
            })
        })
        .collect()
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
        bandstand_common::db::init::create_photos_table(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_save_and_list_photos() {
        let pool = test_pool().await;

        let photo = Photo::new(
            "Festival set",
            "2024/festival.jpg",
            NaiveDate::from_ymd_opt(2024, 7, 20).unwrap(),
            "Main stage, golden hour",
        );
        save_photo(&pool, &photo).await.expect("Failed to save photo");

        assert_eq!(count_photos(&pool).await.unwrap(), 1);

        let photos = list_photos(&pool, 50, 0).await.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].image_path, "2024/festival.jpg");
    }

    #[tokio::test]
    async fn test_list_newest_event_first() {
        let pool = test_pool().await;

        let older = Photo::new("Old", "old.jpg", NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(), "");
        let newer = Photo::new("New", "new.jpg", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "");
        save_photo(&pool, &older).await.unwrap();
        save_photo(&pool, &newer).await.unwrap();

        let photos = list_photos(&pool, 50, 0).await.unwrap();
        assert_eq!(photos[0].title, "New");
        assert_eq!(photos[1].title, "Old");
    }
}
