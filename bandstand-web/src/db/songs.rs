//! Song database operations

use bandstand_common::Result;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Song record
#[derive(Debug, Clone, Serialize)]
pub struct Song {
    pub guid: Uuid,
    pub title: String,
    pub duration_seconds: i64,
    pub release_date: NaiveDate,
    pub lyrics: String,
}

impl Song {
    /// Create a new song with a fresh guid
    pub fn new(title: &str, duration_seconds: i64, release_date: NaiveDate, lyrics: &str) -> Self {
        Self {
            guid: Uuid::new_v4(),
            title: title.to_string(),
            duration_seconds,
            release_date,
            lyrics: lyrics.to_string(),
        }
    }
}

/// Save song to database
pub async fn save_song(pool: &SqlitePool, song: &Song) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO songs (guid, title, duration_seconds, release_date, lyrics, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(guid) DO UPDATE SET
            title = excluded.title,
            duration_seconds = excluded.duration_seconds,
            release_date = excluded.release_date,
            lyrics = excluded.lyrics,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(song.guid.to_string())
    .bind(&song.title)
    .bind(song.duration_seconds)
    .bind(song.release_date)
    .bind(&song.lyrics)
    .execute(pool)
    .await?;

    Ok(())
}

/// Total number of songs
pub async fn count_songs(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Load one page of songs, oldest release first
pub async fn list_songs(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Song>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, title, duration_seconds, release_date, lyrics
        FROM songs
        ORDER BY release_date, title
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_song).collect()
}

fn row_to_song(row: &sqlx::sqlite::SqliteRow) -> Result<Song> {
    let guid_str: String = row.get("guid");
    let guid = Uuid::parse_str(&guid_str)
        .map_err(|e| bandstand_common::Error::Internal(format!("Invalid song guid: {}", e)))?;

    Ok(Song {
        guid,
        title: row.get("title"),
        duration_seconds: row.get("duration_seconds"),
        release_date: row.get("release_date"),
        lyrics: row.get("lyrics"),
    })
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
        bandstand_common::db::init::create_songs_table(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_save_and_list_songs() {
        let pool = test_pool().await;

        let song = Song::new(
            "Midnight Train",
            245,
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            "All aboard...",
        );
        save_song(&pool, &song).await.expect("Failed to save song");

        assert_eq!(count_songs(&pool).await.unwrap(), 1);

        let songs = list_songs(&pool, 50, 0).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].guid, song.guid);
        assert_eq!(songs[0].title, "Midnight Train");
        assert_eq!(songs[0].duration_seconds, 245);
    }

    #[tokio::test]
    async fn test_list_orders_by_release_date() {
        let pool = test_pool().await;

        let newer = Song::new("B", 100, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "");
        let older = Song::new("A", 100, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), "");
        save_song(&pool, &newer).await.unwrap();
        save_song(&pool, &older).await.unwrap();

        let songs = list_songs(&pool, 50, 0).await.unwrap();
        assert_eq!(songs[0].title, "A");
        assert_eq!(songs[1].title, "B");
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let pool = test_pool().await;

        let mut song = Song::new("Draft", 90, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), "");
        save_song(&pool, &song).await.unwrap();

        song.title = "Final".to_string();
        save_song(&pool, &song).await.unwrap();

        let songs = list_songs(&pool, 50, 0).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "Final");
    }
}
