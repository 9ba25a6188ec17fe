//! Song listing API

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    db,
    pagination::{calculate_pagination, PAGE_SIZE},
    AppState,
};

/// Query parameters for paginated lists
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// One song as shown on the songs page
#[derive(Debug, Serialize)]
pub struct SongInfo {
    pub guid: Uuid,
    pub title: String,
    /// Duration rendered "M:SS"
    pub duration: String,
    pub release_date: NaiveDate,
}

/// Songs page response
#[derive(Debug, Serialize)]
pub struct SongsResponse {
    pub total_results: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub songs: Vec<SongInfo>,
}

/// GET /api/songs
///
/// Returns one page of the song catalog, oldest release first.
pub async fn get_songs(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<SongsResponse>, SongsError> {
    let total_results = db::songs::count_songs(&state.db)
        .await
        .map_err(|e| SongsError::DatabaseError(e.to_string()))?;

    let p = calculate_pagination(total_results, query.page);

    let songs = db::songs::list_songs(&state.db, PAGE_SIZE, p.offset)
        .await
        .map_err(|e| SongsError::DatabaseError(e.to_string()))?;

    let songs = songs
        .into_iter()
        .map(|song| SongInfo {
            guid: song.guid,
            title: song.title,
            duration: format_duration(song.duration_seconds),
            release_date: song.release_date,
        })
        .collect();

    Ok(Json(SongsResponse {
        total_results,
        page: p.page,
        page_size: PAGE_SIZE,
        total_pages: p.total_pages,
        songs,
    }))
}

/// Render whole seconds as "M:SS"
fn format_duration(seconds: i64) -> String {
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Song API errors
#[derive(Debug)]
pub enum SongsError {
    DatabaseError(String),
}

impl IntoResponse for SongsError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SongsError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(60), "1:00");
        assert_eq!(format_duration(245), "4:05");
        assert_eq!(format_duration(3600), "60:00");
    }
}
