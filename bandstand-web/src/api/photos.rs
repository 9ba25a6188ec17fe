//! Photo gallery API

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    api::songs::PageQuery,
    db,
    pagination::{calculate_pagination, PAGE_SIZE},
    AppState,
};

/// One photo as shown in the gallery
#[derive(Debug, Serialize)]
pub struct PhotoInfo {
    pub guid: Uuid,
    pub title: String,
    /// URL the image is served from (under /media)
    pub image_url: String,
    pub event_date: NaiveDate,
    pub description: String,
}

/// Gallery page response
#[derive(Debug, Serialize)]
pub struct PhotosResponse {
    pub total_results: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub photos: Vec<PhotoInfo>,
}

/// GET /api/photos
///
/// Returns one page of the gallery, most recent event first.
pub async fn get_photos(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PhotosResponse>, PhotosError> {
    let total_results = db::photos::count_photos(&state.db)
        .await
        .map_err(|e| PhotosError::DatabaseError(e.to_string()))?;

    let p = calculate_pagination(total_results, query.page);

    let photos = db::photos::list_photos(&state.db, PAGE_SIZE, p.offset)
        .await
        .map_err(|e| PhotosError::DatabaseError(e.to_string()))?;

    let photos = photos
        .into_iter()
        .map(|photo| PhotoInfo {
            guid: photo.guid,
            image_url: format!("/media/{}", photo.image_path),
            title: photo.title,
            event_date: photo.event_date,
            description: photo.description,
        })
        .collect();

    Ok(Json(PhotosResponse {
        total_results,
        page: p.page,
        page_size: PAGE_SIZE,
        total_pages: p.total_pages,
        photos,
    }))
}

/// Photo API errors
#[derive(Debug)]
pub enum PhotosError {
    DatabaseError(String),
}

impl IntoResponse for PhotosError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            PhotosError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
