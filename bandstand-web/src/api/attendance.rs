//! Attendance toggle API
//!
//! One POST flips the caller's attendance for a concert: delete the row
//! if it exists, insert a pending row otherwise. Requires a session.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{api::session::CurrentUser, db, AppState};

/// Toggle response
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub attending: bool,
}

/// POST /api/concerts/:concert_id/attendance
///
/// Toggles the caller's attendance. Newly-added attendance starts with
/// payment pending.
pub async fn toggle_attendance(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(concert_id): Path<Uuid>,
) -> Result<Json<ToggleResponse>, AttendanceError> {
    let concert = db::concerts::load_concert(&state.db, concert_id)
        .await
        .map_err(|e| AttendanceError::DatabaseError(e.to_string()))?
        .ok_or(AttendanceError::ConcertNotFound(concert_id))?;

    let existing = db::attendance::load_attendance(&state.db, user.guid, concert_id)
        .await
        .map_err(|e| AttendanceError::DatabaseError(e.to_string()))?;

    let attending = if existing.is_some() {
        db::attendance::delete_attendance(&state.db, user.guid, concert_id)
            .await
            .map_err(|e| AttendanceError::DatabaseError(e.to_string()))?;
        false
    } else {
        db::attendance::insert_pending(&state.db, user.guid, concert_id)
            .await
            .map_err(|e| AttendanceError::DatabaseError(e.to_string()))?;
        true
    };

    info!(
        "User '{}' {} '{}'",
        user.username,
        if attending { "is attending" } else { "cancelled attendance for" },
        concert.name
    );

    Ok(Json(ToggleResponse {
        success: true,
        attending,
    }))
}

/// Attendance API errors
#[derive(Debug)]
pub enum AttendanceError {
    ConcertNotFound(Uuid),
    DatabaseError(String),
}

impl IntoResponse for AttendanceError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AttendanceError::ConcertNotFound(guid) => {
                (StatusCode::NOT_FOUND, format!("Concert not found: {}", guid))
            }
            AttendanceError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
