//! Concert listing API
//!
//! The listing is public; attendance state rides along when the caller
//! has a session.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::{api::session::CurrentUser, db, AppState};

/// One concert as shown on the concerts page
#[derive(Debug, Serialize)]
pub struct ConcertInfo {
    pub guid: Uuid,
    pub name: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    /// Price rendered with two decimals, e.g. "45.00"
    pub price: String,
    pub price_cents: i64,
    pub available_tickets: i64,
    pub is_attending: bool,
    pub payment_status: Option<String>,
}

/// Concerts page response
#[derive(Debug, Serialize)]
pub struct ConcertsResponse {
    pub concerts: Vec<ConcertInfo>,
}

/// GET /api/concerts
///
/// All concerts in date order. For logged-in callers each row carries
/// their attendance and payment state; anonymous callers get
/// is_attending = false throughout.
pub async fn get_concerts(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Result<Json<ConcertsResponse>, ConcertsError> {
    let viewer = user.map(|Extension(user)| user.guid);

    let listings = db::concerts::list_concerts(&state.db, viewer)
        .await
        .map_err(|e| ConcertsError::DatabaseError(e.to_string()))?;

    let concerts = listings
        .into_iter()
        .map(|listing| ConcertInfo {
            guid: listing.concert.guid,
            name: listing.concert.name,
            location: listing.concert.location,
            starts_at: listing.concert.starts_at,
            price: format_cents(listing.concert.price_cents),
            price_cents: listing.concert.price_cents,
            available_tickets: listing.concert.available_tickets,
            is_attending: listing.is_attending,
            payment_status: listing.payment_status,
        })
        .collect();

    Ok(Json(ConcertsResponse { concerts }))
}

/// Render integer cents as a two-decimal amount string
pub(crate) fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// Concert API errors
#[derive(Debug)]
pub enum ConcertsError {
    DatabaseError(String),
}

impl IntoResponse for ConcertsError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ConcertsError::DatabaseError(msg) => {
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
    fn test_format_cents() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(100), "1.00");
        assert_eq!(format_cents(4500), "45.00");
        assert_eq!(format_cents(4509), "45.09");
        assert_eq!(format_cents(123456), "1234.56");
    }
}
