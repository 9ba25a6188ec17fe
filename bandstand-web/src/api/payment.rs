//! Simulated payment checkout API
//!
//! Two endpoints drive the third-party tokenization widget: one hands the
//! client the widget's payment request document, the other accepts the
//! token the widget produced and marks the purchase complete. The token
//! is recorded, not verified — this is a simulated checkout, not a
//! payment processor.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    api::concerts::format_cents,
    api::session::CurrentUser,
    db, AppState,
};

/// Concert summary shown on the payment page
#[derive(Debug, Serialize)]
pub struct PaymentConcert {
    pub guid: Uuid,
    pub name: String,
    pub price: String,
}

/// Payment bootstrap response
#[derive(Debug, Serialize)]
pub struct PaymentRequestResponse {
    pub concert: PaymentConcert,
    /// Widget environment, "TEST" or "PRODUCTION"
    pub environment: String,
    /// The tokenization widget's PaymentDataRequest document
    pub payment_request: serde_json::Value,
}

/// Completion request fields
#[derive(Debug, Deserialize)]
pub struct CompletePaymentRequest {
    pub payment_token: String,
}

/// Completion response
#[derive(Debug, Serialize)]
pub struct CompletePaymentResponse {
    pub success: bool,
    pub payment_id: String,
}

/// GET /api/concerts/:concert_id/payment-request
///
/// Builds the widget bootstrap document for the caller's pending
/// purchase: merchant details from settings, amount from the concert row.
pub async fn get_payment_request(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(concert_id): Path<Uuid>,
) -> Result<Json<PaymentRequestResponse>, PaymentError> {
    let concert = db::concerts::load_concert(&state.db, concert_id)
        .await
        .map_err(db_err)?
        .ok_or(PaymentError::ConcertNotFound(concert_id))?;

    let attendance = db::attendance::load_attendance(&state.db, user.guid, concert_id)
        .await
        .map_err(db_err)?;

    match attendance {
        Some(record) if record.payment_status == "pending" => {}
        _ => return Err(PaymentError::NothingToPay),
    }

    let merchant_id = setting(&state, "payment_merchant_id").await?;
    let merchant_name = setting(&state, "payment_merchant_name").await?;
    let environment = setting(&state, "payment_environment").await?;
    let currency = setting(&state, "payment_currency").await?;
    let country = setting(&state, "payment_country").await?;

    let price = format_cents(concert.price_cents);

    let payment_request = json!({
        "apiVersion": 2,
        "apiVersionMinor": 0,
        "allowedPaymentMethods": [
            {
                "type": "CARD",
                "parameters": {
                    "allowedAuthMethods": ["PAN_ONLY", "CRYPTOGRAM_3DS"],
                    "allowedCardNetworks": ["VISA", "MASTERCARD"]
                },
                "tokenizationSpecification": {
                    "type": "PAYMENT_GATEWAY",
                    "parameters": {
                        "gateway": "example",
                        "gatewayMerchantId": merchant_id
                    }
                }
            }
        ],
        "merchantInfo": {
            "merchantId": merchant_id,
            "merchantName": merchant_name
        },
        "transactionInfo": {
            "totalPriceStatus": "FINAL",
            "totalPrice": price,
            "currencyCode": currency,
            "countryCode": country
        }
    });

    Ok(Json(PaymentRequestResponse {
        concert: PaymentConcert {
            guid: concert.guid,
            name: concert.name,
            price,
        },
        environment,
        payment_request,
    }))
}

/// POST /api/concerts/:concert_id/payment
///
/// Accepts the widget's token and completes the caller's pending
/// purchase. Only the pending → completed transition is allowed, so a
/// replayed POST returns 409 and cannot decrement tickets twice.
pub async fn complete_payment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(concert_id): Path<Uuid>,
    Json(request): Json<CompletePaymentRequest>,
) -> Result<Json<CompletePaymentResponse>, PaymentError> {
    if request.payment_token.trim().is_empty() {
        return Err(PaymentError::MissingToken);
    }

    let concert = db::concerts::load_concert(&state.db, concert_id)
        .await
        .map_err(db_err)?
        .ok_or(PaymentError::ConcertNotFound(concert_id))?;

    let payment_id = Uuid::new_v4().to_string();

    let completed =
        db::attendance::complete_payment(&state.db, user.guid, concert_id, &payment_id)
            .await
            .map_err(db_err)?;

    if !completed {
        return Err(PaymentError::NothingToPay);
    }

    let decremented = db::concerts::decrement_available_tickets(&state.db, concert_id)
        .await
        .map_err(db_err)?;
    if !decremented {
        warn!("Concert '{}' sold out before ticket decrement", concert.name);
    }

    info!(
        "Payment {} completed: user '{}', concert '{}'",
        payment_id, user.username, concert.name
    );

    Ok(Json(CompletePaymentResponse {
        success: true,
        payment_id,
    }))
}

async fn setting(state: &AppState, key: &str) -> Result<String, PaymentError> {
    bandstand_common::db::get_setting(&state.db, key)
        .await
        .map_err(db_err)?
        .ok_or_else(|| PaymentError::MissingSetting(key.to_string()))
}

fn db_err(e: bandstand_common::Error) -> PaymentError {
    PaymentError::DatabaseError(e.to_string())
}

/// Payment API errors
#[derive(Debug)]
pub enum PaymentError {
    ConcertNotFound(Uuid),
    /// No pending attendance to pay for (never attended, or already paid)
    NothingToPay,
    MissingToken,
    MissingSetting(String),
    DatabaseError(String),
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            PaymentError::ConcertNotFound(guid) => {
                (StatusCode::NOT_FOUND, format!("Concert not found: {}", guid))
            }
            PaymentError::NothingToPay => (
                StatusCode::CONFLICT,
                "No pending attendance for this concert".to_string(),
            ),
            PaymentError::MissingToken => {
                (StatusCode::BAD_REQUEST, "payment_token is required".to_string())
            }
            PaymentError::MissingSetting(key) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Missing payment setting: {}", key),
            ),
            PaymentError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
