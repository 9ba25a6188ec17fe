//! bandstand-web library - band website and ticketing web service
//!
//! Routes requests to raw-SQL query handlers and serves the HTML shells
//! the client-side glue renders into.

use axum::{middleware, Router};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod api;
pub mod db;
pub mod pagination;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Directory photo image files are served from
    pub media_root: PathBuf,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, media_root: PathBuf) -> Self {
        Self { db, media_root }
    }
}

/// Build application router
///
/// Attendance and payment require a session; everything else is public,
/// with the concert listing picking up identity when present.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    // Protected routes (valid session required)
    let protected = Router::new()
        .route("/api/concerts/:concert_id/attendance", post(api::toggle_attendance))
        .route("/api/concerts/:concert_id/payment-request", get(api::get_payment_request))
        .route("/api/concerts/:concert_id/payment", post(api::complete_payment))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_session,
        ));

    // Public API routes (identity attached when a session cookie is present)
    let public_api = Router::new()
        .route("/api/songs", get(api::get_songs))
        .route("/api/photos", get(api::get_photos))
        .route("/api/concerts", get(api::get_concerts))
        .route("/api/session", get(api::whoami))
        .route("/api/register", post(api::register))
        .route("/api/login", post(api::login))
        .route("/api/logout", post(api::logout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::attach_session,
        ));

    // Pages and static assets (no authentication)
    let pages = Router::new()
        .route("/", get(api::pages::serve_home))
        .route("/songs", get(api::pages::serve_songs))
        .route("/photos", get(api::pages::serve_photos))
        .route("/concerts", get(api::pages::serve_concerts))
        .route("/login", get(api::pages::serve_login))
        .route("/register", get(api::pages::serve_register))
        .route("/payment", get(api::pages::serve_payment))
        .route("/static/app.js", get(api::pages::serve_app_js))
        .route("/static/style.css", get(api::pages::serve_style_css))
        .merge(api::health_routes());

    // Combine routers; photo files come straight off disk
    Router::new()
        .merge(protected)
        .merge(public_api)
        .merge(pages)
        .nest_service("/media", ServeDir::new(&state.media_root))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
