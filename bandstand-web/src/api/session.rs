//! Session handling: cookie parsing, identity middleware, and the
//! register / login / logout / whoami handlers.
//!
//! The session cookie holds an opaque UUID token resolved against the
//! sessions table on every request. Two middleware flavors share one
//! resolver: `attach_session` makes identity optional (public pages),
//! `require_session` rejects with 401 (attendance, payment).

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{db, AppState};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "bandstand_session";

/// Fallback session lifetime when the setting is unreadable (14 days)
const DEFAULT_SESSION_TTL_SECONDS: i64 = 1_209_600;

/// The authenticated identity, inserted into request extensions by the
/// session middleware and read by downstream handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub guid: Uuid,
    pub username: String,
}

// ========================================
// Cookie parsing and session resolution
// ========================================

/// Pull the session token out of the Cookie header, if present
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

async fn resolve_session(state: &AppState, headers: &HeaderMap) -> Option<CurrentUser> {
    let token = session_token_from_headers(headers)?;

    match db::sessions::load_session_user(&state.db, &token).await {
        Ok(Some(session)) => Some(CurrentUser {
            guid: session.user_guid,
            username: session.username,
        }),
        Ok(None) => None,
        Err(e) => {
            warn!("Session lookup failed: {}", e);
            None
        }
    }
}

fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    )
}

fn clear_session_cookie() -> String {
    session_cookie("", 0)
}

// ========================================
// Middleware
// ========================================

/// Identity-attaching middleware for public routes
///
/// Inserts `CurrentUser` into request extensions when a valid session
/// cookie is present; always passes the request through.
pub async fn attach_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(user) = resolve_session(&state, request.headers()).await {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

/// Session-requiring middleware for protected routes
///
/// Returns 401 Unauthorized when no valid session cookie is present.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, SessionError> {
    match resolve_session(&state, request.headers()).await {
        Some(user) => {
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        None => Err(SessionError::Unauthorized),
    }
}

// ========================================
// Handlers
// ========================================

/// Registration request fields
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request fields
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Whoami response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub username: Option<String>,
}

/// POST /api/register
///
/// Creates a new account. Duplicate usernames are rejected with 409.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, SessionError> {
    let username = request.username.trim();
    let email = request.email.trim();

    if username.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(SessionError::InvalidInput(
            "username, email and password are required".to_string(),
        ));
    }

    if db::users::username_exists(&state.db, username).await? {
        return Err(SessionError::UsernameTaken(username.to_string()));
    }

    let user = db::users::User::new(username, email, &request.password);
    db::users::create_user(&state.db, &user).await?;

    info!("Registered new user '{}'", username);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "username": username })),
    ))
}

/// POST /api/login
///
/// Verifies credentials and opens a session. The response carries the
/// session cookie. Unknown username and wrong password are deliberately
/// indistinguishable.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, SessionError> {
    let user = db::users::load_user_by_username(&state.db, request.username.trim()).await?;

    let user = match user {
        Some(user) if user.verify_password(&request.password) => user,
        _ => return Err(SessionError::InvalidCredentials),
    };

    let ttl = bandstand_common::db::get_setting_i64(
        &state.db,
        "session_timeout_seconds",
        DEFAULT_SESSION_TTL_SECONDS,
    )
    .await?;

    let token = db::sessions::create_session(&state.db, user.guid, ttl).await?;

    info!("User '{}' logged in", user.username);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&token, ttl))],
        Json(json!({ "success": true, "username": user.username })),
    ))
}

/// POST /api/logout
///
/// Deletes the session row (if any) and clears the cookie. Safe to call
/// without a session.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, SessionError> {
    if let Some(token) = session_token_from_headers(&headers) {
        db::sessions::delete_session(&state.db, &token).await?;
    }

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(json!({ "success": true })),
    ))
}

/// GET /api/session
///
/// Reports whether the caller has a valid session, and for whom.
pub async fn whoami(user: Option<Extension<CurrentUser>>) -> Json<SessionResponse> {
    match user {
        Some(Extension(user)) => Json(SessionResponse {
            authenticated: true,
            username: Some(user.username),
        }),
        None => Json(SessionResponse {
            authenticated: false,
            username: None,
        }),
    }
}

// ========================================
// Errors
// ========================================

/// Session and account error types for HTTP responses
#[derive(Debug)]
pub enum SessionError {
    Unauthorized,
    InvalidCredentials,
    UsernameTaken(String),
    InvalidInput(String),
    DatabaseError(String),
}

impl From<bandstand_common::Error> for SessionError {
    fn from(e: bandstand_common::Error) -> Self {
        SessionError::DatabaseError(e.to_string())
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SessionError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Login required".to_string())
            }
            SessionError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            SessionError::UsernameTaken(name) => {
                (StatusCode::CONFLICT, format!("Username already taken: {}", name))
            }
            SessionError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            SessionError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
