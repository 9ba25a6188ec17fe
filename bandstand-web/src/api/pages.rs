//! Page serving routes
//!
//! Serves the static HTML shells and client-side assets. The shells share
//! one layout; app.js fills them from the JSON API.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

const HOME_HTML: &str = include_str!("../ui/index.html");
const SONGS_HTML: &str = include_str!("../ui/songs.html");
const PHOTOS_HTML: &str = include_str!("../ui/photos.html");
const CONCERTS_HTML: &str = include_str!("../ui/concerts.html");
const LOGIN_HTML: &str = include_str!("../ui/login.html");
const REGISTER_HTML: &str = include_str!("../ui/register.html");
const PAYMENT_HTML: &str = include_str!("../ui/payment.html");
const APP_JS: &str = include_str!("../ui/app.js");
const STYLE_CSS: &str = include_str!("../ui/style.css");

/// GET /
pub async fn serve_home() -> Html<&'static str> {
    Html(HOME_HTML)
}

/// GET /songs
pub async fn serve_songs() -> Html<&'static str> {
    Html(SONGS_HTML)
}

/// GET /photos
pub async fn serve_photos() -> Html<&'static str> {
    Html(PHOTOS_HTML)
}

/// GET /concerts
pub async fn serve_concerts() -> Html<&'static str> {
    Html(CONCERTS_HTML)
}

/// GET /login
pub async fn serve_login() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

/// GET /register
pub async fn serve_register() -> Html<&'static str> {
    Html(REGISTER_HTML)
}

/// GET /payment
pub async fn serve_payment() -> Html<&'static str> {
    Html(PAYMENT_HTML)
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}

/// GET /static/style.css
pub async fn serve_style_css() -> Response {
    (StatusCode::OK, [("content-type", "text/css")], STYLE_CSS).into_response()
}
