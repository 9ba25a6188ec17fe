//! HTTP API handlers for bandstand-web

pub mod attendance;
pub mod concerts;
pub mod health;
pub mod pages;
pub mod payment;
pub mod photos;
pub mod session;
pub mod songs;

pub use attendance::toggle_attendance;
pub use concerts::get_concerts;
pub use health::health_routes;
pub use payment::{complete_payment, get_payment_request};
pub use photos::get_photos;
pub use session::{attach_session, login, logout, register, require_session, whoami, CurrentUser};
pub use songs::get_songs;
