//! Database initialization and shared queries

pub mod init;
pub mod settings;

pub use init::init_database;
pub use settings::{get_setting, get_setting_i64, set_setting};
