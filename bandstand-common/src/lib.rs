//! # Bandstand Common Library
//!
//! Shared code for the Bandstand web service:
//! - Database initialization and schema
//! - Settings access
//! - Credential hashing
//! - Configuration loading and root folder resolution

pub mod auth;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
