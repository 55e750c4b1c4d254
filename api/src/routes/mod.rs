//! HTTP route handlers

pub mod admin;
pub mod auth;
pub mod health;

pub use auth::AppState;
