//! Error-to-HTTP mapping shared by routes and middleware

pub mod error;

pub use error::{handle_domain_error, handle_validation_error, status_for, ApiError};
