//! Credential validation against the user service

pub mod http;

#[cfg(test)]
mod tests;

pub use http::HttpCredentialValidator;
