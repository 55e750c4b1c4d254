//! Tests for the secret sources

mod file_tests;
