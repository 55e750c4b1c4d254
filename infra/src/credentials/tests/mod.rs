//! Tests for the credential validator

mod http_tests;
