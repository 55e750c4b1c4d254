//! Tests for the Redis cache module

mod redis_client_tests;
