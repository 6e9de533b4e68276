//! REST API client module for the Rollbook backend.
//!
//! This module provides the `ApiClient` for authenticated JSON requests
//! against the school management API, and the `ApiError` taxonomy the UI
//! layers dispatch on: validation (4xx), server (5xx), session-expired
//! (401 with local teardown) and network failures.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
