//! Response models for the page server
//!
//! This module defines the DTOs (Data Transfer Objects) serialized into the
//! JSON bodies of the server's non-page endpoints.

pub mod responses;

// Re-export commonly used types
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
