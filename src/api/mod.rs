//! API Module
//!
//! HTTP surface that renders app pages on the server.
//!
//! # Endpoints
//! - `GET /_health` - Health check endpoint
//! - `GET /_stats` - Instance cache statistics
//! - `GET <anything else>` - Rendered page for that path and query

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
