//! Mini Choo - A minimal view runtime
//!
//! Maps navigation paths to handlers through a pattern router, hands each
//! handler a fresh per-navigation state, and lets views reuse stateful
//! components through an LRU instance cache.

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod emitter;
pub mod error;
pub mod models;
pub mod render;
pub mod router;
pub mod site;
pub mod state;

pub use api::AppState;
pub use app::App;
pub use cache::{CacheCapability, CacheOption, Constructor, Instance, InstanceId};
pub use config::{AppConfig, Config};
pub use emitter::{events, Emitter};
pub use error::{AppError, Result};
pub use render::{Html, HtmlRenderer, Renderer};
pub use state::State;
