//! SlowFood client library.
//!
//! Talks to the SlowFood recipe platform: session lifecycle with token
//! persistence, recipes, users and the follow graph, comments, and the AI
//! cooking assistant.
//!
//! Architecture:
//! - `session` owns the authoritative login state and the route guards
//! - `api` is a thin typed HTTP client; it implements the collaborator
//!   traits the stateful parts depend on
//! - `chat` and `social` hold per-view state and never talk HTTP directly

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod session;
pub mod social;

pub use error::{ClientError, Result};
