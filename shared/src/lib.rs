//! Shared types for the Karvon operations backend
//!
//! Data models and payloads exchanged between the server and its web
//! frontend, plus small utilities (timestamps, ID generation).
//! DB row derives are feature-gated behind `db` so the frontend build
//! never pulls in sqlx.

pub mod models;
pub mod util;

pub use serde::{Deserialize, Serialize};
