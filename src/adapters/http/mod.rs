//! Inbound HTTP adapter (axum).

pub mod dto;
pub mod routes;

pub use routes::{router, AppState};
