//! HTTP server for the relay.
//!
//! # Endpoints
//!
//! - `GET  /`    : Health message
//! - `POST /chat`: Run one role-play chat turn

pub mod routes;

pub use routes::{app_router, AppState};
