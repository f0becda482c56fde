//! EmbedAuth Server: axum HTTP surface over the auth gateway.
//!
//! Exposed as a library so integration tests can build the router
//! against an in-memory database.

pub mod app;
pub mod error;
