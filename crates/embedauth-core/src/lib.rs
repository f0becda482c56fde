//! EmbedAuth Core: domain models, repository traits, and shared
//! error types.
//!
//! This crate has no I/O dependencies; storage backends implement the
//! traits in [`repository`] and the auth layer composes them.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{CoreError, CoreResult};
