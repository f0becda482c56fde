//! Domain models for EmbedAuth.
//!
//! Three entities: projects (tenants), users, and sessions. Users and
//! sessions are always scoped to their owning project.

pub mod project;
pub mod session;
pub mod user;
