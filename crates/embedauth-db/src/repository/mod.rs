//! SurrealDB repository implementations.

mod project;
mod session;
mod user;

pub use project::SurrealProjectRepository;
pub use session::SurrealSessionRepository;
pub use user::SurrealUserRepository;
