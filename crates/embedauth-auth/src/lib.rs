//! EmbedAuth Auth: password hashing, key/token generation, origin
//! policy, and the gateway service composing the repositories into
//! the register / login / current-user operations.

pub mod config;
pub mod error;
pub mod keys;
pub mod origin;
pub mod password;
pub mod service;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthGateway, AuthSuccess, CredentialsInput};
