//! EmbedAuth Widget: the embeddable client.
//!
//! An explicit [`WidgetClient`] object replaces the page-global
//! singleton of browser embeds: it takes its configuration in a
//! constructor, owns one state machine, and exposes subscribe /
//! unsubscribe for lifecycle events. The transport and token store
//! are traits so hosts and tests can substitute their own.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod state;
pub mod store;
pub mod transport;

pub use client::{WidgetClient, WidgetView};
pub use config::{Palette, Theme, WidgetConfig};
pub use error::WidgetError;
pub use events::{SubscriptionId, WidgetEvent};
pub use state::{Mode, WidgetState};
pub use store::{MemoryTokenStore, TokenStore};
pub use transport::{AuthResponse, AuthTransport, Credentials, HttpTransport};
