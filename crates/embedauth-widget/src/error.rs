//! Client-side failures.
//!
//! Server errors arrive as `{"error": "<message>"}` bodies and are
//! surfaced verbatim; a call that never completed is reported with a
//! fixed generic message instead.

use thiserror::Error;

/// Message shown when the network call itself failed.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

#[derive(Debug, Error)]
pub enum WidgetError {
    /// The embed configuration carried no API key. Fatal: the widget
    /// refuses to construct.
    #[error("embedauth: missing data-api-key")]
    MissingApiKey,

    /// The server rejected the request with a taxonomy message.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{NETWORK_ERROR_MESSAGE}")]
    Network,
}

impl WidgetError {
    /// The text the widget renders inline for this failure.
    pub fn display_message(&self) -> String {
        self.to_string()
    }
}
