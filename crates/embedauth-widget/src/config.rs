//! Widget configuration and theming.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::WidgetError;

/// Cosmetic theme for the injected UI block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Parse a theme attribute; anything other than "light" falls
    /// back to the default dark theme.
    pub fn parse(value: &str) -> Self {
        match value {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                background: "#18181b",
                border: "#3f3f46",
                input: "#27272a",
                text: "#fafafa",
                muted: "#a1a1aa",
                accent: "#6366f1",
                accent_hover: "#818cf8",
                button_text: "#fff",
            },
            Theme::Light => Palette {
                background: "#ffffff",
                border: "#e4e4e7",
                input: "#f4f4f5",
                text: "#18181b",
                muted: "#71717a",
                accent: "#6366f1",
                accent_hover: "#818cf8",
                button_text: "#fff",
            },
        }
    }
}

/// CSS colour values for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub border: &'static str,
    pub input: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub accent: &'static str,
    pub accent_hover: &'static str,
    pub button_text: &'static str,
}

/// Per-embed configuration.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Tenant API key. Mandatory; also namespaces token storage.
    pub api_key: String,
    pub theme: Theme,
    /// Server base URL, e.g. `https://auth.example.com`.
    pub base_url: String,
}

impl WidgetConfig {
    /// Build a configuration, rejecting a missing or empty API key.
    /// The failure is logged; the host page keeps running without a
    /// widget rather than crashing.
    pub fn new(
        api_key: impl Into<String>,
        theme: Theme,
        base_url: impl Into<String>,
    ) -> Result<Self, WidgetError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            error!("widget not rendered: no API key configured");
            return Err(WidgetError::MissingApiKey);
        }
        Ok(Self {
            api_key,
            theme,
            base_url: base_url.into(),
        })
    }

    /// Storage key for the persisted token, namespaced so multiple
    /// tenants on one page do not collide.
    pub fn storage_key(&self) -> String {
        format!("embedauth_token_{}", self.api_key)
    }
}
