//! Token persistence.
//!
//! The browser original keeps its token in local storage; here the
//! store is a trait so hosts choose where tokens live. Keys are the
//! api-key-namespaced storage keys from [`WidgetConfig::storage_key`].
//!
//! [`WidgetConfig::storage_key`]: crate::config::WidgetConfig::storage_key

use std::collections::HashMap;
use std::sync::Mutex;

pub trait TokenStore: Send + Sync {
    /// Read the persisted token under `key`, if any.
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, token: &str);
    fn clear(&self, key: &str);
}

/// Stores are commonly shared between a widget and its host page.
impl<S: TokenStore> TokenStore for std::sync::Arc<S> {
    fn load(&self, key: &str) -> Option<String> {
        (**self).load(key)
    }

    fn save(&self, key: &str, token: &str) {
        (**self).save(key, token)
    }

    fn clear(&self, key: &str) {
        (**self).clear(key)
    }
}

/// In-process store, the default for tests and ephemeral embeds.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> Option<String> {
        match self.tokens.lock() {
            Ok(tokens) => tokens.get(key).cloned(),
            Err(_) => None,
        }
    }

    fn save(&self, key: &str, token: &str) {
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.insert(key.to_string(), token.to_string());
        }
    }

    fn clear(&self, key: &str) {
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.remove(key);
        }
    }
}
