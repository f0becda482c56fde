//! Lifecycle events delivered to the hosting page.

use std::collections::BTreeMap;

use embedauth_core::models::user::PublicUser;

/// Emitted on every successful authentication or logout transition.
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    SignedIn(PublicUser),
    SignedOut,
}

pub type SubscriptionId = u64;
type Callback = Box<dyn Fn(&WidgetEvent) + Send + Sync>;

/// Per-client subscriber registry. Each widget instance owns its own
/// bus rather than sharing a page-global one.
#[derive(Default)]
pub struct EventBus {
    next_id: SubscriptionId,
    subscribers: BTreeMap<SubscriptionId, Callback>,
}

impl EventBus {
    pub fn subscribe(&mut self, callback: impl Fn(&WidgetEvent) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.insert(id, Box::new(callback));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub fn emit(&self, event: &WidgetEvent) {
        for callback in self.subscribers.values() {
            callback(event);
        }
    }
}
