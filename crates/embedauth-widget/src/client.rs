//! The widget client: an explicit object owning one state machine,
//! one transport, and one token store.
//!
//! All network calls are suspension points; the client is
//! single-threaded and permits one submission in flight at a time.
//! Calls made from the wrong state are ignored rather than queued.

use embedauth_core::models::user::PublicUser;
use tracing::debug;

use crate::config::{Palette, WidgetConfig};
use crate::events::{EventBus, SubscriptionId, WidgetEvent};
use crate::state::{Mode, WidgetState};
use crate::store::TokenStore;
use crate::transport::{AuthTransport, Credentials};

/// Shown when a submission is attempted with an empty field; no
/// network call is made.
const MISSING_FIELDS_MESSAGE: &str = "Email and password required";

/// What a renderer needs to draw the widget.
#[derive(Debug, Clone)]
pub struct WidgetView {
    pub palette: Palette,
    /// Form mode when a form is visible.
    pub mode: Option<Mode>,
    /// Inline error text, if the last submission failed.
    pub error: Option<String>,
    /// The signed-in user, when authenticated.
    pub user: Option<PublicUser>,
    /// Whether the submit affordance is disabled.
    pub busy: bool,
}

pub struct WidgetClient<T: AuthTransport, S: TokenStore> {
    config: WidgetConfig,
    transport: T,
    store: S,
    state: WidgetState,
    events: EventBus,
}

impl<T: AuthTransport, S: TokenStore> WidgetClient<T, S> {
    pub fn new(config: WidgetConfig, transport: T, store: S) -> Self {
        Self {
            config,
            transport,
            store,
            state: WidgetState::Unauthenticated {
                mode: Mode::Login,
                error: None,
            },
            events: EventBus::default(),
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn subscribe(
        &mut self,
        callback: impl Fn(&WidgetEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Start-up transition: a persisted token is validated once with
    /// `me`; any failure clears it and falls back to the login form.
    /// A successful restore is an authentication transition like any
    /// other, so subscribers see `SignedIn`.
    pub async fn init(&mut self) {
        let Some(token) = self.store.load(&self.config.storage_key()) else {
            return;
        };
        match self.transport.me(&self.config.api_key, &token).await {
            Ok(user) => {
                debug!(email = %user.email, "restored session from persisted token");
                self.events.emit(&WidgetEvent::SignedIn(user.clone()));
                self.state = WidgetState::Authenticated { user };
            }
            Err(_) => {
                self.store.clear(&self.config.storage_key());
                self.state = WidgetState::Unauthenticated {
                    mode: Mode::Login,
                    error: None,
                };
            }
        }
    }

    /// Toggle between login and signup. Permitted only while showing
    /// a form and not submitting; clears any inline error.
    pub fn set_mode(&mut self, mode: Mode) {
        if let WidgetState::Unauthenticated { .. } = self.state {
            self.state = WidgetState::Unauthenticated { mode, error: None };
        }
    }

    /// Submit the current form.
    ///
    /// Ignored unless the widget is in `Unauthenticated`; this is
    /// what enforces the single-submission rule, since the state is
    /// `Submitting` for the duration of the call.
    pub async fn submit(&mut self, email: &str, password: &str, display_name: Option<&str>) {
        let WidgetState::Unauthenticated { mode, .. } = &self.state else {
            return;
        };
        let mode = *mode;

        if email.trim().is_empty() || password.is_empty() {
            self.state = WidgetState::Unauthenticated {
                mode,
                error: Some(MISSING_FIELDS_MESSAGE.to_string()),
            };
            return;
        }

        self.state = WidgetState::Submitting { mode };
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
            display_name: display_name.map(str::to_string),
        };

        let result = match mode {
            Mode::Login => self.transport.login(&self.config.api_key, &credentials).await,
            Mode::Signup => {
                self.transport
                    .register(&self.config.api_key, &credentials)
                    .await
            }
        };

        match result {
            Ok(response) => {
                self.store
                    .save(&self.config.storage_key(), &response.token);
                self.events.emit(&WidgetEvent::SignedIn(response.user.clone()));
                self.state = WidgetState::Authenticated {
                    user: response.user,
                };
            }
            Err(err) => {
                // Same mode, inline message, interactive again.
                self.state = WidgetState::Unauthenticated {
                    mode,
                    error: Some(err.display_message()),
                };
            }
        }
    }

    /// Client-local logout: clears the persisted token and in-memory
    /// user, returns to the login form, and notifies subscribers. The
    /// server-side session is untouched and stays valid until its
    /// natural expiry.
    pub fn logout(&mut self) {
        if !self.state.is_authenticated() {
            return;
        }
        self.state = WidgetState::LoggingOut;
        self.store.clear(&self.config.storage_key());
        self.events.emit(&WidgetEvent::SignedOut);
        self.state = WidgetState::Unauthenticated {
            mode: Mode::Login,
            error: None,
        };
    }

    pub fn view(&self) -> WidgetView {
        let palette = self.config.theme.palette();
        match &self.state {
            WidgetState::Unauthenticated { mode, error } => WidgetView {
                palette,
                mode: Some(*mode),
                error: error.clone(),
                user: None,
                busy: false,
            },
            WidgetState::Submitting { mode } => WidgetView {
                palette,
                mode: Some(*mode),
                error: None,
                user: None,
                busy: true,
            },
            WidgetState::Authenticated { user } => WidgetView {
                palette,
                mode: None,
                error: None,
                user: Some(user.clone()),
                busy: false,
            },
            WidgetState::LoggingOut => WidgetView {
                palette,
                mode: None,
                error: None,
                user: None,
                busy: true,
            },
        }
    }
}
