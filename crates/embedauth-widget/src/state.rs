//! Widget state machine types.

use embedauth_core::models::user::PublicUser;

/// Which form the unauthenticated widget shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Login,
    Signup,
}

/// The state machine driven by [`WidgetClient`].
///
/// `Submitting` holds the mode so a failed call can fall back to the
/// same form; `LoggingOut` is transient and observable only from an
/// event subscriber firing mid-transition.
///
/// [`WidgetClient`]: crate::client::WidgetClient
#[derive(Debug, Clone)]
pub enum WidgetState {
    Unauthenticated { mode: Mode, error: Option<String> },
    Submitting { mode: Mode },
    Authenticated { user: PublicUser },
    LoggingOut,
}

impl WidgetState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, WidgetState::Authenticated { .. })
    }

    /// Current form mode, if the widget is showing a form.
    pub fn mode(&self) -> Option<Mode> {
        match self {
            WidgetState::Unauthenticated { mode, .. } | WidgetState::Submitting { mode } => {
                Some(*mode)
            }
            _ => None,
        }
    }
}
