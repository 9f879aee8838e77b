use serde::{Deserialize, Serialize};

/// Console session lifecycle.
///
/// `Disconnected -> Connected -> AuthenticatingLogin -> AuthenticatingPassword
/// -> Ready -> Disconnected`. A failure while authenticating drops straight
/// back to `Disconnected`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionState {
    /// No transport open
    Disconnected,
    /// Transport open, not yet authenticated
    Connected,
    /// Waiting for the login or shell prompt
    AuthenticatingLogin,
    /// Username sent, waiting for the password exchange to finish
    AuthenticatingPassword,
    /// Shell prompt observed, commands may be issued
    Ready,
}

impl SessionState {
    /// Whether the transport is open in this state
    pub fn is_connected(self) -> bool {
        !matches!(self, SessionState::Disconnected)
    }

    /// Whether the session may run commands
    pub fn accepts_commands(self) -> bool {
        matches!(self, SessionState::Connected | SessionState::Ready)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Disconnected
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Disconnected => write!(f, "Disconnected"),
            SessionState::Connected => write!(f, "Connected"),
            SessionState::AuthenticatingLogin => write!(f, "Authenticating (login)"),
            SessionState::AuthenticatingPassword => write!(f, "Authenticating (password)"),
            SessionState::Ready => write!(f, "Ready"),
        }
    }
}
