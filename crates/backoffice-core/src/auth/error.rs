use thiserror::Error;

/// Login failures surfaced inline on the login form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Session manager is still starting up")]
    NotInitialized,

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    LoginFailed(String),
}

impl AuthError {
    /// Text for the login form
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
