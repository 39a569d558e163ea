//! Authentication and session lifecycle.
//!
//! This module provides:
//! - `SessionHandle`: the shared session state and the single
//!   clear-and-redirect procedure
//! - `SessionManager`: initialize, login, logout, extend and the expiry watch
//! - `TokenStore`: durable storage for the bearer token (keyring or file)
//!
//! Sessions last a fixed TTL (15 minutes by default) from login or the last
//! extension.

pub mod error;
pub mod manager;
pub mod session;
pub mod token_store;

pub use error::AuthError;
pub use manager::{AuthBackend, LoginGrant, SessionManager};
pub use session::{ActiveSession, SessionEvent, SessionHandle, SessionState, SignOutReason};
pub use token_store::{
    open_token_store, FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore, TOKEN_ENTRY,
};
