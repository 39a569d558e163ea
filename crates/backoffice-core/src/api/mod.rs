//! HTTP access to the back-office REST API.
//!
//! - `ApiClient`: bearer-authenticated requests, 429 backoff, the 401 hook
//! - `shapes`: parsing of the API's non-uniform response layouts
//! - `ApiError`: typed failures

pub mod client;
pub mod error;
pub mod shapes;

pub use client::ApiClient;
pub use error::ApiError;
