//! Core library for the back-office admin console.
//!
//! Owns the session lifecycle, the API client and the data each console view
//! renders. The terminal front end lives in `backoffice-tui`.

pub mod api;
pub mod audit;
pub mod auth;
pub mod clock;
pub mod config;
pub mod data;
pub mod demo;
pub mod models;
pub mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};

use api::ApiClient;
use auth::{open_token_store, SessionHandle, SessionManager, TokenStore};
use clock::{Clock, SystemClock};
use config::{AppMode, Settings};
use data::DataService;

/// Everything the console needs, wired for one mode
#[derive(Clone)]
pub struct Services {
    pub session: SessionManager,
    pub data: DataService,
}

impl Services {
    /// Wire services from settings, using the configured token store and
    /// the system clock
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store = open_token_store(settings.token_backend)?;
        Self::assemble(settings, store, Arc::new(SystemClock))
    }

    pub fn assemble(
        settings: &Settings,
        store: Arc<dyn TokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let handle = SessionHandle::new(store, clock);
        let policy = settings.policy.clone();

        match settings.mode {
            AppMode::Demo => Ok(Self {
                session: SessionManager::demo(handle, policy),
                data: DataService::demo(),
            }),
            AppMode::Live => {
                let base_url = settings
                    .api_base_url
                    .as_deref()
                    .context("Live mode needs an API base URL")?;
                let client = ApiClient::new(base_url, handle.clone())
                    .context("Failed to build HTTP client")?;
                Ok(Self {
                    session: SessionManager::live(handle, policy, Arc::new(client.clone())),
                    data: DataService::live(client),
                })
            }
        }
    }
}
