//! Application configuration management.
//!
//! Two layers live here:
//!
//! - `Settings`: runtime settings read from the environment (`.env` honoured
//!   by the binary). Selects demo or live mode, the API base URL, the session
//!   policy and where the bearer token is persisted.
//! - `Preferences`: operator preferences saved to
//!   `~/.config/backoffice-admin/config.json`.

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use anyhow::{bail, Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "backoffice-admin";

/// Preferences file name
const CONFIG_FILE: &str = "config.json";

/// Session lifetime granted by login and by each extension
const DEFAULT_SESSION_TTL_MINUTES: i64 = 15;

/// Longest session lifetime accepted from configuration (one year)
const MAX_SESSION_TTL_MINUTES: i64 = 365 * 24 * 60;

/// How often the expiry watch compares the clock against the session expiry
const DEFAULT_SESSION_CHECK_SECS: u64 = 60;

const DEFAULT_DEMO_IDENTIFIER: &str = "adminbreakfree";
const DEFAULT_DEMO_SECRET: &str = "open4u";

pub const ENV_MODE: &str = "BACKOFFICE_MODE";
pub const ENV_API_BASE_URL: &str = "BACKOFFICE_API_BASE_URL";
pub const ENV_SESSION_TTL_MINUTES: &str = "BACKOFFICE_SESSION_TTL_MINUTES";
pub const ENV_SESSION_CHECK_SECS: &str = "BACKOFFICE_SESSION_CHECK_SECS";
pub const ENV_DEMO_IDENTIFIER: &str = "BACKOFFICE_DEMO_IDENTIFIER";
pub const ENV_DEMO_SECRET: &str = "BACKOFFICE_DEMO_SECRET";
pub const ENV_TOKEN_STORE: &str = "BACKOFFICE_TOKEN_STORE";

/// Whether auth and data are served locally or over the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// No network calls; fixed credentials and fixture data
    Demo,
    /// Talk to the configured back-office API
    Live,
}

impl AppMode {
    /// An explicit mode flag wins. Without one, demo mode is selected only
    /// when no API base URL is configured.
    pub fn resolve(flag: Option<&str>, base_url: Option<&str>) -> Result<Self> {
        match flag.map(|f| f.trim().to_ascii_lowercase()) {
            Some(f) if f == "demo" => Ok(AppMode::Demo),
            Some(f) if f == "live" => Ok(AppMode::Live),
            Some(f) if !f.is_empty() => bail!("{} must be 'demo' or 'live', got '{}'", ENV_MODE, f),
            _ => Ok(if base_url.is_some() {
                AppMode::Live
            } else {
                AppMode::Demo
            }),
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, AppMode::Demo)
    }
}

/// The one credential pair accepted in demo mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoCredentials {
    pub identifier: String,
    pub secret: String,
}

impl DemoCredentials {
    pub fn matches(&self, identifier: &str, secret: &str) -> bool {
        self.identifier == identifier && self.secret == secret
    }
}

impl Default for DemoCredentials {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_DEMO_IDENTIFIER.to_string(),
            secret: DEFAULT_DEMO_SECRET.to_string(),
        }
    }
}

/// Session lifetime policy
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPolicy {
    pub ttl: Duration,
    pub check_interval: StdDuration,
    pub demo_credentials: DemoCredentials,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            check_interval: StdDuration::from_secs(DEFAULT_SESSION_CHECK_SECS),
            demo_credentials: DemoCredentials::default(),
        }
    }
}

/// Where the bearer token is persisted between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenBackend {
    #[default]
    Keyring,
    File,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub mode: AppMode,
    pub api_base_url: Option<String>,
    pub policy: SessionPolicy,
    pub token_backend: TokenBackend,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base_url = get(ENV_API_BASE_URL).map(|u| u.trim_end_matches('/').to_string());
        let mode = AppMode::resolve(get(ENV_MODE).as_deref(), api_base_url.as_deref())?;
        if mode == AppMode::Live && api_base_url.is_none() {
            bail!("{} is required in live mode", ENV_API_BASE_URL);
        }

        let mut policy = SessionPolicy::default();
        if let Some(raw) = get(ENV_SESSION_TTL_MINUTES) {
            let minutes: i64 = raw
                .parse()
                .with_context(|| format!("{} must be a whole number of minutes", ENV_SESSION_TTL_MINUTES))?;
            if minutes <= 0 {
                bail!("{} must be positive", ENV_SESSION_TTL_MINUTES);
            }
            if minutes > MAX_SESSION_TTL_MINUTES {
                bail!(
                    "{} must be at most {} minutes",
                    ENV_SESSION_TTL_MINUTES,
                    MAX_SESSION_TTL_MINUTES
                );
            }
            policy.ttl = Duration::try_minutes(minutes)
                .with_context(|| format!("{} is out of range", ENV_SESSION_TTL_MINUTES))?;
        }
        if let Some(raw) = get(ENV_SESSION_CHECK_SECS) {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_SESSION_CHECK_SECS))?;
            policy.check_interval = StdDuration::from_secs(secs.max(1));
        }
        if let Some(identifier) = get(ENV_DEMO_IDENTIFIER) {
            policy.demo_credentials.identifier = identifier;
        }
        if let Some(secret) = get(ENV_DEMO_SECRET) {
            policy.demo_credentials.secret = secret;
        }

        let token_backend = match get(ENV_TOKEN_STORE).map(|s| s.to_ascii_lowercase()).as_deref() {
            None | Some("keyring") => TokenBackend::Keyring,
            Some("file") => TokenBackend::File,
            Some(other) => bail!("{} must be 'keyring' or 'file', got '{}'", ENV_TOKEN_STORE, other),
        };

        Ok(Self {
            mode,
            api_base_url,
            policy,
            token_backend,
        })
    }
}

/// Directory for logs and the file-backed token store
pub fn cache_dir() -> Result<PathBuf> {
    let cache_dir =
        dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
    Ok(cache_dir.join(APP_NAME))
}

/// Operator preferences persisted between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    pub last_email: Option<String>,
    #[serde(default = "enabled")]
    pub email_notifications: bool,
    #[serde(default = "enabled")]
    pub security_alerts: bool,
}

fn enabled() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            last_email: None,
            email_notifications: true,
            security_alerts: true,
        }
    }
}

impl Preferences {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse preferences")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults_to_demo_without_base_url() {
        let s = settings(&[]).expect("settings");
        assert_eq!(s.mode, AppMode::Demo);
        assert_eq!(s.policy.ttl, Duration::minutes(15));
        assert_eq!(s.policy.check_interval, StdDuration::from_secs(60));
        assert_eq!(s.token_backend, TokenBackend::Keyring);
    }

    #[test]
    fn test_base_url_selects_live() {
        let s = settings(&[(ENV_API_BASE_URL, "https://api.example.com/")]).expect("settings");
        assert_eq!(s.mode, AppMode::Live);
        assert_eq!(s.api_base_url.as_deref(), Some("https://api.example.com"));
    }

    #[test]
    fn test_localhost_url_is_not_sniffed() {
        let s = settings(&[(ENV_API_BASE_URL, "http://localhost:3001")]).expect("settings");
        assert_eq!(s.mode, AppMode::Live);
    }

    #[test]
    fn test_explicit_demo_flag_wins() {
        let s = settings(&[(ENV_MODE, "demo"), (ENV_API_BASE_URL, "https://api.example.com")])
            .expect("settings");
        assert_eq!(s.mode, AppMode::Demo);
    }

    #[test]
    fn test_live_requires_base_url() {
        assert!(settings(&[(ENV_MODE, "live")]).is_err());
        assert!(settings(&[(ENV_MODE, "staging")]).is_err());
    }

    #[test]
    fn test_policy_overrides() {
        let s = settings(&[
            (ENV_SESSION_TTL_MINUTES, "30"),
            (ENV_SESSION_CHECK_SECS, "5"),
            (ENV_DEMO_IDENTIFIER, "ops"),
            (ENV_DEMO_SECRET, "pw"),
            (ENV_TOKEN_STORE, "file"),
        ])
        .expect("settings");
        assert_eq!(s.policy.ttl, Duration::minutes(30));
        assert_eq!(s.policy.check_interval, StdDuration::from_secs(5));
        assert!(s.policy.demo_credentials.matches("ops", "pw"));
        assert_eq!(s.token_backend, TokenBackend::File);
        assert!(settings(&[(ENV_SESSION_TTL_MINUTES, "0")]).is_err());
    }

    #[test]
    fn test_oversized_ttl_is_rejected() {
        assert!(settings(&[(ENV_SESSION_TTL_MINUTES, "1000000000000")]).is_err());
        assert!(settings(&[(ENV_SESSION_TTL_MINUTES, &i64::MAX.to_string())]).is_err());

        let year = MAX_SESSION_TTL_MINUTES.to_string();
        let s = settings(&[(ENV_SESSION_TTL_MINUTES, &year)]).expect("settings");
        assert_eq!(s.policy.ttl, Duration::days(365));
    }

    #[test]
    fn test_preferences_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(CONFIG_FILE);

        assert_eq!(Preferences::load_from(&path).expect("load"), Preferences::default());

        let prefs = Preferences {
            last_email: Some("ops@example.com".into()),
            email_notifications: false,
            security_alerts: true,
        };
        prefs.save_to(&path).expect("save");
        assert_eq!(Preferences::load_from(&path).expect("reload"), prefs);
    }
}
