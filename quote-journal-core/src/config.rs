//! Configuration management
//!
//! Settings live in `settings.json` inside the app directory:
//! ```json
//! {
//!   "app": { "demoMode": false },
//!   "firebase": { "apiKey": "...", "projectId": "...", "authDomain": "..." },
//!   "quotes": { "quoteUrl": "...", "relayUrl": "..." },
//!   "http": { "timeoutSecs": 30 }
//! }
//! ```
//! Keys this crate does not manage are kept when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::firebase_auth::{DEFAULT_AUTH_URL, DEFAULT_TOKEN_URL};
use crate::adapters::firestore::DEFAULT_FIRESTORE_URL;
use crate::adapters::quote_relay::{DEFAULT_QUOTE_URL, DEFAULT_RELAY_URL};
use crate::domain::result::{Error, Result as DomainResult};

pub const SETTINGS_FILE: &str = "settings.json";

/// Environment variable naming the app directory
pub const APP_DIR_ENV: &str = "QUOTE_JOURNAL_DIR";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// App directory from `QUOTE_JOURNAL_DIR`, or `~/.quote-journal`
pub fn default_app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(APP_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".quote-journal"))
        .context("Could not find home directory")
}

// =============================================================================
// settings.json
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    firebase: FirebaseSettings,
    #[serde(default)]
    quotes: QuoteSettings,
    #[serde(default)]
    http: HttpSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// The web app's `firebaseConfig` object; only some keys are used
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirebaseSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_domain: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quote_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relay_url: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

// =============================================================================
// Config
// =============================================================================

/// Firebase project and endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub auth_domain: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    pub firestore_url: String,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            project_id: None,
            auth_domain: None,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
        }
    }
}

/// Quote source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteConfig {
    pub quote_url: String,
    pub relay_url: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            quote_url: DEFAULT_QUOTE_URL.to_string(),
            relay_url: DEFAULT_RELAY_URL.to_string(),
        }
    }
}

/// Quote Journal configuration (resolved view of settings + environment)
#[derive(Debug, Clone)]
pub struct Config {
    pub demo_mode: bool,
    pub firebase: FirebaseConfig,
    pub quotes: QuoteConfig,
    pub http_timeout: Duration,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
    // Firebase keys that came from the environment; never written to disk
    env_firebase: EnvFirebaseKeys,
}

#[derive(Debug, Clone, Default)]
struct EnvFirebaseKeys {
    api_key: Option<String>,
    project_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: false,
            firebase: FirebaseConfig::default(),
            quotes: QuoteConfig::default(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            _raw_settings: SettingsFile::default(),
            env_firebase: EnvFirebaseKeys::default(),
        }
    }
}

impl Config {
    /// Load config from the app directory, applying environment overrides
    pub fn load(app_dir: &Path) -> Result<Self> {
        Self::load_with_env(app_dir, |key| std::env::var(key).ok())
    }

    /// Load config with an explicit environment lookup
    ///
    /// Overrides: `QUOTE_JOURNAL_DEMO_MODE`, `FIREBASE_API_KEY`,
    /// `FIREBASE_PROJECT_ID`, `QUOTE_JOURNAL_QUOTE_URL`,
    /// `QUOTE_JOURNAL_RELAY_URL`, and the endpoint overrides
    /// `FIREBASE_AUTH_URL`, `FIREBASE_TOKEN_URL`, `FIRESTORE_URL` (emulators,
    /// tests).
    pub fn load_with_env(app_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let settings_path = app_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {:?}", settings_path))?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let demo_mode = match env("QUOTE_JOURNAL_DEMO_MODE").as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => false,
            _ => raw.app.demo_mode,
        };

        let env_firebase = EnvFirebaseKeys {
            api_key: non_empty("FIREBASE_API_KEY"),
            project_id: non_empty("FIREBASE_PROJECT_ID"),
        };

        let defaults = FirebaseConfig::default();
        let firebase = FirebaseConfig {
            api_key: env_firebase
                .api_key
                .clone()
                .or_else(|| raw.firebase.api_key.clone()),
            project_id: env_firebase
                .project_id
                .clone()
                .or_else(|| raw.firebase.project_id.clone()),
            auth_domain: raw.firebase.auth_domain.clone(),
            auth_url: non_empty("FIREBASE_AUTH_URL").unwrap_or(defaults.auth_url),
            token_url: non_empty("FIREBASE_TOKEN_URL").unwrap_or(defaults.token_url),
            firestore_url: non_empty("FIRESTORE_URL").unwrap_or(defaults.firestore_url),
        };

        let quotes = QuoteConfig {
            quote_url: non_empty("QUOTE_JOURNAL_QUOTE_URL")
                .or_else(|| raw.quotes.quote_url.clone())
                .unwrap_or_else(|| DEFAULT_QUOTE_URL.to_string()),
            relay_url: non_empty("QUOTE_JOURNAL_RELAY_URL")
                .or_else(|| raw.quotes.relay_url.clone())
                .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string()),
        };

        let http_timeout =
            Duration::from_secs(raw.http.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            demo_mode,
            firebase,
            quotes,
            http_timeout,
            _raw_settings: raw,
            env_firebase,
        })
    }

    /// Save config to the app directory
    ///
    /// Only `app.demoMode` and the Firebase project keys are written back;
    /// everything else in the file is preserved. Firebase keys still holding
    /// their environment override are left as they are in the file.
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(app_dir)
            .with_context(|| format!("Failed to create app directory: {:?}", app_dir))?;
        let settings_path = app_dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.app.demo_mode = self.demo_mode;
        if self.firebase.api_key.is_some() && self.firebase.api_key != self.env_firebase.api_key {
            settings.firebase.api_key = self.firebase.api_key.clone();
        }
        if self.firebase.project_id.is_some()
            && self.firebase.project_id != self.env_firebase.project_id
        {
            settings.firebase.project_id = self.firebase.project_id.clone();
        }

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {:?}", settings_path))?;
        Ok(())
    }

    /// Enable demo mode
    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    /// Disable demo mode
    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }

    /// Check that the Firebase project is configured (demo mode needs nothing)
    pub fn validate(&self) -> DomainResult<()> {
        if self.demo_mode {
            return Ok(());
        }
        if self.firebase.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(Error::config(
                "Firebase apiKey is not set (settings.json firebase.apiKey or FIREBASE_API_KEY)",
            ));
        }
        if self.firebase.project_id.as_deref().map_or(true, str::is_empty) {
            return Err(Error::config(
                "Firebase projectId is not set (settings.json firebase.projectId or FIREBASE_PROJECT_ID)",
            ));
        }
        Ok(())
    }
}
