//! Firebase Authentication client (Identity Toolkit REST API)
//!
//! Email/password sign-up and sign-in, ID-token refresh through the Secure
//! Token endpoint, and session notifications over a `watch` channel. Error
//! codes from the REST API are translated into the message text the Firebase
//! web SDK shows, so users see the same alerts either way.
//!
//! API Documentation: https://firebase.google.com/docs/reference/rest/auth

use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::SessionUser;
use crate::ports::{AccessTokenSource, IdentityProvider, SessionReceiver};

/// Identity Toolkit base URL
pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Secure Token refresh endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";

/// Refresh the ID token this long before it expires
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime assumed when the response omits `expiresIn`
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Message the web SDK shows for transport failures
const NETWORK_FAILED: &str = "Firebase: Error (auth/network-request-failed).";

/// Translate an Identity Toolkit error code into the web SDK's message
///
/// The REST API sometimes appends detail after the code
/// (`WEAK_PASSWORD : Password should be at least 6 characters`); only the
/// code is looked at. Unknown codes are passed through.
pub fn describe_auth_error(raw: &str) -> String {
    let code = raw.split(" : ").next().unwrap_or(raw).trim();
    let sdk_code = match code {
        "EMAIL_EXISTS" => "email-already-in-use",
        "INVALID_EMAIL" => "invalid-email",
        "MISSING_EMAIL" => "missing-email",
        "MISSING_PASSWORD" => "missing-password",
        "INVALID_LOGIN_CREDENTIALS" => "invalid-credential",
        "EMAIL_NOT_FOUND" => "user-not-found",
        "INVALID_PASSWORD" => "wrong-password",
        "USER_DISABLED" => "user-disabled",
        "OPERATION_NOT_ALLOWED" => "operation-not-allowed",
        "TOKEN_EXPIRED" => "user-token-expired",
        "INVALID_REFRESH_TOKEN" => "invalid-refresh-token",
        "USER_NOT_FOUND" => "user-token-expired",
        "WEAK_PASSWORD" => {
            return "Firebase: Password should be at least 6 characters (auth/weak-password)."
                .to_string()
        }
        "TOO_MANY_ATTEMPTS_TRY_LATER" => {
            return "Firebase: Access to this account has been temporarily disabled due to many \
                    failed login attempts. You can immediately restore it by resetting your \
                    password or you can try again later. (auth/too-many-requests)."
                .to_string()
        }
        _ => return format!("Firebase: {}", raw),
    };
    format!("Firebase: Error (auth/{}).", sdk_code)
}

// =============================================================================
// API Models
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

/// The Secure Token endpoint answers in snake_case
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

fn expiry_from(expires_in: Option<&str>) -> DateTime<Utc> {
    let secs = expires_in
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    Utc::now() + chrono::Duration::seconds(secs)
}

// =============================================================================
// Client
// =============================================================================

/// Endpoints and key for the Firebase Authentication client
#[derive(Debug, Clone)]
pub struct FirebaseAuthSettings {
    pub api_key: String,
    pub auth_url: String,
    pub token_url: String,
    pub timeout: Duration,
}

impl FirebaseAuthSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
struct Credentials {
    user: SessionUser,
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl Credentials {
    fn is_fresh(&self) -> bool {
        self.expires_at - chrono::Duration::seconds(EXPIRY_MARGIN_SECS) > Utc::now()
    }
}

/// Firebase Authentication client
pub struct FirebaseAuth {
    client: Client,
    settings: FirebaseAuthSettings,
    credentials: Mutex<Option<Credentials>>,
    sessions: watch::Sender<Option<SessionUser>>,
}

impl FirebaseAuth {
    pub fn new(settings: FirebaseAuthSettings) -> anyhow::Result<Self> {
        if settings.api_key.is_empty() {
            anyhow::bail!("Firebase API key cannot be empty");
        }

        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let (sessions, _rx) = watch::channel(None);
        Ok(Self {
            client,
            settings,
            credentials: Mutex::new(None),
            sessions,
        })
    }

    fn endpoint(&self, method: &str) -> Result<Url> {
        let base = self.settings.auth_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/accounts:{}", base, method))
            .map_err(|e| Error::config(format!("Invalid auth URL: {}", e)))?;
        url.query_pairs_mut().append_pair("key", &self.settings.api_key);
        Ok(url)
    }

    fn token_endpoint(&self) -> Result<Url> {
        let mut url = Url::parse(&self.settings.token_url)
            .map_err(|e| Error::config(format!("Invalid token URL: {}", e)))?;
        url.query_pairs_mut().append_pair("key", &self.settings.api_key);
        Ok(url)
    }

    async fn password_request(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionUser> {
        let url = self.endpoint(method)?;
        debug!(method, "Calling Identity Toolkit");

        let response = self
            .client
            .post(url)
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(map_request_error)?;

        let body: PasswordResponse = read_response(response).await?;
        let user = SessionUser::new(body.local_id, body.email.or_else(|| Some(email.to_string())));

        self.set_credentials(Some(Credentials {
            user: user.clone(),
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: expiry_from(body.expires_in.as_deref()),
        }))?;
        self.sessions.send_replace(Some(user.clone()));

        Ok(user)
    }

    async fn refresh(&self, current: &Credentials) -> Result<Credentials> {
        let url = self.token_endpoint()?;
        debug!(uid = %current.user.uid, "Refreshing ID token");

        let response = self
            .client
            .post(url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", current.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(map_request_error)?;

        let body: RefreshResponse = read_response(response).await?;
        if let Some(user_id) = &body.user_id {
            if user_id != &current.user.uid {
                return Err(Error::auth(describe_auth_error("USER_NOT_FOUND")));
            }
        }

        Ok(Credentials {
            user: current.user.clone(),
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: expiry_from(body.expires_in.as_deref()),
        })
    }

    fn current_credentials(&self) -> Result<Option<Credentials>> {
        self.credentials
            .lock()
            .map(|c| c.clone())
            .map_err(|e| Error::auth(format!("Lock poisoned: {}", e)))
    }

    fn set_credentials(&self, credentials: Option<Credentials>) -> Result<()> {
        let mut guard = self
            .credentials
            .lock()
            .map_err(|e| Error::auth(format!("Lock poisoned: {}", e)))?;
        *guard = credentials;
        Ok(())
    }

    /// Store refreshed credentials unless the session changed meanwhile
    fn replace_if_same_session(&self, refreshed: Credentials) -> Result<bool> {
        let mut guard = self
            .credentials
            .lock()
            .map_err(|e| Error::auth(format!("Lock poisoned: {}", e)))?;
        match guard.as_ref() {
            Some(existing) if existing.user.uid == refreshed.user.uid => {
                *guard = Some(refreshed);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

async fn read_response<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await.map_err(map_request_error)?;

    if status.is_success() {
        return serde_json::from_str(&text)
            .map_err(|e| Error::auth(format!("Firebase: Unexpected response ({}).", e)));
    }

    match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            Err(Error::auth(describe_auth_error(&envelope.error.message)))
        }
        _ => Err(Error::auth(format!(
            "Firebase: Error (auth/internal-error). HTTP {}",
            status.as_u16()
        ))),
    }
}

fn map_request_error(error: reqwest::Error) -> Error {
    debug!(error = %error, "Identity request failed");
    Error::auth(NETWORK_FAILED)
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    fn name(&self) -> &str {
        "firebase"
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<SessionUser> {
        self.password_request("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser> {
        self.password_request("signInWithPassword", email, password).await
    }

    async fn sign_out(&self) -> Result<()> {
        self.set_credentials(None)?;
        self.sessions.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> SessionReceiver {
        self.sessions.subscribe()
    }
}

#[async_trait]
impl AccessTokenSource for FirebaseAuth {
    async fn access_token(&self) -> Result<Option<String>> {
        let current = match self.current_credentials()? {
            Some(current) => current,
            None => return Ok(None),
        };
        if current.is_fresh() {
            return Ok(Some(current.id_token));
        }

        match self.refresh(&current).await {
            Ok(refreshed) => {
                let token = refreshed.id_token.clone();
                if self.replace_if_same_session(refreshed)? {
                    Ok(Some(token))
                } else {
                    Ok(self.current_credentials()?.map(|c| c.id_token))
                }
            }
            Err(e) => {
                warn!(uid = %current.user.uid, error = %e, "Token refresh failed, signing out");
                self.sign_out().await?;
                info!("Session ended after failed token refresh");
                Err(e)
            }
        }
    }
}
