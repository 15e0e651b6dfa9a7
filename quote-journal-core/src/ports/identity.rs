//! Identity provider port
//!
//! Defines the interface for email/password authentication and the
//! session-change notification stream.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::result::Result;
use crate::domain::SessionUser;

/// Receiving end of the session-change stream. The current value is the
/// current session (`None` when logged out).
pub type SessionReceiver = watch::Receiver<Option<SessionUser>>;

/// Identity provider trait
///
/// Successful `create_account`/`sign_in` and any `sign_out` publish the new
/// session on every receiver handed out by `subscribe`. Failures carry the
/// provider's message text in `Error::Auth`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name (e.g., "firebase", "demo")
    fn name(&self) -> &str;

    /// Create an account and sign it in
    async fn create_account(&self, email: &str, password: &str) -> Result<SessionUser>;

    /// Sign in with existing credentials
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser>;

    /// End the current session (no-op when logged out)
    async fn sign_out(&self) -> Result<()>;

    /// Register for session-change notifications
    fn subscribe(&self) -> SessionReceiver;
}

/// Source of bearer tokens for the current session
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// ID token for the current session, refreshed if it is about to expire.
    /// `None` when logged out.
    async fn access_token(&self) -> Result<Option<String>>;
}
