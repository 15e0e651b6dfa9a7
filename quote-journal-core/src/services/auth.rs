//! Auth service - log in, sign up and log out
//!
//! Session state is never written here. A successful call makes the identity
//! provider publish a notification, and the session controller applies it.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::SessionUser;
use crate::ports::IdentityProvider;

/// Auth service
#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    /// Create an account; the new account is signed in
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SessionUser> {
        let result = self.identity.create_account(email, password).await;
        self.finish("sign_up", result)
    }

    /// Sign in with email and password
    pub async fn log_in(&self, email: &str, password: &str) -> Result<SessionUser> {
        let result = self.identity.sign_in(email, password).await;
        self.finish("log_in", result)
    }

    /// End the current session
    pub async fn log_out(&self) -> Result<()> {
        self.identity.sign_out().await.map_err(into_auth_error)?;
        info!(provider = self.identity.name(), "Logged out");
        Ok(())
    }

    fn finish(&self, action: &str, result: Result<SessionUser>) -> Result<SessionUser> {
        match result {
            Ok(user) => {
                info!(provider = self.identity.name(), action, uid = %user.uid, "Authenticated");
                Ok(user)
            }
            Err(e) => {
                warn!(provider = self.identity.name(), action, error = %e, "Authentication failed");
                Err(into_auth_error(e))
            }
        }
    }
}

/// Every identity failure reaches the user as an `Auth` alert
fn into_auth_error(e: Error) -> Error {
    match e {
        Error::Auth(_) => e,
        other => Error::auth(other.to_string()),
    }
}
