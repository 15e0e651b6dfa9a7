//! Session controller - mirror the identity provider's session into the state
//!
//! On start the controller registers for session notifications and applies
//! the current value right away. Every notification that carries a user
//! starts one refresh round (favorites, journal entries, saved quotes); a
//! notification without a user clears the lists.

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::SessionUser;
use crate::ports::{IdentityProvider, SessionReceiver};
use crate::services::CollectionSync;
use crate::state::StateStore;

/// Session controller
///
/// Dropping the controller deregisters it.
pub struct SessionController {
    handle: JoinHandle<()>,
}

impl SessionController {
    /// Register for session notifications and start applying them
    pub fn start(identity: &dyn IdentityProvider, sync: CollectionSync, state: StateStore) -> Self {
        let receiver = identity.subscribe();
        let listener = SessionListener { sync, state };
        let handle = tokio::spawn(listener.run(receiver));
        info!(provider = identity.name(), "Session controller started");
        Self { handle }
    }

    /// Deregister from session notifications
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct SessionListener {
    sync: CollectionSync,
    state: StateStore,
}

impl SessionListener {
    async fn run(self, mut receiver: SessionReceiver) {
        loop {
            let user = receiver.borrow_and_update().clone();
            self.apply(user);

            if receiver.changed().await.is_err() {
                debug!("Session notifications closed");
                break;
            }
        }
    }

    fn apply(&self, user: Option<SessionUser>) {
        match user {
            Some(user) => {
                info!(uid = %user.uid, "Session present");
                let uid = user.uid.clone();
                self.state.update(|s| {
                    if s.uid() != Some(uid.as_str()) {
                        s.clear_collections();
                    }
                    s.session = Some(user);
                    s.sync_in_flight += 1;
                });

                let sync = self.sync.clone();
                let state = self.state.clone();
                tokio::spawn(async move {
                    if let Err(e) = sync.refresh_all(&uid).await {
                        warn!(uid = %uid, error = %e, "Initial collection refresh failed");
                    }
                    state.update(|s| s.sync_in_flight = s.sync_in_flight.saturating_sub(1));
                });
            }
            None => {
                info!("No session");
                self.state.update(|s| {
                    s.session = None;
                    s.clear_collections();
                });
            }
        }
    }
}
