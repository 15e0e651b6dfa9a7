//! In-memory adapters for demo mode and tests
//!
//! - `InMemoryIdentityProvider`: email/password accounts with the same
//!   validation rules and messages as Firebase Authentication
//! - `InMemoryDocumentStore`: collections keyed by path, server-like
//!   timestamps, read/write counters
//! - `StaticQuoteProvider`: rotates through a fixed list of quotes

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value as JsonValue};
use tokio::sync::watch;
use uuid::Uuid;

use super::firebase_auth::describe_auth_error;
use crate::domain::result::{Error, Result};
use crate::domain::{Quote, SessionUser, StoredDocument};
use crate::ports::{DocumentStore, IdentityProvider, QuoteProvider, SessionReceiver};

/// Firebase's minimum password length
const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// Identity
// =============================================================================

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
}

/// Identity provider that keeps accounts in memory
pub struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    sessions: watch::Sender<Option<SessionUser>>,
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        let (sessions, _rx) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            sessions,
        }
    }

    /// Register an account without signing it in. Returns its uid.
    pub fn add_account(&self, email: &str, password: &str) -> Result<String> {
        validate_credentials(email, password)?;

        let mut accounts = self
            .accounts
            .lock()
            .map_err(|e| Error::auth(format!("Lock poisoned: {}", e)))?;

        let key = email.to_lowercase();
        if accounts.contains_key(&key) {
            return Err(Error::auth(describe_auth_error("EMAIL_EXISTS")));
        }

        let uid = Uuid::new_v4().simple().to_string();
        accounts.insert(
            key,
            Account {
                uid: uid.clone(),
                password: password.to_string(),
            },
        );
        Ok(uid)
    }

    fn publish(&self, user: Option<SessionUser>) {
        self.sessions.send_replace(user);
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.is_empty() {
        return Err(Error::auth(describe_auth_error("MISSING_EMAIL")));
    }
    let valid_email = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);
    if !valid_email {
        return Err(Error::auth(describe_auth_error("INVALID_EMAIL")));
    }
    if password.is_empty() {
        return Err(Error::auth(describe_auth_error("MISSING_PASSWORD")));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::auth(describe_auth_error("WEAK_PASSWORD")));
    }
    Ok(())
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn name(&self) -> &str {
        "demo"
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<SessionUser> {
        let uid = self.add_account(email, password)?;
        let user = SessionUser::new(uid, Some(email.to_string()));
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser> {
        if email.is_empty() {
            return Err(Error::auth(describe_auth_error("MISSING_EMAIL")));
        }
        if password.is_empty() {
            return Err(Error::auth(describe_auth_error("MISSING_PASSWORD")));
        }

        let account = {
            let accounts = self
                .accounts
                .lock()
                .map_err(|e| Error::auth(format!("Lock poisoned: {}", e)))?;
            accounts.get(&email.to_lowercase()).cloned()
        };

        match account {
            Some(account) if account.password == password => {
                let user = SessionUser::new(account.uid, Some(email.to_string()));
                self.publish(Some(user.clone()));
                Ok(user)
            }
            _ => Err(Error::auth(describe_auth_error("INVALID_LOGIN_CREDENTIALS"))),
        }
    }

    async fn sign_out(&self) -> Result<()> {
        self.publish(None);
        Ok(())
    }

    fn subscribe(&self) -> SessionReceiver {
        self.sessions.subscribe()
    }
}

// =============================================================================
// Document store
// =============================================================================

#[derive(Default)]
struct Collections {
    by_path: HashMap<String, Vec<StoredDocument>>,
    last_timestamp: Option<DateTime<Utc>>,
}

/// Document store that keeps collections in memory
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: Mutex<Collections>,
    writes: AtomicUsize,
    reads: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `add_document` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of `query_all` calls
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Documents currently in a collection, in insertion order
    pub fn documents(&self, collection_path: &str) -> Vec<StoredDocument> {
        self.collections
            .lock()
            .map(|c| c.by_path.get(collection_path).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Insert a document directly, as another client would. Not counted as a
    /// write.
    pub fn insert_raw(
        &self,
        collection_path: &str,
        fields: JsonValue,
        created_at: Option<DateTime<Utc>>,
    ) -> String {
        let id = Uuid::new_v4().simple().to_string();
        if let Ok(mut collections) = self.collections.lock() {
            collections
                .by_path
                .entry(collection_path.to_string())
                .or_default()
                .push(StoredDocument {
                    id: id.clone(),
                    fields: fields.as_object().cloned().unwrap_or_default(),
                    created_at,
                });
        }
        id
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::store("Document store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add_document(
        &self,
        collection_path: &str,
        fields: Map<String, JsonValue>,
    ) -> Result<String> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut collections = self
            .collections
            .lock()
            .map_err(|e| Error::store(format!("Lock poisoned: {}", e)))?;

        // Strictly increasing, like a server clock seen by one client
        let now = Utc::now();
        let created_at = match collections.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        collections.last_timestamp = Some(created_at);

        let id = Uuid::new_v4().simple().to_string();
        collections
            .by_path
            .entry(collection_path.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                fields,
                created_at: Some(created_at),
            });

        Ok(id)
    }

    async fn query_all(&self, collection_path: &str) -> Result<Vec<StoredDocument>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let collections = self
            .collections
            .lock()
            .map_err(|e| Error::store(format!("Lock poisoned: {}", e)))?;

        Ok(collections
            .by_path
            .get(collection_path)
            .cloned()
            .unwrap_or_default())
    }
}

// =============================================================================
// Quotes
// =============================================================================

/// Quote provider that rotates through a fixed list
pub struct StaticQuoteProvider {
    quotes: Vec<Quote>,
    next: AtomicUsize,
    requests: AtomicUsize,
}

impl StaticQuoteProvider {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self {
            quotes,
            next: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
        }
    }

    /// Provider with a handful of well-known quotes
    pub fn demo() -> Self {
        Self::new(vec![
            Quote::new("Be water, my friend.", "Bruce Lee"),
            Quote::new(
                "The journey of a thousand miles begins with one step.",
                "Lao Tzu",
            ),
            Quote::new("Well done is better than well said.", "Benjamin Franklin"),
            Quote::new("It always seems impossible until it's done.", "Nelson Mandela"),
            Quote::new("What we think, we become.", "Buddha"),
        ])
    }

    /// Number of `random_quote` calls
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for StaticQuoteProvider {
    fn name(&self) -> &str {
        "demo"
    }

    async fn random_quote(&self) -> Result<Quote> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.quotes.is_empty() {
            return Err(Error::quote_fetch("No quotes configured"));
        }
        let index = self.next.fetch_add(1, Ordering::SeqCst) % self.quotes.len();
        Ok(self.quotes[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identity_publishes_sessions() {
        let identity = InMemoryIdentityProvider::new();
        let rx = identity.subscribe();
        assert!(rx.borrow().is_none());

        let user = identity.create_account("a@example.com", "secret1").await.unwrap();
        assert_eq!(*rx.borrow(), Some(user));

        identity.sign_out().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn test_identity_rejects_duplicates_and_bad_input() {
        let identity = InMemoryIdentityProvider::new();
        identity.add_account("a@example.com", "secret1").unwrap();

        let dup = identity.create_account("A@example.com", "secret1").await.unwrap_err();
        assert_eq!(dup.to_string(), "Firebase: Error (auth/email-already-in-use).");

        let bad = identity.create_account("not-an-email", "secret1").await.unwrap_err();
        assert_eq!(bad.to_string(), "Firebase: Error (auth/invalid-email).");

        let wrong = identity.sign_in("a@example.com", "wrong-pass").await.unwrap_err();
        assert_eq!(wrong.to_string(), "Firebase: Error (auth/invalid-credential).");
        assert!(identity.subscribe().borrow().is_none());
    }

    #[tokio::test]
    async fn test_store_assigns_increasing_timestamps() {
        let store = InMemoryDocumentStore::new();
        store.add_document("users/u/favorites", Map::new()).await.unwrap();
        store.add_document("users/u/favorites", Map::new()).await.unwrap();

        let docs = store.query_all("users/u/favorites").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].created_at.unwrap() < docs[1].created_at.unwrap());
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn test_store_collections_are_isolated() {
        let store = InMemoryDocumentStore::new();
        store.add_document("users/u1/journals", Map::new()).await.unwrap();

        assert!(store.query_all("users/u2/journals").await.unwrap().is_empty());
        assert!(store.query_all("users/u1/favorites").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_static_quotes_rotate() {
        let provider = StaticQuoteProvider::new(vec![Quote::new("a", "A"), Quote::new("b", "B")]);
        assert_eq!(provider.random_quote().await.unwrap().quote, "a");
        assert_eq!(provider.random_quote().await.unwrap().quote, "b");
        assert_eq!(provider.random_quote().await.unwrap().quote, "a");
        assert_eq!(provider.request_count(), 3);
    }
}
