//! Firestore client (REST API v1)
//!
//! Appends go through `documents:commit` with a single write that creates the
//! document under a client-generated id and sets `createdAt` to the server's
//! request time. Reads list a collection page by page.
//!
//! Firestore represents values as typed wrappers (`{"stringValue": "..."}`);
//! `encode_value` and `decode_value` convert them to and from plain JSON.
//!
//! API Documentation: https://firebase.google.com/docs/firestore/reference/rest

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{StoredDocument, CREATED_AT_FIELD};
use crate::ports::{AccessTokenSource, DocumentStore};

/// Firestore REST base URL
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

/// Documents requested per list call
const PAGE_SIZE: usize = 300;

// =============================================================================
// Value conversion
// =============================================================================

/// Plain JSON to a Firestore typed value
pub fn encode_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Null => json!({ "nullValue": null }),
        JsonValue::Bool(b) => json!({ "booleanValue": b }),
        JsonValue::Number(n) => match n.as_i64() {
            // int64 travels as a decimal string
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        JsonValue::String(s) => json!({ "stringValue": s }),
        JsonValue::Array(items) => {
            let values: Vec<JsonValue> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        JsonValue::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

pub fn encode_fields(fields: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

/// Firestore typed value to plain JSON
///
/// Timestamps and references become strings; geo points become
/// `{latitude, longitude}`. Unknown wrappers decode to `null`.
pub fn decode_value(value: &JsonValue) -> JsonValue {
    let Some(object) = value.as_object() else {
        return JsonValue::Null;
    };
    let Some((kind, inner)) = object.iter().next() else {
        return JsonValue::Null;
    };

    match kind.as_str() {
        "nullValue" => JsonValue::Null,
        "booleanValue" => inner.as_bool().map(JsonValue::Bool).unwrap_or(JsonValue::Null),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| inner.as_i64())
            .map(JsonValue::from)
            .unwrap_or(JsonValue::Null),
        "doubleValue" => inner.as_f64().map(JsonValue::from).unwrap_or(JsonValue::Null),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => JsonValue::Array(
            inner
                .get("values")
                .and_then(|v| v.as_array())
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => JsonValue::Object(
            inner
                .get("fields")
                .and_then(|f| f.as_object())
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => JsonValue::Null,
    }
}

pub fn decode_fields(fields: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect()
}

// =============================================================================
// API Models
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, JsonValue>,
}

impl RawDocument {
    fn into_stored(self) -> StoredDocument {
        let id = self.name.rsplit('/').next().unwrap_or_default().to_string();
        let created_at = self
            .fields
            .get(CREATED_AT_FIELD)
            .and_then(|v| v.get("timestampValue"))
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let mut fields = decode_fields(&self.fields);
        fields.remove(CREATED_AT_FIELD);

        StoredDocument {
            id,
            fields,
            created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

// =============================================================================
// Client
// =============================================================================

/// Project and endpoint for the Firestore client
#[derive(Debug, Clone)]
pub struct FirestoreSettings {
    pub project_id: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl FirestoreSettings {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            base_url: DEFAULT_FIRESTORE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Firestore document store
pub struct FirestoreStore {
    client: Client,
    settings: FirestoreSettings,
    tokens: Arc<dyn AccessTokenSource>,
}

impl FirestoreStore {
    pub fn new(settings: FirestoreSettings, tokens: Arc<dyn AccessTokenSource>) -> anyhow::Result<Self> {
        if settings.project_id.is_empty() {
            anyhow::bail!("Firebase project id cannot be empty");
        }

        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            settings,
            tokens,
        })
    }

    /// `projects/{p}/databases/(default)/documents`
    fn database_root(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.settings.project_id
        )
    }

    fn url(&self, suffix: &str) -> Result<Url> {
        let base = self.settings.base_url.trim_end_matches('/');
        Url::parse(&format!("{}/{}{}", base, self.database_root(), suffix))
            .map_err(|e| Error::config(format!("Invalid Firestore URL: {}", e)))
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.tokens.access_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn list_page(
        &self,
        collection_path: &str,
        page_token: Option<&str>,
    ) -> Result<ListResponse> {
        let mut url = self.url("")?;
        url.path_segments_mut()
            .map_err(|_| Error::config("Firestore URL cannot be a base"))?
            .extend(collection_path.split('/'));
        url.query_pairs_mut()
            .append_pair("pageSize", &PAGE_SIZE.to_string());
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }
        debug!(url = %url, "Listing documents");

        let request = self.authorize(self.client.get(url)).await?;
        let response = request.send().await.map_err(map_request_error)?;
        read_response(response).await
    }
}

async fn read_response<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await.map_err(map_request_error)?;

    if status.is_success() {
        return serde_json::from_str(&text)
            .map_err(|e| Error::store(format!("Unexpected Firestore response: {}", e)));
    }

    match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(envelope) if !envelope.error.message.is_empty() => Err(Error::store(format!(
            "{} ({})",
            envelope.error.message, envelope.error.status
        ))),
        _ => Err(Error::store(format!("Firestore error: HTTP {}", status.as_u16()))),
    }
}

fn map_request_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::store("Firestore request timed out")
    } else if error.is_connect() {
        Error::store("Unable to connect to Firestore")
    } else {
        Error::Http(error)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn add_document(
        &self,
        collection_path: &str,
        fields: Map<String, JsonValue>,
    ) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        let name = format!("{}/{}/{}", self.database_root(), collection_path, id);

        let body = json!({
            "writes": [{
                "update": {
                    "name": name,
                    "fields": encode_fields(&fields),
                },
                "updateTransforms": [{
                    "fieldPath": CREATED_AT_FIELD,
                    "setToServerValue": "REQUEST_TIME",
                }],
                "currentDocument": { "exists": false },
            }]
        });

        let url = self.url(":commit")?;
        debug!(url = %url, collection = collection_path, "Committing document");

        let request = self.authorize(self.client.post(url).json(&body)).await?;
        let response = request.send().await.map_err(map_request_error)?;
        let _: JsonValue = read_response(response).await?;

        Ok(id)
    }

    async fn query_all(&self, collection_path: &str) -> Result<Vec<StoredDocument>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(collection_path, page_token.as_deref()).await?;
            documents.extend(page.documents.into_iter().map(RawDocument::into_stored));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(documents)
    }
}
