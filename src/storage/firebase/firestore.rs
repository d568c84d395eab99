//! Firestore REST document store.
//!
//! Documents travel in Firestore's typed value encoding: every JSON value is
//! wrapped as `{"stringValue": ..}`, `{"integerValue": ..}` and so on.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map, Value, json};

use super::{FirebaseConfig, google_error_message};
use crate::errors::StorageError;
use crate::storage::traits::{DocumentStore, IdentityHandle, Result, require_object};

/// Profile store backed by Cloud Firestore
pub struct FirestoreDocumentStore {
    http_client: reqwest::Client,
    config: FirebaseConfig,
}

impl FirestoreDocumentStore {
    pub fn new(http_client: reqwest::Client, config: FirebaseConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// Requests run as the owner when the identity provider issued a token
    fn authorized(
        &self,
        request: reqwest::RequestBuilder,
        owner: &IdentityHandle,
    ) -> reqwest::RequestBuilder {
        match owner.id_token.as_deref() {
            Some(id_token) => request.bearer_auth(id_token),
            None => request,
        }
    }

    /// Documents endpoint with each segment percent-encoded
    fn document_url(&self, segments: &[&str]) -> Result<url::Url> {
        let mut url = url::Url::parse(&self.config.documents_endpoint())
            .map_err(|e| StorageError::RequestFailed(format!("Invalid document URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| StorageError::RequestFailed("Document URL cannot be a base".to_string()))?
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl DocumentStore for FirestoreDocumentStore {
    async fn create_document(
        &self,
        collection: &str,
        owner: &IdentityHandle,
        payload: &Value,
    ) -> Result<()> {
        let fields = encode_fields(require_object(payload)?);
        let mut url = self.document_url(&[collection])?;
        url.query_pairs_mut().append_pair("documentId", &owner.uid);

        let request = self
            .http_client
            .post(url)
            .json(&json!({ "fields": fields }));
        let response = self
            .authorized(request, owner)
            .send()
            .await
            .map_err(|e| StorageError::RequestFailed(format!("Failed to send createDocument request: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = google_error_message(&body).unwrap_or(body);
        if status == StatusCode::CONFLICT {
            return Err(StorageError::AlreadyExists(format!("{}/{}", collection, owner.uid)));
        }
        Err(StorageError::RequestFailed(format!(
            "createDocument failed with status {}: {}",
            status, message
        )))
    }

    async fn get_document(
        &self,
        collection: &str,
        owner: &IdentityHandle,
    ) -> Result<Option<Value>> {
        let url = self.document_url(&[collection, owner.uid.as_str()])?;
        let response = self
            .authorized(self.http_client.get(url), owner)
            .send()
            .await
            .map_err(|e| StorageError::RequestFailed(format!("Failed to send getDocument request: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            let message = google_error_message(&body).unwrap_or(body);
            return Err(StorageError::RequestFailed(format!(
                "getDocument failed with status {}: {}",
                status, message
            )));
        }

        let document: Value = serde_json::from_str(&body)
            .map_err(|e| StorageError::SerializationFailed(format!("Failed to parse document: {}", e)))?;
        let fields = document
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Ok(Some(decode_fields(&fields)?))
    }
}

fn encode_fields(object: &Map<String, Value>) -> Map<String, Value> {
    object
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

/// Wrap a plain JSON value in Firestore's typed encoding
fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) if n.is_i64() || n.is_u64() => json!({ "integerValue": n.to_string() }),
        Value::Number(n) => json!({ "doubleValue": n }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(object) => json!({ "mapValue": { "fields": encode_fields(object) } }),
    }
}

fn decode_fields(fields: &Map<String, Value>) -> Result<Value> {
    let mut object = Map::new();
    for (key, value) in fields {
        object.insert(key.clone(), decode_value(value)?);
    }
    Ok(Value::Object(object))
}

/// Inverse of [`encode_value`]
fn decode_value(value: &Value) -> Result<Value> {
    let invalid = || StorageError::InvalidData(format!("unsupported Firestore value: {}", value));
    let (kind, inner) = value
        .as_object()
        .and_then(|object| object.iter().next())
        .ok_or_else(invalid)?;

    Ok(match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "doubleValue" | "stringValue" | "timestampValue" | "referenceValue" => {
            inner.clone()
        }
        "integerValue" => {
            let n: i64 = inner
                .as_str()
                .and_then(|s| s.parse().ok())
                .or_else(|| inner.as_i64())
                .ok_or_else(invalid)?;
            Value::from(n)
        }
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect::<Result<Vec<_>>>())
                .transpose()?
                .unwrap_or_default();
            Value::Array(items)
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            decode_fields(&fields)?
        }
        _ => return Err(invalid()),
    })
}
