use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::config::AppConfig;

use super::value;

const LIST_PAGE_SIZE: &str = "300";

#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// A Firestore document as returned by the REST API. `fields` holds typed
/// values; use [`Document::data`] for plain JSON.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Document {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default, rename = "createTime")]
    pub create_time: Option<String>,
    #[serde(default, rename = "updateTime")]
    pub update_time: Option<String>,
}

impl Document {
    /// Last path segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    pub fn data(&self) -> Map<String, Value> {
        value::fields_to_json(&self.fields)
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).map(value::to_json)
    }
}

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default, rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<Document>,
}

/// Firestore v1 REST client scoped to one project's default database.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FirestoreClient {
    /// `base_url` ends in `/documents`.
    pub fn new(http: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Build a client when a Firebase project is configured.
    pub fn from_config(http: Client, config: &AppConfig) -> Option<Self> {
        let base_url = config.firestore_base_url()?;
        let api_key = config.firebase.as_ref().and_then(|f| f.api_key.clone());
        Some(Self::new(http, base_url, api_key))
    }

    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, FirestoreError> {
        let url = self.url(&[collection, id])?;
        let resp = self.http.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(resp.error_for_status()?.json().await?))
    }

    /// Create or overwrite a document with the given plain-JSON fields.
    pub async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> Result<Document, FirestoreError> {
        let url = self.url(&[collection, id])?;
        let body = json!({ "fields": value::fields_from_json(data) });
        let resp = self
            .http
            .patch(url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Create a document with a server-assigned id.
    pub async fn create_document(
        &self,
        collection: &str,
        data: &Map<String, Value>,
    ) -> Result<Document, FirestoreError> {
        let url = self.url(&[collection])?;
        let body = json!({ "fields": value::fields_from_json(data) });
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Every document in a collection, following pagination.
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, FirestoreError> {
        let url = self.url(&[collection])?;
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut page_url = url.clone();
            page_url.query_pairs_mut().append_pair("pageSize", LIST_PAGE_SIZE);
            if let Some(token) = &page_token {
                page_url.query_pairs_mut().append_pair("pageToken", token);
            }

            let page: ListDocumentsResponse = self
                .http
                .get(page_url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            documents.extend(page.documents);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    /// Newest-first documents of a collection ordered by `order_by`.
    pub async fn run_query(
        &self,
        collection: &str,
        order_by: &str,
        limit: usize,
    ) -> Result<Vec<Document>, FirestoreError> {
        let url = self.parse(&format!("{}:runQuery", self.base_url.trim_end_matches('/')))?;
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "orderBy": [{ "field": { "fieldPath": order_by }, "direction": "DESCENDING" }],
                "limit": limit,
            }
        });

        let items: Vec<RunQueryItem> = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(items.into_iter().filter_map(|i| i.document).collect())
    }

    fn parse(&self, raw: &str) -> Result<Url, FirestoreError> {
        let mut url = Url::parse(raw)
            .map_err(|e| FirestoreError::Unexpected(format!("invalid url {raw}: {e}")))?;
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    /// Document or collection URL with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, FirestoreError> {
        let mut url = self.parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| FirestoreError::Unexpected(format!("base url cannot hold a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
