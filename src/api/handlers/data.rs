use anyhow::anyhow;
use axum::extract::State;
use axum::Json;
use serde_json::{Map, Value};

use crate::cache::keys;
use crate::errors::AppError;
use crate::firestore::{Document, FirestoreError};
use crate::AppState;

/// Every document of the configured collection as `{id, ...fields}`.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let documents = state
        .documents
        .as_ref()
        .ok_or_else(|| anyhow!("no Firebase project configured"))?;
    let collection = state.config.data_collection.as_str();

    let rows = state
        .cache
        .get_or_fetch(keys::FIRESTORE_DATA, || async {
            let docs = documents.list_documents(collection).await?;
            tracing::debug!(collection, count = docs.len(), "loaded documents");
            Ok::<_, FirestoreError>(docs.iter().map(flatten).collect::<Vec<_>>())
        })
        .await?;

    Ok(Json(rows))
}

fn flatten(doc: &Document) -> Value {
    let mut row = Map::new();
    row.insert("id".into(), Value::String(doc.id().to_string()));
    row.extend(doc.data());
    Value::Object(row)
}
