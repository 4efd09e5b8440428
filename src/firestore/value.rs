//! Conversion between Firestore REST typed values and plain JSON.
//!
//! Firestore wraps every value in a single-key object naming its type, e.g.
//! `{"integerValue": "42"}` or `{"mapValue": {"fields": {...}}}`.

use serde_json::{json, Map, Number, Value};

/// Decode one typed value into plain JSON. Unknown shapes decode to `null`.
pub fn to_json(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };

    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => inner.as_bool().map(Value::Bool).unwrap_or(Value::Null),
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or(Value::Null),
            Value::Number(n) => Value::Number(n.clone()),
            _ => Value::Null,
        },
        "doubleValue" => inner
            .as_f64()
            .or_else(|| inner.as_str().and_then(|s| s.parse().ok()))
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => json!({
            "latitude": inner.get("latitude").cloned().unwrap_or(Value::Null),
            "longitude": inner.get("longitude").cloned().unwrap_or(Value::Null),
        }),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(to_json).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(fields_to_json)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

/// Decode a document's `fields` map.
pub fn fields_to_json(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), to_json(v)))
        .collect()
}

/// Encode plain JSON as a typed value.
pub fn from_json(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or(0.0) }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(from_json).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": fields_from_json(map) } }),
    }
}

/// Encode a JSON object as a document's `fields` map.
pub fn fields_from_json(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), from_json(v)))
        .collect()
}
