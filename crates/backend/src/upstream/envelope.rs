use serde_json::Value;

use super::client::UpstreamError;

/// Wrapper keys the upstream has been observed to nest record arrays under.
/// The v2 endpoints are not consistent about this, so every one is tried.
const RECORD_KEYS: [&str; 5] = ["result", "data", "records", "disbursals", "items"];

/// Wrapper keys observed on the collection metrics endpoint.
const METRIC_KEYS: [&str; 3] = ["data", "result", "metrics"];

/// True when an upstream `message` string describes a failure rather than
/// a success note like "Data fetched successfully!".
pub fn is_error_message(message: &str) -> bool {
    let msg = message.to_lowercase();
    msg.contains("not found")
        || msg.contains("error")
        || msg.contains("invalid")
        || msg.contains("failed")
        || msg.contains("not authorised")
        || msg.contains("unauthorized")
}

fn authorisation_failure(message: &str) -> bool {
    let msg = message.to_lowercase();
    msg.contains("not authorised") || msg.contains("unauthorized")
}

/// Extract the error text an upstream payload carries, if any.
/// The upstream spells it `message`, `error` or `msg` depending on endpoint.
pub fn error_text(payload: &Value) -> Option<String> {
    let obj = payload.as_object()?;
    for key in ["message", "error", "msg"] {
        if let Some(text) = obj.get(key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }
    None
}

/// Unwrap a record-list payload. Accepts a bare array, or an object with
/// the array under any of the known wrapper keys. An object that carries
/// an error message is reported as such; anything unrecognized is empty.
pub fn extract_records(payload: Value) -> Result<Vec<Value>, UpstreamError> {
    match payload {
        Value::Array(records) => Ok(records),
        Value::Object(ref obj) => {
            for key in RECORD_KEYS {
                if let Some(Value::Array(records)) = obj.get(key) {
                    return Ok(records.clone());
                }
            }
            // No record array: an errorish message or an `error` key
            // means the upstream actually failed
            if let Some(message) = error_text(&payload) {
                if authorisation_failure(&message) {
                    return Err(UpstreamError::NotAuthorised);
                }
                if obj.contains_key("error") || is_error_message(&message) {
                    return Err(UpstreamError::Upstream(message));
                }
            }
            tracing::warn!("No record array found in upstream payload, keys: {:?}", {
                obj.keys().collect::<Vec<_>>()
            });
            Ok(Vec::new())
        }
        other => {
            tracing::warn!("Unexpected upstream payload type: {}", type_name(&other));
            Ok(Vec::new())
        }
    }
}

/// Unwrap the collection-metrics payload into reconcilable rows.
///
/// Observed shapes: a bare row object, a bare array of rows, or an object
/// nesting either under `data`/`result`/`metrics`. Error payloads yield no
/// rows; the metrics block degrades to zeros rather than failing the page.
pub fn extract_metric_rows(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(rows) => rows,
        Value::Object(obj) => {
            if let Some(Value::String(message)) = obj.get("error") {
                tracing::warn!("Collection metrics upstream error: {}", message);
                return Vec::new();
            }
            if let Some(message) = obj.get("message").and_then(Value::as_str) {
                if is_error_message(message) {
                    tracing::warn!("Collection metrics upstream error: {}", message);
                    return Vec::new();
                }
            }

            for key in METRIC_KEYS {
                match obj.get(key) {
                    Some(Value::Array(rows)) => return rows.clone(),
                    Some(Value::Object(row)) => return vec![Value::Object(row.clone())],
                    _ => {}
                }
            }

            // No wrapper key: the object itself is the metrics row
            vec![Value::Object(obj)]
        }
        _ => Vec::new(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_records_bare_array() {
        let records = extract_records(json!([{"state": "Delhi"}])).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_extract_records_tries_wrapper_keys() {
        for key in ["result", "data", "records", "disbursals", "items"] {
            let payload = json!({ key: [{"a": 1}, {"a": 2}] });
            let records = extract_records(payload).unwrap();
            assert_eq!(records.len(), 2, "failed for wrapper key {key}");
        }
    }

    #[test]
    fn test_extract_records_success_message_with_data() {
        let records = extract_records(json!({
            "success": true,
            "message": "Data fetched successfully!",
            "data": [{"a": 1}]
        }))
        .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_extract_records_error_message() {
        let err = extract_records(json!({"message": "something failed"})).unwrap_err();
        assert!(matches!(err, UpstreamError::Upstream(_)));
    }

    #[test]
    fn test_extract_records_not_authorised() {
        let err = extract_records(json!({"message": "not authorised"})).unwrap_err();
        assert!(matches!(err, UpstreamError::NotAuthorised));
    }

    #[test]
    fn test_extract_records_unknown_shape_is_empty() {
        assert!(extract_records(json!({"foo": 1})).unwrap().is_empty());
        assert!(extract_records(json!(42)).unwrap().is_empty());
    }

    #[test]
    fn test_extract_metric_rows_nested_list() {
        let rows = extract_metric_rows(json!({
            "success": true,
            "message": "Data fetched successfully!",
            "data": [{"total": 10}, {"total": 5}]
        }));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_extract_metric_rows_nested_object() {
        let rows = extract_metric_rows(json!({"result": {"total_collection_amount": 9}}));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_extract_metric_rows_bare_object() {
        let rows = extract_metric_rows(json!({"total_collection_amount": 100}));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_extract_metric_rows_error_is_empty() {
        assert!(extract_metric_rows(json!({"message": "not authorised"})).is_empty());
        assert!(extract_metric_rows(json!({"error": "boom"})).is_empty());
    }
}
