use crate::client::DataServiceClient;
use crate::errors::Result;
use crate::types::{ViewKind, ViewOptions};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where a raw payload comes from.
#[derive(Debug, Clone)]
pub enum PayloadSource {
    File(PathBuf),
    Service(DataServiceClient),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub source: String,
    /// `object`, `array`, or the JSON type found instead.
    pub top_level: &'static str,
    /// Length of the top-level list, or of the envelope's list field.
    pub items: usize,
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn item_count(v: &Value) -> usize {
    match v {
        Value::Array(items) => items.len(),
        Value::Object(map) => map
            .values()
            .find_map(|field| field.as_array().map(Vec::len))
            .unwrap_or(0),
        _ => 0,
    }
}

fn describe(source: String, payload: &Value) -> LoadReport {
    LoadReport {
        source,
        top_level: json_type(payload),
        items: item_count(payload),
    }
}

/// Read a payload saved as JSON on disk.
pub fn load_file(path: &Path) -> Result<(Value, LoadReport)> {
    let text = std::fs::read_to_string(path)?;
    let payload: Value = serde_json::from_str(&text)?;
    let report = describe(path.display().to_string(), &payload);
    info!(source = %report.source, items = report.items, "payload loaded");
    Ok((payload, report))
}

/// Load the payload for one view from `source`.
pub fn load_payload(
    source: &PayloadSource,
    kind: ViewKind,
    options: &ViewOptions,
) -> Result<(Value, LoadReport)> {
    match source {
        PayloadSource::File(path) => load_file(path),
        PayloadSource::Service(client) => {
            let payload = client.fetch(kind, options)?;
            let report = describe(format!("service:{}", kind), &payload);
            info!(source = %report.source, items = report.items, "payload loaded");
            Ok((payload, report))
        }
    }
}

/// File expected for `kind` inside a directory of saved payloads.
pub fn payload_file(dir: &Path, kind: ViewKind) -> PathBuf {
    dir.join(format!("{}.json", kind.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_and_describes_enveloped_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = payload_file(dir.path(), ViewKind::Geography);
        std::fs::write(&path, r#"{"data": [{"job_state": "WA", "job_count": 3}]}"#).unwrap();
        let (payload, report) = load_file(&path).unwrap();
        assert_eq!(payload["data"][0]["job_state"], "WA");
        assert_eq!(report.top_level, "object");
        assert_eq!(report.items, 1);
        assert!(path.ends_with("geo.json"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"data\": [").unwrap();
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().starts_with("invalid JSON"));
    }

    #[test]
    fn describes_bare_lists() {
        let report = describe("test".into(), &json!([1, 2, 3]));
        assert_eq!(report.top_level, "array");
        assert_eq!(report.items, 3);
    }
}
