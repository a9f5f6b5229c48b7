// src/pipeline/api.rs
use serde_json::Value;

use crate::config::{RecordSpec, SourceConfig};
use crate::error::SourceError;
use crate::reformat::{bgu_line, tau_fragments, tau_lines};
use crate::source::SourceId;

use super::Source;

/// JSON API: decode, locate one record, reformat its fields.
pub struct ApiSource {
    config: SourceConfig,
}

impl ApiSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    fn record_spec(&self) -> Result<&RecordSpec, SourceError> {
        self.config
            .record
            .as_ref()
            .ok_or_else(|| SourceError::MissingRecord(format!("{}: no record spec", self.config.id)))
    }
}

fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The record `spec` points at inside a decoded response.
pub fn locate_record<'a>(doc: &'a Value, spec: &RecordSpec) -> Result<&'a Value, SourceError> {
    let items = doc
        .pointer(&spec.path)
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::MissingRecord(format!("no list at {}", spec.path)))?;

    match &spec.key {
        Some(key) => items
            .iter()
            .find(|it| {
                it.get(&key.field)
                    .and_then(value_text)
                    .is_some_and(|v| v == key.value)
            })
            .ok_or_else(|| SourceError::MissingRecord(format!("{} = {}", key.field, key.value))),
        None => items
            .first()
            .ok_or_else(|| SourceError::MissingRecord(format!("{} is empty", spec.path))),
    }
}

impl Source for ApiSource {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn select(&self, body: &str) -> Result<Vec<String>, SourceError> {
        let doc: Value =
            serde_json::from_str(body).map_err(|e| SourceError::MalformedJson(e.to_string()))?;
        let spec = self.record_spec()?;
        let record = locate_record(&doc, spec)?;

        spec.fields
            .iter()
            .map(|f| {
                record
                    .get(f)
                    .and_then(value_text)
                    .ok_or_else(|| SourceError::MissingField(f.clone()))
            })
            .collect()
    }

    fn filter(&self, blocks: Vec<String>) -> Vec<String> {
        match self.config.id {
            SourceId::Tau => blocks.iter().flat_map(|b| tau_fragments(b)).collect(),
            _ => blocks,
        }
    }

    fn reformat(&self, lines: Vec<String>) -> Result<Vec<String>, SourceError> {
        match self.config.id {
            SourceId::Tau => Ok(tau_lines(lines)),
            SourceId::Bgu => Ok(vec![bgu_line(&lines, &self.config.labels)?]),
            SourceId::Huji | SourceId::Tech => Ok(lines),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RecordKey, Registry};
    use serde_json::json;

    fn source(id: SourceId) -> ApiSource {
        let reg = Registry::parse(crate::config::BUILTIN_SOURCES, 2026).unwrap();
        ApiSource::new(reg.get(id).unwrap().clone())
    }

    #[test]
    fn bgu_first_item() {
        let body = json!({"items": [
            {"psycho_sekem": "570", "psycho_and_or": " and ", "psycho_value": "630"},
            {"psycho_sekem": "1", "psycho_and_or": "or", "psycho_value": "2"}
        ]})
        .to_string();
        let out = source(SourceId::Bgu).extract(&body).unwrap();
        assert_eq!(out, vec!["Threshold: 570 and Psychometric: 630"]);
    }

    #[test]
    fn bgu_empty_items_is_missing_record() {
        let err = source(SourceId::Bgu).extract(r#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, SourceError::MissingRecord(_)));
    }

    #[test]
    fn bgu_missing_field() {
        let body = r#"{"items": [{"psycho_sekem": "570", "psycho_value": "630"}]}"#;
        let err = source(SourceId::Bgu).extract(body).unwrap_err();
        assert_eq!(err, SourceError::MissingField("psycho_and_or".into()));
    }

    #[test]
    fn malformed_json_is_recoverable() {
        let err = source(SourceId::Tau).extract("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, SourceError::MalformedJson(_)));
    }

    #[test]
    fn tau_keyed_record() {
        let body = json!({"data": {"getPrograms": {"results": [
            {"nid": "1000", "field_registration_comments": "<p>other 100.00</p>"},
            {"nid": "8215", "field_registration_comments": "<p>Intro</p><p>Threshold 731.25</p>"}
        ]}}})
        .to_string();
        let out = source(SourceId::Tau).extract(&body).unwrap();
        assert_eq!(out, vec!["Threshold 731.25"]);
    }

    #[test]
    fn numeric_key_values_compare_as_text() {
        let doc = json!({"list": [{"nid": 8215, "x": "y"}]});
        let spec = RecordSpec {
            path: "/list".into(),
            key: Some(RecordKey {
                field: "nid".into(),
                value: "8215".into(),
            }),
            fields: vec!["x".into()],
        };
        assert_eq!(locate_record(&doc, &spec).unwrap()["x"], json!("y"));
    }
}
