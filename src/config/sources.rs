// src/config/sources.rs
//! Registry schema (TOML) and its validated, ready-to-run form.

use anyhow::{anyhow, bail, Context, Result};
use chrono::Datelike;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use crate::extract::{CompiledQuery, Predicate, StructuralQuery};
use crate::source::{SourceId, SourceKind};

pub const NEXT_YEAR_PLACEHOLDER: &str = "${NEXT_YEAR}";
pub const CURRENT_YEAR_PLACEHOLDER: &str = "${CURRENT_YEAR}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordKey {
    pub field: String,
    pub value: String,
}

/// Where the relevant record lives in an API response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordSpec {
    /// JSON pointer to the result list, e.g. `/data/getPrograms/results`.
    pub path: String,
    /// Match on a field; without a key the first item is taken.
    #[serde(default)]
    pub key: Option<RecordKey>,
    pub fields: Vec<String>,
}

fn default_threshold_label() -> String {
    "Threshold: ".to_string()
}
fn default_psychometric_label() -> String {
    " Psychometric: ".to_string()
}
fn default_separator() -> String {
    ": ".to_string()
}

/// Fixed text the reformatters splice around extracted values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Labels {
    #[serde(default = "default_threshold_label")]
    pub threshold: String,
    #[serde(default = "default_psychometric_label")]
    pub psychometric: String,
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            threshold: default_threshold_label(),
            psychometric: default_psychometric_label(),
            separator: default_separator(),
        }
    }
}

/* ----------------------------
Raw schema (from TOML)
---------------------------- */

#[derive(Debug, Deserialize)]
struct RegistryRoot {
    #[serde(rename = "source", default)]
    sources: Vec<SourceEntry>,
}

#[derive(Debug, Deserialize)]
struct SourceEntry {
    id: SourceId,
    url: String,
    method: Method,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    payload: Option<String>,
    #[serde(default)]
    query: Option<StructuralQuery>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    year_marker: Option<String>,
    #[serde(default)]
    record: Option<RecordSpec>,
    #[serde(default)]
    labels: Labels,
}

/* ----------------------------
Validated form
---------------------------- */

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub id: SourceId,
    pub url: String,
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub payload: Option<Value>,
    pub query: Option<CompiledQuery>,
    /// Sentence filter for scraped pages. API sources always carry `Predicate::Always`.
    pub predicate: Predicate,
    pub record: Option<RecordSpec>,
    pub labels: Labels,
}

#[derive(Debug, Clone)]
pub struct Registry {
    pub sources: Vec<SourceConfig>,
}

fn fill_placeholders(v: &mut Value, year: i32) {
    match v {
        Value::String(s) if s.contains("${") => {
            *s = s
                .replace(NEXT_YEAR_PLACEHOLDER, &(year + 1).to_string())
                .replace(CURRENT_YEAR_PLACEHOLDER, &year.to_string());
        }
        Value::Array(items) => items.iter_mut().for_each(|x| fill_placeholders(x, year)),
        Value::Object(map) => map.values_mut().for_each(|x| fill_placeholders(x, year)),
        _ => {}
    }
}

impl SourceEntry {
    fn validate(self, year: i32) -> Result<SourceConfig> {
        let id = self.id;
        let kind = id.kind();

        match (kind, self.method) {
            (SourceKind::Html, Method::Get) | (SourceKind::Api, Method::Post) => {}
            (k, m) => bail!("{id}: method {m:?} does not fit a {k:?} source"),
        }

        let query = match (kind, &self.query) {
            (SourceKind::Html, Some(q)) => {
                Some(CompiledQuery::compile(q).with_context(|| format!("{id}: query"))?)
            }
            (SourceKind::Html, None) => bail!("{id}: HTML source needs a `query`"),
            (SourceKind::Api, _) => None,
        };

        let payload = match (kind, self.payload.as_deref()) {
            (SourceKind::Api, Some(raw)) => {
                let mut v: Value = serde_json::from_str(raw)
                    .with_context(|| format!("{id}: payload is not valid JSON"))?;
                fill_placeholders(&mut v, year);
                Some(v)
            }
            (SourceKind::Api, None) => bail!("{id}: API source needs a `payload`"),
            (SourceKind::Html, _) => None,
        };

        let record = match (kind, self.record) {
            (SourceKind::Api, Some(r)) if r.fields.is_empty() => {
                bail!("{id}: `record.fields` must not be empty")
            }
            (SourceKind::Api, Some(r)) => Some(r),
            (SourceKind::Api, None) => bail!("{id}: API source needs a `record`"),
            (SourceKind::Html, _) => None,
        };

        let predicate = match kind {
            SourceKind::Html => {
                let pattern = self
                    .pattern
                    .as_deref()
                    .or(id.default_pattern())
                    .map(Regex::new)
                    .transpose()
                    .with_context(|| format!("{id}: pattern"))?;
                let marker = self.year_marker.filter(|m| !m.is_empty());
                Predicate::new(pattern, marker)
            }
            SourceKind::Api if self.pattern.is_some() || self.year_marker.is_some() => {
                bail!("{id}: `pattern` and `year_marker` only apply to HTML sources")
            }
            SourceKind::Api => Predicate::Always,
        };

        Ok(SourceConfig {
            id,
            url: self.url,
            method: self.method,
            headers: self.headers,
            payload,
            query,
            predicate,
            record,
            labels: self.labels,
        })
    }
}

impl Registry {
    /// Parse and validate a registry, resolving year placeholders against `year`.
    pub fn parse(s: &str, year: i32) -> Result<Self> {
        let root: RegistryRoot = toml::from_str(s).context("parsing sources registry")?;
        if root.sources.is_empty() {
            return Err(anyhow!("sources registry lists no sources"));
        }

        let mut seen = HashSet::new();
        let mut sources = Vec::with_capacity(root.sources.len());
        for entry in root.sources {
            if !seen.insert(entry.id) {
                bail!("duplicate source id {}", entry.id);
            }
            sources.push(entry.validate(year)?);
        }
        Ok(Self { sources })
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Self::parse(s, chrono::Local::now().year())
    }

    /// Keep only `ids`, preserving registry order.
    pub fn retain_ids(mut self, ids: &[SourceId]) -> Self {
        self.sources.retain(|s| ids.contains(&s.id));
        self
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.id == id)
    }
}
