// src/source.rs
//! Closed set of admission-data providers and their built-in matching shapes.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// One of the four university admission-data providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum SourceId {
    /// Tel Aviv University (GraphQL API).
    Tau,
    /// Hebrew University (HTML page).
    Huji,
    /// Technion (HTML table).
    Tech,
    /// Ben-Gurion University (JSON API).
    Bgu,
}

/// How a source publishes its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Html,
    Api,
}

impl SourceId {
    pub const ALL: [SourceId; 4] = [SourceId::Huji, SourceId::Tech, SourceId::Tau, SourceId::Bgu];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Tau => "TAU",
            SourceId::Huji => "HUJI",
            SourceId::Tech => "TECH",
            SourceId::Bgu => "BGU",
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceId::Huji | SourceId::Tech => SourceKind::Html,
            SourceId::Tau | SourceId::Bgu => SourceKind::Api,
        }
    }

    /// Numeric shape a sentence must contain, unless the registry overrides it.
    /// `None` means every sentence is kept.
    pub fn default_pattern(&self) -> Option<&'static str> {
        match self {
            SourceId::Tau => Some(r"\b\d{3}\.\d{2}\b"),
            SourceId::Huji => Some(r"\b\d{2}\.\d{3}\b"),
            SourceId::Tech => None,
            SourceId::Bgu => Some(r"\d{3}\b"),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        SourceId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(t))
            .ok_or_else(|| anyhow::anyhow!("unknown source id `{t}`"))
    }
}

impl TryFrom<String> for SourceId {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
