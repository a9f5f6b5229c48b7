// src/config/mod.rs
//! Registry lookup plus the env knobs the binary reads.

pub mod sources;

pub use sources::{Labels, Method, RecordKey, RecordSpec, Registry, SourceConfig};

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::source::SourceId;

// --- env defaults & names ---
pub const DEFAULT_SOURCES_CONFIG_PATH: &str = "config/sources.toml";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub const ENV_SOURCES_CONFIG_PATH: &str = "SOURCES_CONFIG_PATH";
pub const ENV_SOURCES_ONLY: &str = "SOURCES_ONLY";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";

/// Registry compiled into the binary, used when nothing is found on disk.
pub const BUILTIN_SOURCES: &str = include_str!("../../config/sources.toml");

pub fn load_registry_from(path: &Path) -> Result<Registry> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources registry from {}", path.display()))?;
    Registry::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
}

/// Load the registry using env var + fallbacks:
/// 1) $SOURCES_CONFIG_PATH
/// 2) config/sources.toml
/// 3) built-in copy
pub fn load_registry_default() -> Result<Registry> {
    if let Ok(p) = std::env::var(ENV_SOURCES_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_registry_from(&pb);
        } else {
            return Err(anyhow!("SOURCES_CONFIG_PATH points to non-existent path"));
        }
    }
    let local = PathBuf::from(DEFAULT_SOURCES_CONFIG_PATH);
    if local.exists() {
        return load_registry_from(&local);
    }
    tracing::debug!(target: "config", "using built-in sources registry");
    Registry::from_toml_str(BUILTIN_SOURCES)
}

/// Parse a comma-separated id list; empty items are skipped.
pub fn parse_only_list(raw: &str) -> Result<Vec<SourceId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<SourceId>())
        .collect()
}

/// `$SOURCES_ONLY`, if set and non-empty.
pub fn only_filter_from_env() -> Result<Option<Vec<SourceId>>> {
    match std::env::var(ENV_SOURCES_ONLY) {
        Ok(raw) => {
            let ids = parse_only_list(&raw).context("SOURCES_ONLY")?;
            Ok((!ids.is_empty()).then_some(ids))
        }
        Err(_) => Ok(None),
    }
}

// parse optional positive seconds; anything else falls back to the default
fn parse_timeout(raw: Option<String>) -> Duration {
    let secs = raw
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

pub fn http_timeout_from_env() -> Duration {
    parse_timeout(std::env::var(ENV_HTTP_TIMEOUT_SECS).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_list_parses_and_skips_blanks() {
        let ids = parse_only_list(" huji, ,BGU ").unwrap();
        assert_eq!(ids, vec![SourceId::Huji, SourceId::Bgu]);
        assert!(parse_only_list("HUJI,MIT").is_err());
    }

    #[test]
    fn timeout_defaults_on_garbage() {
        assert_eq!(parse_timeout(None), Duration::from_secs(30));
        assert_eq!(parse_timeout(Some("0".into())), Duration::from_secs(30));
        assert_eq!(parse_timeout(Some("abc".into())), Duration::from_secs(30));
        assert_eq!(parse_timeout(Some(" 5 ".into())), Duration::from_secs(5));
    }
}
