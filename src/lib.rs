// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod reformat;
pub mod report;
pub mod source;
pub mod transport;

// ---- Re-exports for stable public API ----
pub use crate::config::{Registry, SourceConfig};
pub use crate::error::SourceError;
pub use crate::pipeline::{build_sources, run_all, run_source, Source};
pub use crate::report::{format_report, SourceReport, INTERNAL_SERVER_ERROR};
pub use crate::source::SourceId;
pub use crate::transport::{FixtureTransport, HttpTransport, RawResponse, Transport};

use std::sync::Arc;

/// Load the registry (env, disk, built-in), apply `$SOURCES_ONLY`, and run every
/// source over HTTP.
pub async fn run_from_env() -> anyhow::Result<Vec<SourceReport>> {
    let mut registry = config::load_registry_default()?;
    if let Some(ids) = config::only_filter_from_env()? {
        registry = registry.retain_ids(&ids);
    }
    let transport = HttpTransport::new(config::http_timeout_from_env())?;
    tracing::info!(
        target: "pipeline",
        sources = registry.sources.len(),
        timeout_secs = transport.timeout().as_secs(),
        "fetching admission thresholds"
    );
    Ok(run_all(build_sources(&registry), Arc::new(transport)).await)
}
