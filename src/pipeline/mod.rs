// src/pipeline/mod.rs
//! Per-source pipeline: fetch → select → filter → reformat → report.

pub mod api;
pub mod html;

use anyhow::Result;
use async_trait::async_trait;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::config::{Registry, SourceConfig};
use crate::error::SourceError;
use crate::report::SourceReport;
use crate::source::{SourceId, SourceKind};
use crate::transport::{RawResponse, Transport};

pub use api::ApiSource;
pub use html::HtmlSource;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("source_fetch_total", "Fetch attempts per source.");
        describe_counter!(
            "source_errors_total",
            "Sources that ended in the sentinel report."
        );
        describe_counter!("source_lines_total", "Threshold lines reported.");
        describe_histogram!("source_extract_ms", "Extraction time in milliseconds.");
    });
}

/// A provider's extraction stages over an already-fetched body.
#[async_trait]
pub trait Source: Send + Sync {
    fn config(&self) -> &SourceConfig;

    fn id(&self) -> SourceId {
        self.config().id
    }

    async fn fetch(&self, transport: &dyn Transport) -> Result<RawResponse> {
        transport.fetch(self.config()).await
    }

    /// Candidate blocks: selected node text, or field values of the located record.
    fn select(&self, body: &str) -> Result<Vec<String>, SourceError>;

    fn filter(&self, blocks: Vec<String>) -> Vec<String>;

    fn reformat(&self, lines: Vec<String>) -> Result<Vec<String>, SourceError>;

    fn extract(&self, body: &str) -> Result<Vec<String>, SourceError> {
        let blocks = self.select(body)?;
        self.reformat(self.filter(blocks))
    }
}

pub fn build_source(config: SourceConfig) -> Arc<dyn Source> {
    match config.id.kind() {
        SourceKind::Html => Arc::new(HtmlSource::new(config)),
        SourceKind::Api => Arc::new(ApiSource::new(config)),
    }
}

pub fn build_sources(registry: &Registry) -> Vec<Arc<dyn Source>> {
    registry.sources.iter().cloned().map(build_source).collect()
}

/// Run one source end to end. `Err` only for transport failures.
pub async fn run_source(source: &dyn Source, transport: &dyn Transport) -> Result<SourceReport> {
    ensure_metrics_described();
    let id = source.id();
    counter!("source_fetch_total", "source" => id.as_str()).increment(1);

    let resp = match source.fetch(transport).await {
        Ok(r) => r,
        Err(e) => {
            counter!("source_errors_total", "source" => id.as_str()).increment(1);
            return Err(e);
        }
    };

    let t0 = std::time::Instant::now();
    let outcome = source.extract(&resp.body);
    histogram!("source_extract_ms", "source" => id.as_str())
        .record(t0.elapsed().as_secs_f64() * 1_000.0);

    match &outcome {
        Ok(lines) => {
            counter!("source_lines_total", "source" => id.as_str()).increment(lines.len() as u64);
            tracing::info!(
                target: "pipeline",
                source = %id,
                lines = lines.len(),
                status = resp.status,
                "source done"
            );
        }
        Err(e) => {
            counter!("source_errors_total", "source" => id.as_str()).increment(1);
            tracing::warn!(
                target: "pipeline",
                source = %id,
                error = %e,
                status = resp.status,
                "extraction failed"
            );
        }
    }

    Ok(SourceReport { source: id, outcome })
}

/// Run every source on its own task; reports come back in `sources` order.
/// A failing source only affects its own report.
pub async fn run_all(
    sources: Vec<Arc<dyn Source>>,
    transport: Arc<dyn Transport>,
) -> Vec<SourceReport> {
    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let transport = Arc::clone(&transport);
            let id = source.id();
            let handle =
                tokio::spawn(async move { run_source(source.as_ref(), transport.as_ref()).await });
            (id, handle)
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for (id, handle) in handles {
        let report = match handle.await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                tracing::error!(target: "pipeline", source = %id, error = ?e, "source fetch failed");
                SourceReport::failed(id, SourceError::Transport(format!("{e:#}")))
            }
            Err(e) => {
                tracing::error!(target: "pipeline", source = %id, error = %e, "source task aborted");
                SourceReport::failed(id, SourceError::Aborted(e.to_string()))
            }
        };
        reports.push(report);
    }
    reports
}
