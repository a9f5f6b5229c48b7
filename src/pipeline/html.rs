// src/pipeline/html.rs
use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::extract::extract_lines_from_blocks;
use crate::reformat::{huji_lines, tech_lines};
use crate::source::SourceId;

use super::Source;

/// Scraped page: structural query, then sentence filtering.
pub struct HtmlSource {
    config: SourceConfig,
}

impl HtmlSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }
}

impl Source for HtmlSource {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn select(&self, body: &str) -> Result<Vec<String>, SourceError> {
        let blocks = match &self.config.query {
            Some(q) => q.select(body),
            None => Vec::new(),
        };
        tracing::debug!(target: "extract", source = %self.config.id, blocks = blocks.len(), "selected");
        Ok(blocks)
    }

    fn filter(&self, blocks: Vec<String>) -> Vec<String> {
        extract_lines_from_blocks(&blocks, &self.config.predicate)
    }

    fn reformat(&self, lines: Vec<String>) -> Result<Vec<String>, SourceError> {
        match self.config.id {
            SourceId::Huji => Ok(huji_lines(lines)),
            SourceId::Tech => tech_lines(&lines, &self.config.labels),
            SourceId::Tau | SourceId::Bgu => Ok(lines),
        }
    }
}
