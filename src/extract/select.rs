// src/extract/select.rs
//! Structural queries over parsed HTML.
//!
//! A query names container elements (`scope`), optionally narrowed by a direct child
//! (`child`, `child_text`), and optionally descends into them for the candidate
//! nodes (`target`, `target_text`). This covers the XPath shapes the sites need,
//! e.g. `//tr[td[contains(text(), 'X')]]//td[@class='column-2']`.

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StructuralQuery {
    pub scope: String,
    #[serde(default)]
    pub child: Option<String>,
    #[serde(default)]
    pub child_text: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub target_text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompiledQuery {
    scope: Selector,
    child: Option<Selector>,
    child_text: Option<String>,
    target: Option<Selector>,
    target_text: Option<String>,
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector `{css}`: {e}"))
}

/// Text of the element's own text-node children.
fn own_text(el: &ElementRef<'_>) -> String {
    el.children()
        .filter_map(|n| n.value().as_text().map(|t| String::from(&**t)))
        .collect()
}

impl CompiledQuery {
    pub fn compile(q: &StructuralQuery) -> Result<Self> {
        Ok(Self {
            scope: parse_selector(&q.scope)?,
            child: q.child.as_deref().map(parse_selector).transpose()?,
            child_text: q.child_text.clone(),
            target: q.target.as_deref().map(parse_selector).transpose()?,
            target_text: q.target_text.clone(),
        })
    }

    fn container_matches(&self, el: &ElementRef<'_>) -> bool {
        if self.child.is_none() && self.child_text.is_none() {
            return true;
        }
        el.children().filter_map(ElementRef::wrap).any(|c| {
            self.child.as_ref().map_or(true, |s| s.matches(&c))
                && self
                    .child_text
                    .as_deref()
                    .map_or(true, |t| own_text(&c).contains(t))
        })
    }

    fn target_matches(&self, el: &ElementRef<'_>) -> bool {
        self.target_text
            .as_deref()
            .map_or(true, |t| own_text(el).contains(t))
    }

    /// Text content of every matched node, in document order. No match is an empty Vec.
    pub fn select(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        let mut hits = HashSet::new();
        for container in document.select(&self.scope) {
            if !self.container_matches(&container) {
                continue;
            }
            match &self.target {
                Some(target) => {
                    for el in container.select(target) {
                        if self.target_matches(&el) {
                            hits.insert(el.id());
                        }
                    }
                }
                None => {
                    if self.target_matches(&container) {
                        hits.insert(container.id());
                    }
                }
            }
        }

        if hits.is_empty() {
            return Vec::new();
        }

        document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| hits.contains(&el.id()))
            .map(|el| el.text().collect::<String>())
            .collect()
    }
}
