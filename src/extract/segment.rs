// src/extract/segment.rs
//! Sentence segmentation and per-source threshold predicates.

use regex::Regex;

use crate::source::SourceId;

/// Decides whether a sentence carries an admission threshold.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Keep every sentence; the structural query already isolates the value.
    Always,
    Pattern(Regex),
    /// Literal must appear in the sentence (freshness marker such as the academic year).
    Marker(String),
    PatternWithMarker { pattern: Regex, marker: String },
}

impl Predicate {
    pub fn new(pattern: Option<Regex>, marker: Option<String>) -> Self {
        match (pattern, marker) {
            (None, None) => Predicate::Always,
            (Some(pattern), None) => Predicate::Pattern(pattern),
            (None, Some(marker)) => Predicate::Marker(marker),
            (Some(pattern), Some(marker)) => Predicate::PatternWithMarker { pattern, marker },
        }
    }

    /// Predicate built from the source's default numeric shape.
    pub fn for_source(id: SourceId, marker: Option<String>) -> anyhow::Result<Self> {
        let pattern = id.default_pattern().map(Regex::new).transpose()?;
        Ok(Self::new(pattern, marker))
    }

    pub fn matches(&self, sentence: &str) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Pattern(re) => re.is_match(sentence),
            Predicate::Marker(m) => sentence.contains(m.as_str()),
            Predicate::PatternWithMarker { pattern, marker } => {
                sentence.contains(marker.as_str()) && pattern.is_match(sentence)
            }
        }
    }
}

fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Split on whitespace runs that directly follow `.`, `!` or `?`.
/// Sentences are returned untrimmed; a trailing run yields an empty last piece.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut prev: Option<char> = None;
    let mut iter = text.char_indices().peekable();

    while let Some((i, c)) = iter.next() {
        if c.is_whitespace() && prev.is_some_and(is_sentence_end) {
            out.push(&text[start..i]);
            let mut end = i + c.len_utf8();
            while let Some(&(j, w)) = iter.peek() {
                if !w.is_whitespace() {
                    break;
                }
                end = j + w.len_utf8();
                iter.next();
            }
            start = end;
            prev = None;
            continue;
        }
        prev = Some(c);
    }
    out.push(&text[start..]);
    out
}

/// Sentences of `text` accepted by `predicate`, trimmed, in order.
pub fn extract_lines(text: &str, predicate: &Predicate) -> Vec<String> {
    split_sentences(text)
        .into_iter()
        .filter(|s| predicate.matches(s))
        .map(|s| s.trim().to_string())
        .collect()
}

pub fn extract_lines_from_blocks<S: AsRef<str>>(blocks: &[S], predicate: &Predicate) -> Vec<String> {
    blocks
        .iter()
        .flat_map(|b| extract_lines(b.as_ref(), predicate))
        .collect()
}
