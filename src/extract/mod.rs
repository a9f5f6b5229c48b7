// src/extract/mod.rs
//! Candidate selection and sentence filtering shared by every source.

pub mod segment;
pub mod select;

pub use segment::{extract_lines, extract_lines_from_blocks, split_sentences, Predicate};
pub use select::{CompiledQuery, StructuralQuery};
