//! Shared utility functions for strategy-brain.
//!
//! JSON object recovery from LLM responses and lenient readers over the
//! recovered maps.

pub mod json_extraction;
pub mod structured;

pub use json_extraction::{
    extract_structured, find_fenced_block, find_matching_brace, find_outer_object,
    parse_candidate, JsonExtractionError,
};
pub use structured::{from_map_strict, FromStructured, StructuredMap};
