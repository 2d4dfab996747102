//! Rule-based field extraction
//!
//! Every scalar field is decided by an ordered table of patterns where the
//! first match wins. Tools, safety warnings and error codes are accumulated
//! across all matching patterns.

mod fields;
mod rules;

pub use fields::{extract_fields, Difficulty, StructuredFields};
pub(crate) use rules::ci;
