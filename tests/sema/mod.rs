//! Integration tests for the semantic analyzer.
//!
//! - `tests_resolution` - variable lookup, shadowing, builtins, `with` fallback
//! - `tests_attrs` - attribute sets, paths, merging and duplicate keys
//! - `tests_inherit` - both `inherit` forms in sets and `let`
//! - `tests_lambda` - arguments, formals and their defaults
//! - `tests_lints` - opt-in findings
//! - `tests_errors` - malformed trees and cancellation
//! - `tests_json` - JSON rendering of diagnostics

pub mod tests_errors;
pub mod tests_lambda;
pub mod tests_lints;
pub mod tests_resolution;
