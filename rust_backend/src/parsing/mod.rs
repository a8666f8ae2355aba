//! Parsers for raw provider data.
//!
//! This module turns the loosely-shaped values third-party APIs hand back into
//! typed, uniform structures.
//!
//! # Parsers
//!
//! - [`dms`]: Convert degrees-minutes-seconds strings to decimal degrees
//! - [`flatten`]: Normalize arbitrary JSON responses into key-aligned record sets
//!
//! # Example
//!
//! ```
//! use dashfeed::parsing::{flatten, parse_dms};
//! use serde_json::json;
//!
//! let lat = parse_dms("40-26-46.00N").expect("valid coordinate");
//! let flat = flatten(&json!({"KPIT": [{"id": "KPIT"}]}));
//! assert_eq!(flat.records.len(), 1);
//! # let _ = lat;
//! ```

pub mod dms;
pub mod flatten;

#[cfg(test)]
mod flatten_tests;

pub use dms::{parse_dms, parse_dms_on_axis, Dms};
pub use flatten::{flatten, Flattened, Flattener};
