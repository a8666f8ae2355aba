//! Core domain models and error types.
//!
//! This module defines the value types shared across the crate (coordinates,
//! scalars, records, record sets) and the typed error taxonomy every parser and
//! loader reports through.

pub mod domain;
pub mod error;

pub use domain::{Axis, GeoCoordinate, Hemisphere, Record, RecordSet, Scalar};
pub use error::{ConfigError, FetchError, MalformedCoordinate, MalformedRecord, SeriesError};
