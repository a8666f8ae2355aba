//! Error taxonomy for coordinate parsing, response flattening and fetching.
//!
//! Every error here is a typed signal for the dashboard layer to present. None
//! of them carry a silently defaulted value.

use std::fmt;

/// Which part of a DMS string an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmsSegment {
    Degrees,
    Minutes,
    Seconds,
}

impl fmt::Display for DmsSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DmsSegment::Degrees => "degrees",
            DmsSegment::Minutes => "minutes",
            DmsSegment::Seconds => "seconds",
        };
        f.write_str(name)
    }
}

/// A DMS string that does not match `D-M-S.sssH`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedCoordinate {
    #[error("empty coordinate string")]
    Empty,

    #[error("coordinate '{input}' does not end with a hemisphere letter (N, S, E, W)")]
    MissingHemisphere { input: String },

    #[error("coordinate '{input}' has {found} dash-separated segments, expected 3")]
    SegmentCount { input: String, found: usize },

    #[error("coordinate '{input}': {segment} segment '{value}' is not a non-negative number")]
    InvalidSegment {
        input: String,
        segment: DmsSegment,
        value: String,
    },

    #[error("coordinate '{input}': {segment} value {value} is out of range")]
    OutOfRange {
        input: String,
        segment: DmsSegment,
        value: f64,
    },

    #[error("coordinate '{input}' is on the wrong axis for a {expected}")]
    WrongAxis { input: String, expected: &'static str },

    #[error("value '{input}' is neither a DMS string nor a decimal number")]
    NotACoordinate { input: String },
}

/// One element of a response that could not be read as a record.
///
/// `path` is a JSONPath-like locator (`$`, `$[2]`, `$.KPIT[0]`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed record at {path}: {reason}")]
pub struct MalformedRecord {
    pub path: String,
    pub reason: String,
}

impl MalformedRecord {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Failure while turning a RecordSet column pair into chart points.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("column '{0}' not present in record set")]
    MissingColumn(String),

    #[error("row {row}: column '{column}' holds non-numeric value '{value}'")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },
}

/// Configuration loading or validation failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No dashfeed.toml found in standard locations")]
    NotFound,
}

/// Failure to obtain a decoded JSON value from a data provider.
///
/// The flattener is never invoked when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("resource '{resource}' requires parameter '{param}'")]
    MissingParam { resource: String, param: String },

    #[error("transport error for '{resource}': {message}")]
    Transport { resource: String, message: String },

    #[error("'{resource}' returned HTTP {status}: {body}")]
    Status {
        resource: String,
        status: u16,
        body: String,
    },

    #[error("response from '{resource}' is not valid JSON: {message}")]
    Decode { resource: String, message: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;
