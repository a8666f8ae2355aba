//! Transformations from record sets into chart and map inputs.
//!
//! # Modules
//!
//! - [`series`]: Labelled numeric points for line, area and bar charts
//! - [`locations`]: Map pins from DMS or decimal coordinate columns

pub mod locations;
pub mod series;

pub use locations::{locations, LocationColumns, Located, MapPin};
pub use series::{series, SeriesPoint};
