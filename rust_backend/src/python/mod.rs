//! Python bindings for the dashboard pages.
//!
//! This module exposes the coordinate normalizer and the response flattener to
//! Python via PyO3, so Streamlit pages can call one shared implementation
//! instead of carrying their own copies.
//!
//! # Modules
//!
//! - [`coordinates`]: DMS to decimal-degree conversion
//! - [`records`]: Response flattening and chart series extraction
//!
//! Records cross the boundary as JSON strings.

pub mod coordinates;
pub mod records;

pub use coordinates::*;
pub use records::*;
