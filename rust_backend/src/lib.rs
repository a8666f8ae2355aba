//! # dashfeed
//!
//! Shared data core for the aviation and football dashboards.
//!
//! The dashboards fetch JSON from third-party REST APIs and render it as
//! tables, charts and map overlays. This crate owns everything between the
//! HTTP response and the widget: decoding, shape normalization, coordinate
//! conversion and chart/map extraction. Rendering stays in the dashboard
//! layer.
//!
//! ## Architecture
//!
//! - [`core`]: Domain types (`Record`, `RecordSet`, `GeoCoordinate`) and errors
//! - [`parsing`]: DMS coordinate parser and JSON response flattener
//! - [`transformations`]: Chart series and map pins from record sets
//! - [`config`]: TOML provider/resource configuration
//! - [`io`]: Fetch collaborators and loaders
//! - `python`: PyO3 bindings (feature `python`)

pub mod config;
pub mod core;
pub mod io;
pub mod parsing;
pub mod transformations;

#[cfg(feature = "python")]
pub mod python;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// dashfeed - normalized provider data for Streamlit dashboards
#[cfg(feature = "python")]
#[pymodule]
fn dashfeed(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Coordinates
    m.add_function(wrap_pyfunction!(python::py_parse_dms, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_geo_from_dms, m)?)?;
    m.add(
        "MalformedCoordinateError",
        m.py().get_type::<python::MalformedCoordinateError>(),
    )?;

    // Records
    m.add_function(wrap_pyfunction!(python::py_flatten_json, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_flatten_groups_json, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_series, m)?)?;

    Ok(())
}
