use pyo3::create_exception;
use pyo3::prelude::*;

use crate::core::domain::GeoCoordinate;
use crate::parsing::dms;

create_exception!(dashfeed, MalformedCoordinateError, pyo3::exceptions::PyValueError);

/// Convert a DMS string such as "40-26-46.00N" to signed decimal degrees.
///
/// Raises MalformedCoordinateError instead of guessing a hemisphere.
#[pyfunction]
pub fn py_parse_dms(text: &str) -> PyResult<f64> {
    dms::parse_dms(text).map_err(|e| MalformedCoordinateError::new_err(e.to_string()))
}

/// Convert a latitude/longitude DMS pair to a (lat, lon) tuple for map pins.
#[pyfunction]
pub fn py_geo_from_dms(latitude: &str, longitude: &str) -> PyResult<(f64, f64)> {
    GeoCoordinate::from_dms(latitude, longitude)
        .map(|c| (c.latitude, c.longitude))
        .map_err(|e| MalformedCoordinateError::new_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dms_binding() {
        let value = py_parse_dms("40-26-46.00N").unwrap();
        assert!((value - 40.446111).abs() < 1e-4);
        assert!(py_parse_dms("40-26-46.00").is_err());
    }

    #[test]
    fn test_geo_from_dms_binding() {
        let (lat, lon) = py_geo_from_dms("40-26-46.00N", "79-58-56.00W").unwrap();
        assert!((lat - 40.446111).abs() < 1e-4);
        assert!((lon + 79.982222).abs() < 1e-4);
        assert!(py_geo_from_dms("79-58-56.00W", "40-26-46.00N").is_err());
    }
}
