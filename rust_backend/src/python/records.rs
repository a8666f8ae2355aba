use pyo3::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::parsing::flatten::{Flattened, Flattener};
use crate::transformations::series;

fn parse_json(json_str: &str) -> PyResult<Value> {
    serde_json::from_str(json_str).map_err(|e| {
        pyo3::exceptions::PyValueError::new_err(format!("Failed to parse JSON: {}", e))
    })
}

fn flattener_from(selectors: Option<BTreeMap<String, String>>) -> Flattener {
    selectors
        .unwrap_or_default()
        .into_iter()
        .fold(Flattener::new(), |f, (group, key)| f.select(group, key))
}

fn to_python(flattened: Flattened) -> PyResult<(String, Vec<String>)> {
    let records = serde_json::to_string(&flattened.records).map_err(|e| {
        pyo3::exceptions::PyRuntimeError::new_err(format!("Failed to serialize result: {}", e))
    })?;
    let skipped = flattened.skipped.iter().map(ToString::to_string).collect();
    Ok((records, skipped))
}

/// Flatten a raw API response into key-aligned records.
///
/// Returns (records_json, skipped) where skipped lists one message per element
/// that could not be read as a record. Feed records_json to pandas.read_json.
#[pyfunction]
#[pyo3(signature = (json_str, selectors=None))]
pub fn py_flatten_json(
    json_str: &str,
    selectors: Option<BTreeMap<String, String>>,
) -> PyResult<(String, Vec<String>)> {
    let response = parse_json(json_str)?;
    to_python(flattener_from(selectors).flatten(&response))
}

/// Flatten each top-level group of a response separately.
#[pyfunction]
#[pyo3(signature = (json_str, selectors=None))]
pub fn py_flatten_groups_json(
    json_str: &str,
    selectors: Option<BTreeMap<String, String>>,
) -> PyResult<Vec<(String, String, Vec<String>)>> {
    let response = parse_json(json_str)?;
    flattener_from(selectors)
        .flatten_groups(&response)
        .into_iter()
        .map(|(group, flattened)| {
            let (records, skipped) = to_python(flattened)?;
            Ok((group, records, skipped))
        })
        .collect()
}

/// Extract (label, value) chart points from a records JSON array.
#[pyfunction]
pub fn py_series(records_json: &str, label: &str, value: &str) -> PyResult<Vec<(String, f64)>> {
    let response = parse_json(records_json)?;
    let flattened = Flattener::new().flatten(&response);
    let points = series::series(&flattened.records, label, value)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
    Ok(points.into_iter().map(|p| (p.label, p.value)).collect())
}
