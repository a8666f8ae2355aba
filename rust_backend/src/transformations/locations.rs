use serde::Serialize;

use crate::core::domain::{Axis, GeoCoordinate, Record, RecordSet, Scalar};
use crate::core::error::MalformedCoordinate;
use crate::parsing::dms::parse_dms_on_axis;

/// Which columns hold a pin's label and coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationColumns {
    pub label: String,
    pub latitude: String,
    pub longitude: String,
}

impl LocationColumns {
    pub fn new(
        label: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }
}

impl Default for LocationColumns {
    /// Column names used by the airport lookup.
    fn default() -> Self {
        Self::new("faa_ident", "latitude", "longitude")
    }
}

/// A labelled point for a map overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPin {
    pub label: String,
    pub coordinate: GeoCoordinate,
}

/// Pins that could be placed, plus the rows that could not.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Located {
    pub pins: Vec<MapPin>,
    /// `(row index, reason)` for every row left off the map.
    pub failures: Vec<(usize, MalformedCoordinate)>,
}

/// Build map pins from a record set.
///
/// Coordinate cells may be DMS text (`"40-29-29.3000N"`), decimal text or
/// numbers. A row that fails is reported in [`Located::failures`] and the
/// remaining rows are still placed.
pub fn locations(records: &RecordSet, columns: &LocationColumns) -> Located {
    let mut located = Located::default();

    for (row, record) in records.iter().enumerate() {
        match pin_for(record, columns) {
            Ok(pin) => located.pins.push(pin),
            Err(e) => located.failures.push((row, e)),
        }
    }

    located
}

fn pin_for(record: &Record, columns: &LocationColumns) -> Result<MapPin, MalformedCoordinate> {
    let latitude = coordinate_cell(record.get(&columns.latitude), Axis::Latitude)?;
    let longitude = coordinate_cell(record.get(&columns.longitude), Axis::Longitude)?;
    let label = record
        .get(&columns.label)
        .map(ToString::to_string)
        .unwrap_or_default();

    Ok(MapPin {
        label,
        coordinate: GeoCoordinate::new(latitude, longitude)?,
    })
}

fn coordinate_cell(cell: Option<&Scalar>, axis: Axis) -> Result<f64, MalformedCoordinate> {
    match cell {
        None | Some(Scalar::Null) => Err(MalformedCoordinate::Empty),
        Some(Scalar::Text(text)) => match text.trim().parse::<f64>() {
            Ok(decimal) => Ok(decimal),
            Err(_) => parse_dms_on_axis(text, axis),
        },
        Some(other) => other
            .as_f64()
            .ok_or_else(|| MalformedCoordinate::NotACoordinate {
                input: other.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::flatten;
    use serde_json::json;

    #[test]
    fn test_locations_from_dms_columns() {
        let flat = flatten(&json!({
            "KPIT": [{"faa_ident": "PIT", "latitude": "40-29-29.3000N", "longitude": "080-13-58.3000W"}],
            "KAGC": [{"faa_ident": "AGC", "latitude": "40-21-14.2000N", "longitude": "079-55-47.6000W"}]
        }));
        let located = locations(&flat.records, &LocationColumns::default());
        assert!(located.failures.is_empty());
        assert_eq!(located.pins.len(), 2);
        assert_eq!(located.pins[0].label, "PIT");
        assert!((located.pins[0].coordinate.latitude - 40.491472).abs() < 1e-5);
        assert!((located.pins[0].coordinate.longitude + 80.232861).abs() < 1e-5);
    }

    #[test]
    fn test_locations_accepts_decimal_cells() {
        let flat = flatten(&json!([
            {"callsign": "AAL1", "lat": 40.5, "lon": "-80.25"}
        ]));
        let located = locations(&flat.records, &LocationColumns::new("callsign", "lat", "lon"));
        assert_eq!(located.pins.len(), 1);
        assert_eq!(located.pins[0].coordinate.longitude, -80.25);
    }

    /// Bad rows are reported, good rows still placed
    #[test]
    fn test_locations_partial_failures() {
        let flat = flatten(&json!([
            {"faa_ident": "OK", "latitude": "40-26-46.00N", "longitude": "79-58-56.00W"},
            {"faa_ident": "SWAP", "latitude": "79-58-56.00W", "longitude": "40-26-46.00N"},
            {"faa_ident": "NONE", "latitude": null, "longitude": "79-58-56.00W"},
            {"faa_ident": "FAR", "latitude": 95.0, "longitude": 0}
        ]));
        let located = locations(&flat.records, &LocationColumns::default());
        assert_eq!(located.pins.len(), 1);
        assert_eq!(located.pins[0].label, "OK");
        let rows: Vec<usize> = located.failures.iter().map(|(row, _)| *row).collect();
        assert_eq!(rows, vec![1, 2, 3]);
        assert!(matches!(located.failures[0].1, MalformedCoordinate::WrongAxis { .. }));
        assert_eq!(located.failures[1].1, MalformedCoordinate::Empty);
        assert!(matches!(located.failures[2].1, MalformedCoordinate::OutOfRange { .. }));
    }

    #[test]
    fn test_boolean_cell_is_not_a_coordinate() {
        let flat = flatten(&json!([
            {"faa_ident": "BOOL", "latitude": true, "longitude": "79-58-56.00W"}
        ]));
        let located = locations(&flat.records, &LocationColumns::default());
        assert!(located.pins.is_empty());
        assert_eq!(
            located.failures[0].1,
            MalformedCoordinate::NotACoordinate { input: "true".into() }
        );
    }
}
