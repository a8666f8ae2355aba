use serde::Serialize;

use crate::core::domain::RecordSet;
use crate::core::error::SeriesError;

/// One labelled point of a line, area or bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Extract `(label, value)` chart points from two columns of a record set.
///
/// Rows whose value cell is null are left out. Numeric text (`"12.5"`) is
/// accepted. Any other non-numeric value fails the whole extraction.
///
/// # Arguments
/// * `records` - Key-aligned rows, usually straight from the flattener
/// * `label_column` - Column used for the x axis (e.g. `state`)
/// * `value_column` - Column holding the plotted number (e.g. `value`)
pub fn series(
    records: &RecordSet,
    label_column: &str,
    value_column: &str,
) -> Result<Vec<SeriesPoint>, SeriesError> {
    for column in [label_column, value_column] {
        if !records.has_column(column) {
            return Err(SeriesError::MissingColumn(column.to_string()));
        }
    }

    let mut points = Vec::with_capacity(records.len());
    for (row, record) in records.iter().enumerate() {
        let cell = match record.get(value_column) {
            Some(cell) if !cell.is_null() => cell,
            _ => continue,
        };
        let value = cell.as_f64().ok_or_else(|| SeriesError::NonNumeric {
            row,
            column: value_column.to_string(),
            value: cell.to_string(),
        })?;
        let label = record
            .get(label_column)
            .map(ToString::to_string)
            .unwrap_or_default();
        points.push(SeriesPoint { label, value });
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::flatten;
    use serde_json::json;

    #[test]
    fn test_series_from_state_value_rows() {
        let flat = flatten(&json!([
            {"state": "home", "value": 3},
            {"state": "away", "value": "1.5"},
            {"state": "draw", "value": null},
        ]));
        let points = series(&flat.records, "state", "value").unwrap();
        assert_eq!(
            points,
            vec![
                SeriesPoint { label: "home".into(), value: 3.0 },
                SeriesPoint { label: "away".into(), value: 1.5 },
            ]
        );
    }

    #[test]
    fn test_series_missing_column() {
        let flat = flatten(&json!([{"state": "home"}]));
        assert_eq!(
            series(&flat.records, "state", "value"),
            Err(SeriesError::MissingColumn("value".into()))
        );
    }

    #[test]
    fn test_series_non_numeric_value() {
        let flat = flatten(&json!([{"state": "a", "value": 1}, {"state": "b", "value": "lots"}]));
        match series(&flat.records, "state", "value") {
            Err(SeriesError::NonNumeric { row, value, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "lots");
            }
            other => panic!("expected NonNumeric, got {:?}", other),
        }
    }

    #[test]
    fn test_series_on_empty_set() {
        assert!(matches!(
            series(&RecordSet::empty(), "state", "value"),
            Err(SeriesError::MissingColumn(_))
        ));
    }
}
