//! Domain models for normalized dashboard data.
//!
//! This module provides the value types shared by the coordinate normalizer,
//! the response flattener and the chart/map transformations: hemispheres,
//! geographic coordinates, scalar cell values, records and key-aligned record
//! sets.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{self, Write};

use super::error::{DmsSegment, MalformedCoordinate};

/// Coordinate axis a hemisphere letter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    /// Largest absolute value in degrees allowed on this axis.
    pub fn max_degrees(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Latitude => f.write_str("latitude"),
            Axis::Longitude => f.write_str("longitude"),
        }
    }
}

/// Hemisphere letter terminating a DMS string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hemisphere {
    N,
    S,
    E,
    W,
}

impl Hemisphere {
    /// Parses a hemisphere letter, accepting either case.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Hemisphere::N),
            'S' => Some(Hemisphere::S),
            'E' => Some(Hemisphere::E),
            'W' => Some(Hemisphere::W),
            _ => None,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Hemisphere::N | Hemisphere::S => Axis::Latitude,
            Hemisphere::E | Hemisphere::W => Axis::Longitude,
        }
    }

    /// `1.0` for N/E, `-1.0` for S/W.
    pub fn sign(self) -> f64 {
        match self {
            Hemisphere::N | Hemisphere::E => 1.0,
            Hemisphere::S | Hemisphere::W => -1.0,
        }
    }
}

/// A signed decimal-degree latitude/longitude pair.
///
/// Construction always checks latitude ∈ [-90, 90] and longitude ∈ [-180, 180].
///
/// # Examples
///
/// ```
/// use dashfeed::core::domain::GeoCoordinate;
///
/// let pit = GeoCoordinate::from_dms("40-29-29.3000N", "080-13-58.3000W").unwrap();
/// assert!(pit.latitude > 40.0 && pit.longitude < -80.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, MalformedCoordinate> {
        check_axis(latitude, Axis::Latitude)?;
        check_axis(longitude, Axis::Longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Builds a coordinate from a latitude DMS string (N/S) and a longitude
    /// DMS string (E/W).
    pub fn from_dms(latitude: &str, longitude: &str) -> Result<Self, MalformedCoordinate> {
        let lat = crate::parsing::dms::parse_dms_on_axis(latitude, Axis::Latitude)?;
        let lon = crate::parsing::dms::parse_dms_on_axis(longitude, Axis::Longitude)?;
        Self::new(lat, lon)
    }
}

fn check_axis(value: f64, axis: Axis) -> Result<(), MalformedCoordinate> {
    if value.is_finite() && value.abs() <= axis.max_degrees() {
        Ok(())
    } else {
        Err(MalformedCoordinate::OutOfRange {
            input: format!("{} {}", axis, value),
            segment: DmsSegment::Degrees,
            value,
        })
    }
}

/// One cell of a record: text, number, boolean or the null sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl Scalar {
    /// Converts a JSON scalar; arrays and objects yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => Some(Scalar::Number(n.clone())),
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::Text(s) => Value::String(s.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the cell. Text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => n.as_f64(),
            Scalar::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Scalar::Null | Scalar::Bool(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Number(v.into())
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Number(v.into())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// A flat, ordered mapping from field name to scalar value.
///
/// Field order is insertion order. Inserting an existing key replaces its value
/// in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Scalar)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Scalar) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Rebuilds this record with exactly `columns`, in that order, filling
    /// absent keys with [`Scalar::Null`].
    fn aligned_to(self, columns: &[String]) -> Record {
        let mut values: HashMap<String, Scalar> = self.fields.into_iter().collect();
        let fields = columns
            .iter()
            .map(|column| {
                let value = values.remove(column).unwrap_or(Scalar::Null);
                (column.clone(), value)
            })
            .collect();
        Record { fields }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl<K: Into<String>> FromIterator<(K, Scalar)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Scalar)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// An ordered sequence of records sharing one key set.
///
/// The only way to build one is through [`RecordSet::from_records`], which
/// aligns every record to the union of keys in first-seen order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSet {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Aligns `records` to the union of their keys and wraps them.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for record in &records {
            for key in record.keys() {
                if seen.insert(key) {
                    columns.push(key.to_string());
                }
            }
        }

        let records = records
            .into_iter()
            .map(|r| r.aligned_to(&columns))
            .collect();

        Self { columns, records }
    }

    /// Concatenates record sets, re-aligning to the combined key union.
    pub fn concat(sets: impl IntoIterator<Item = RecordSet>) -> Self {
        Self::from_records(sets.into_iter().flat_map(|s| s.records).collect())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&Scalar>> {
        if !self.has_column(name) {
            return None;
        }
        Some(
            self.records
                .iter()
                .map(|r| r.get(name).unwrap_or(&Scalar::Null))
                .collect(),
        )
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.records.iter().map(Record::to_json).collect())
    }

    /// Writes the set as tab-separated values with a header row.
    ///
    /// Tabs and newlines inside cells are replaced by spaces.
    pub fn write_tsv<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.columns.join("\t"))?;
        for record in &self.records {
            let row: Vec<String> = record
                .iter()
                .map(|(_, v)| v.to_string().replace(['\t', '\n', '\r'], " "))
                .collect();
            writeln!(out, "{}", row.join("\t"))?;
        }
        Ok(())
    }
}

impl Serialize for RecordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
