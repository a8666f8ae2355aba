use log::debug;
use serde_json::{Map, Value};

use crate::core::domain::{Record, RecordSet, Scalar};
use crate::core::error::MalformedRecord;

/// Output of a flattening pass: the usable records plus every element that had
/// to be skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Flattened {
    pub records: RecordSet,
    pub skipped: Vec<MalformedRecord>,
}

impl Flattened {
    /// True when no records were produced. An empty result is a valid outcome,
    /// distinct from a malformed one.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Normalizes raw API responses into key-aligned record sets.
///
/// Shape classification, in precedence order:
///
/// 1. `null` yields nothing.
/// 2. An array is a list of candidate records. Objects become records, every
///    other element (including `null`) is reported as malformed.
/// 3. An empty object yields nothing.
/// 4. An object whose values are all scalars is a single record.
/// 5. Any other object is group-keyed: every value is flattened recursively
///    and the results are concatenated in document order.
///
/// Selectors name a nested key to descend into for a given top-level group,
/// for providers that wrap a group's rows one level deeper (e.g. a `General`
/// or `DP` sub-object).
///
/// # Example
///
/// ```
/// use dashfeed::parsing::flatten::Flattener;
/// use serde_json::json;
///
/// let response = json!({
///     "1": {"General": [{"state": "home", "value": 3}]},
///     "2": [{"state": "away", "value": 1}]
/// });
/// let flat = Flattener::new().select("1", "General").flatten(&response);
/// assert_eq!(flat.records.len(), 2);
/// assert!(flat.skipped.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Flattener {
    selectors: Vec<(String, String)>,
}

impl Flattener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descend into `nested_key` whenever top-level group `group` is visited.
    pub fn select(mut self, group: impl Into<String>, nested_key: impl Into<String>) -> Self {
        let group = group.into();
        let nested_key = nested_key.into();
        match self.selectors.iter_mut().find(|(g, _)| *g == group) {
            Some((_, key)) => *key = nested_key,
            None => self.selectors.push((group, nested_key)),
        }
        self
    }

    pub fn selector_for(&self, group: &str) -> Option<&str> {
        self.selectors
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, k)| k.as_str())
    }

    /// Flatten the whole response into one record set.
    pub fn flatten(&self, response: &Value) -> Flattened {
        let mut records = Vec::new();
        let mut skipped = Vec::new();

        match response {
            Value::Object(map) if !map.is_empty() && !is_single_record(map) => {
                for (group, value) in map {
                    let path = child_path("$", group);
                    if let Some(value) = self.apply_selector(group, value, &path, &mut skipped) {
                        collect(value, &path, &mut records, &mut skipped);
                    }
                }
            }
            other => collect(other, "$", &mut records, &mut skipped),
        }

        let records = RecordSet::from_records(records);
        debug!(
            "flattened response into {} records x {} columns ({} skipped)",
            records.len(),
            records.columns().len(),
            skipped.len()
        );

        Flattened { records, skipped }
    }

    /// Flatten each top-level group separately, preserving group order.
    ///
    /// Responses that are not group-keyed come back as a single group named `""`.
    pub fn flatten_groups(&self, response: &Value) -> Vec<(String, Flattened)> {
        let map = match response {
            Value::Object(map) if !map.is_empty() && !is_single_record(map) => map,
            other => return vec![(String::new(), self.flatten(other))],
        };

        map.iter()
            .map(|(group, value)| {
                let path = child_path("$", group);
                let mut records = Vec::new();
                let mut skipped = Vec::new();
                if let Some(value) = self.apply_selector(group, value, &path, &mut skipped) {
                    collect(value, &path, &mut records, &mut skipped);
                }
                let flattened = Flattened {
                    records: RecordSet::from_records(records),
                    skipped,
                };
                (group.clone(), flattened)
            })
            .collect()
    }

    fn apply_selector<'v>(
        &self,
        group: &str,
        value: &'v Value,
        path: &str,
        skipped: &mut Vec<MalformedRecord>,
    ) -> Option<&'v Value> {
        let Some(key) = self.selector_for(group) else {
            return Some(value);
        };

        match value.as_object().and_then(|m| m.get(key)) {
            Some(nested) => Some(nested),
            None => {
                skipped.push(MalformedRecord::new(
                    path,
                    format!("missing selector key '{}' ({} found)", key, kind(value)),
                ));
                None
            }
        }
    }
}

/// Flatten a response with no selectors.
///
/// # Example
///
/// ```
/// use dashfeed::parsing::flatten::flatten;
/// use serde_json::json;
///
/// let flat = flatten(&json!([{"a": 1}, {"b": 2}]));
/// assert_eq!(flat.records.columns(), &["a".to_string(), "b".to_string()]);
/// ```
pub fn flatten(response: &Value) -> Flattened {
    Flattener::default().flatten(response)
}

fn is_single_record(map: &Map<String, Value>) -> bool {
    map.values().all(is_scalar)
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn child_path(parent: &str, key: &str) -> String {
    format!("{}.{}", parent, key)
}

fn collect(
    value: &Value,
    path: &str,
    records: &mut Vec<Record>,
    skipped: &mut Vec<MalformedRecord>,
) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                let item_path = format!("{}[{}]", path, idx);
                match item {
                    Value::Object(map) => push_record(map, &item_path, records, skipped),
                    other => skipped.push(MalformedRecord::new(
                        item_path,
                        format!("expected a record, found {}", kind(other)),
                    )),
                }
            }
        }
        Value::Object(map) if map.is_empty() => {}
        Value::Object(map) if is_single_record(map) => push_record(map, path, records, skipped),
        Value::Object(map) => {
            for (group, nested) in map {
                collect(nested, &child_path(path, group), records, skipped);
            }
        }
        other => skipped.push(MalformedRecord::new(
            path,
            format!("expected a record or collection, found {}", kind(other)),
        )),
    }
}

fn push_record(
    map: &Map<String, Value>,
    path: &str,
    records: &mut Vec<Record>,
    skipped: &mut Vec<MalformedRecord>,
) {
    let mut record = Record::new();
    match insert_fields(&mut record, None, map) {
        Ok(()) => records.push(record),
        Err(column) => skipped.push(MalformedRecord::new(
            path,
            format!("nested field flattens onto existing column '{}'", column),
        )),
    }
}

/// Nested objects become dotted keys; nested arrays are kept as JSON text.
///
/// Fails with the column name when a dotted key lands on a column that is
/// already set.
fn insert_fields(
    record: &mut Record,
    prefix: Option<&str>,
    map: &Map<String, Value>,
) -> Result<(), String> {
    for (key, value) in map {
        let name = match prefix {
            Some(p) => format!("{}.{}", p, key),
            None => key.clone(),
        };
        if let Value::Object(nested) = value {
            if !nested.is_empty() {
                insert_fields(record, Some(&name), nested)?;
                continue;
            }
        }
        if record.contains_key(&name) {
            return Err(name);
        }
        let cell = match value {
            Value::Object(_) => Scalar::Null,
            Value::Array(_) => Scalar::Text(value.to_string()),
            scalar => Scalar::from_json(scalar).unwrap_or_default(),
        };
        record.insert(name, cell);
    }
    Ok(())
}
