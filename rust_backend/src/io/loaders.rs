use chrono::{DateTime, Utc};
use log::{info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{DashboardConfig, ResourceSettings};
use crate::core::domain::RecordSet;
use crate::core::error::{FetchError, FetchResult, MalformedRecord};
use crate::io::client::{decode_json, JsonSource, ResourceRequest};
use crate::parsing::flatten::{Flattened, Flattener};
use crate::transformations::locations::{locations, LocationColumns, Located};

/// Result of loading one resource
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub resource: String,
    pub records: RecordSet,
    pub skipped: Vec<MalformedRecord>,
    pub fetched_at: DateTime<Utc>,
}

impl LoadResult {
    fn new(resource: &str, flattened: Flattened) -> Self {
        Self {
            resource: resource.to_string(),
            records: flattened.records,
            skipped: flattened.skipped,
            fetched_at: Utc::now(),
        }
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    /// No rows came back. Not an error.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fetches a resource from a [`JsonSource`] and flattens it into a record set.
///
/// Per-resource settings (response envelope root and group selectors) are
/// taken from the configuration the loader was built with; resources without
/// settings are flattened as-is.
pub struct ResponseLoader<S> {
    source: S,
    resources: BTreeMap<String, ResourceSettings>,
}

impl<S: JsonSource> ResponseLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            resources: BTreeMap::new(),
        }
    }

    pub fn with_config(source: S, config: &DashboardConfig) -> Self {
        Self {
            source,
            resources: config.resources.clone(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch `request` and flatten the response.
    ///
    /// Fetch failures are returned as errors and nothing is flattened.
    /// Malformed elements inside a good response end up in
    /// [`LoadResult::skipped`].
    pub async fn load(&self, request: &ResourceRequest) -> FetchResult<LoadResult> {
        info!("loading resource '{}'", request.resource);
        let response = self.source.fetch_json(request).await?;
        let result = flatten_for(&request.resource, self.resources.get(&request.resource), &response);
        log_result(&result);
        Ok(result)
    }

    /// Fetch `request` and place each row on the map.
    pub async fn load_locations(
        &self,
        request: &ResourceRequest,
        columns: &LocationColumns,
    ) -> FetchResult<(LoadResult, Located)> {
        let result = self.load(request).await?;
        let located = locations(&result.records, columns);
        for (row, err) in &located.failures {
            warn!("'{}' row {} left off the map: {}", result.resource, row, err);
        }
        Ok((result, located))
    }
}

/// Flatten a JSON snapshot held in a string.
pub fn load_from_json_str(
    resource: &str,
    json_str: &str,
    settings: Option<&ResourceSettings>,
) -> FetchResult<LoadResult> {
    let response = decode_json(resource, json_str)?;
    let result = flatten_for(resource, settings, &response);
    log_result(&result);
    Ok(result)
}

/// Flatten a JSON snapshot saved to disk.
pub fn load_from_file(
    resource: &str,
    path: &Path,
    settings: Option<&ResourceSettings>,
) -> FetchResult<LoadResult> {
    let content = std::fs::read_to_string(path).map_err(|e| FetchError::Transport {
        resource: resource.to_string(),
        message: format!("Failed to read JSON file {}: {}", path.display(), e),
    })?;
    load_from_json_str(resource, &content, settings)
}

fn flatten_for(resource: &str, settings: Option<&ResourceSettings>, response: &Value) -> LoadResult {
    let flattener = settings.map(ResourceSettings::flattener).unwrap_or_default();

    let root = settings.and_then(|s| s.root.as_deref());
    let flattened = match root {
        None => flattener.flatten(response),
        Some(key) => match response.get(key) {
            Some(payload) => flattener.flatten(payload),
            None => Flattened {
                records: RecordSet::empty(),
                skipped: vec![MalformedRecord::new(
                    "$",
                    format!("response envelope has no '{}' key", key),
                )],
            },
        },
    };

    LoadResult::new(resource, flattened)
}

fn log_result(result: &LoadResult) {
    info!(
        "'{}' produced {} records x {} columns",
        result.resource,
        result.records.len(),
        result.records.columns().len()
    );
    for skipped in &result.skipped {
        warn!("'{}': {}", result.resource, skipped);
    }
}
