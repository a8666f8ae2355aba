//! Fetch collaborators that hand decoded JSON to the flattener.

use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::ResourceSettings;
use crate::core::error::{FetchError, FetchResult};

#[cfg(feature = "http-client")]
use crate::config::{DashboardConfig, ProviderSettings};
#[cfg(feature = "http-client")]
use std::time::Duration;

/// A named lookup plus its query parameters, e.g. `airport?apt=KPIT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub resource: String,
    pub params: Vec<(String, String)>,
}

impl ResourceRequest {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Anything that can turn a [`ResourceRequest`] into a decoded JSON value.
#[async_trait]
pub trait JsonSource: Send + Sync {
    async fn fetch_json(&self, request: &ResourceRequest) -> FetchResult<Value>;
}

/// Reject requests lacking any of the resource's required parameters.
pub fn check_required_params(
    settings: &ResourceSettings,
    request: &ResourceRequest,
) -> FetchResult<()> {
    for required in &settings.required_params {
        let present = request
            .get(required)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        if !present {
            return Err(FetchError::MissingParam {
                resource: request.resource.clone(),
                param: required.clone(),
            });
        }
    }
    Ok(())
}

/// Decode a response body, quoting the start of it when it is not JSON.
pub fn decode_json(resource: &str, body: &str) -> FetchResult<Value> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(500).collect();
        let ellipsis = if body.chars().count() > 500 { "..." } else { "" };
        FetchError::Decode {
            resource: resource.to_string(),
            message: format!("{}. First 500 chars: {}{}", e, preview, ellipsis),
        }
    })
}

/// In-memory source keyed by resource name. Used for offline snapshots and
/// tests.
#[derive(Debug, Clone, Default)]
pub struct StaticJsonSource {
    responses: BTreeMap<String, Value>,
}

impl StaticJsonSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: impl Into<String>, response: Value) -> Self {
        self.responses.insert(resource.into(), response);
        self
    }
}

#[async_trait]
impl JsonSource for StaticJsonSource {
    async fn fetch_json(&self, request: &ResourceRequest) -> FetchResult<Value> {
        self.responses
            .get(&request.resource)
            .cloned()
            .ok_or_else(|| FetchError::UnknownResource(request.resource.clone()))
    }
}

/// Build the full request URL for `request` under `config`.
///
/// Query values are percent-encoded.
#[cfg(feature = "http-client")]
pub fn build_url(config: &DashboardConfig, request: &ResourceRequest) -> FetchResult<reqwest::Url> {
    let (provider, resource) = lookup(config, request)?;
    url_for(provider, resource, request)
}

#[cfg(feature = "http-client")]
fn url_for(
    provider: &ProviderSettings,
    resource: &ResourceSettings,
    request: &ResourceRequest,
) -> FetchResult<reqwest::Url> {
    check_required_params(resource, request)?;

    let base = format!("{}{}", provider.base_url.trim_end_matches('/'), resource.path);
    let url = if request.params.is_empty() {
        reqwest::Url::parse(&base)
    } else {
        reqwest::Url::parse_with_params(&base, &request.params)
    };

    url.map_err(|e| {
        FetchError::Config(crate::core::error::ConfigError::Invalid(format!(
            "cannot build URL for '{}' from '{}': {}",
            request.resource, base, e
        )))
    })
}

#[cfg(feature = "http-client")]
fn lookup<'c>(
    config: &'c DashboardConfig,
    request: &ResourceRequest,
) -> FetchResult<(&'c ProviderSettings, &'c ResourceSettings)> {
    let resource = config
        .resource(&request.resource)
        .ok_or_else(|| FetchError::UnknownResource(request.resource.clone()))?;
    let provider = config.provider_for(resource).ok_or_else(|| {
        FetchError::Config(crate::core::error::ConfigError::Invalid(format!(
            "resource '{}' refers to unknown provider '{}'",
            request.resource, resource.provider
        )))
    })?;
    Ok((provider, resource))
}

/// HTTP GET against the configured providers.
///
/// One `reqwest::Client` is built per provider with that provider's timeout.
/// Non-2xx statuses, transport failures and non-JSON bodies each map to their
/// own [`FetchError`] variant. Nothing is retried.
#[cfg(feature = "http-client")]
pub struct HttpJsonSource {
    config: DashboardConfig,
    clients: BTreeMap<String, reqwest::Client>,
}

#[cfg(feature = "http-client")]
impl HttpJsonSource {
    pub fn new(config: DashboardConfig) -> FetchResult<Self> {
        config.validate()?;

        let mut clients = BTreeMap::new();
        for (name, provider) in &config.providers {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(provider.timeout_secs))
                .user_agent(provider.user_agent.clone())
                .build()
                .map_err(|e| FetchError::Transport {
                    resource: name.clone(),
                    message: format!("Failed to build HTTP client: {}", e),
                })?;
            clients.insert(name.clone(), client);
        }

        Ok(Self { config, clients })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }
}

#[cfg(feature = "http-client")]
#[async_trait]
impl JsonSource for HttpJsonSource {
    async fn fetch_json(&self, request: &ResourceRequest) -> FetchResult<Value> {
        let (provider, resource) = lookup(&self.config, request)?;
        let url = url_for(provider, resource, request)?;
        let client = self.clients.get(&resource.provider).ok_or_else(|| {
            FetchError::UnknownResource(request.resource.clone())
        })?;

        info!("fetching '{}' from {}", request.resource, url);

        let mut builder = client.get(url);
        if let Some(key) = &provider.api_key {
            builder = builder.header(provider.api_key_header.as_str(), key.as_str());
        }

        let transport = |e: reqwest::Error| FetchError::Transport {
            resource: request.resource.clone(),
            message: e.to_string(),
        };

        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        debug!(
            "'{}' answered {} with {} bytes",
            request.resource,
            status,
            body.len()
        );

        if !status.is_success() {
            return Err(FetchError::Status {
                resource: request.resource.clone(),
                status: status.as_u16(),
                body: body.trim().chars().take(500).collect(),
            });
        }

        decode_json(&request.resource, &body)
    }
}
