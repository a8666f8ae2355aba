//! Provider and resource configuration.
//!
//! API endpoints and keys live in a `dashfeed.toml` file (or the built-in
//! defaults) and are handed to the fetch layer at construction time.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::ConfigError;
use crate::parsing::flatten::Flattener;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "DASHFEED_CONFIG";

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSettings>,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceSettings>,
}

/// One upstream REST API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// One named lookup offered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSettings {
    pub provider: String,
    pub path: String,
    #[serde(default)]
    pub required_params: Vec<String>,
    /// Key holding the payload inside the provider's response envelope.
    #[serde(default)]
    pub root: Option<String>,
    /// Group key -> nested key to descend into when flattening.
    #[serde(default)]
    pub selectors: BTreeMap<String, String>,
}

fn default_api_key_header() -> String {
    "Authorization".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_user_agent() -> String {
    concat!("dashfeed/", env!("CARGO_PKG_VERSION")).to_string()
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            api_key_header: default_api_key_header(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ResourceSettings {
    pub fn new(provider: impl Into<String>, path: impl Into<String>, required: &[&str]) -> Self {
        Self {
            provider: provider.into(),
            path: path.into(),
            required_params: required.iter().map(|p| p.to_string()).collect(),
            root: None,
            selectors: BTreeMap::new(),
        }
    }

    /// Flattener carrying this resource's group selectors.
    pub fn flattener(&self) -> Flattener {
        self.selectors
            .iter()
            .fold(Flattener::new(), |f, (group, key)| f.select(group.clone(), key.clone()))
    }
}

impl Default for DashboardConfig {
    /// Aviation lookups against aviationapi.com plus an API-Football provider
    /// whose key must come from the environment.
    fn default() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            "aviation".to_string(),
            ProviderSettings::new("https://api.aviationapi.com/v1"),
        );
        let mut football = ProviderSettings::new("https://v3.football.api-sports.io");
        football.api_key_header = "x-apisports-key".to_string();
        providers.insert("football".to_string(), football);

        let mut resources = BTreeMap::new();
        let aviation = [
            ("airport", "/airports", &["apt"][..]),
            ("preferred_routes", "/preferred-routes/search", &["origin", "dest"][..]),
            // METAR/TAF bodies are one report per airport with array fields
            // (`sky_conditions`). They flatten as groups: the report's scalar
            // fields come back in `skipped` and only the array rows become
            // records. Select `<apt>` -> `sky_conditions` for the cloud layers.
            ("weather_metar", "/weather/metar", &["apt"][..]),
            ("weather_taf", "/weather/taf", &["apt"][..]),
            ("pilots", "/vatsim/pilots", &["apt"][..]),
            ("controllers", "/vatsim/controllers", &["fac"][..]),
        ];
        for (name, path, required) in aviation {
            resources.insert(name.to_string(), ResourceSettings::new("aviation", path, required));
        }
        for (name, path, required) in [
            ("standings", "/standings", &["league", "season"][..]),
            ("fixtures", "/fixtures", &[][..]),
        ] {
            let mut resource = ResourceSettings::new("football", path, required);
            resource.root = Some("response".to_string());
            resources.insert(name.to_string(), resource);
        }

        Self {
            providers,
            resources,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(DashboardConfig)` if successful
    /// * `Err(ConfigError)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!("read config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text. Errors name the offending field.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let deserializer = toml::Deserializer::new(content);
        serde_path_to_error::deserialize(deserializer).map_err(|e| ConfigError::Parse {
            path: e.path().to_string(),
            message: e.inner().to_string(),
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `dashfeed.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("dashfeed.toml"),
            PathBuf::from("rust_backend/dashfeed.toml"),
            PathBuf::from("../dashfeed.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Resolve the configuration the way the CLI and bindings do:
    /// `$DASHFEED_CONFIG`, then the default search path, then built-in
    /// defaults. Environment key overrides are applied and the result is
    /// validated.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => match Self::from_default_location() {
                Ok(config) => config,
                Err(ConfigError::NotFound) => {
                    info!("no dashfeed.toml found, using built-in providers");
                    Self::default()
                }
                Err(e) => return Err(e),
            },
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Replace provider API keys with `DASHFEED_<PROVIDER>_API_KEY` when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Same as [`apply_env_overrides`](Self::apply_env_overrides) with an
    /// explicit variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (name, provider) in self.providers.iter_mut() {
            let var = api_key_env_var(name);
            if let Some(key) = lookup(&var).filter(|k| !k.trim().is_empty()) {
                debug!("api key for provider '{}' taken from {}", name, var);
                provider.api_key = Some(key);
            }
        }
    }

    /// Check cross-references and value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, provider) in &self.providers {
            if !(provider.base_url.starts_with("http://")
                || provider.base_url.starts_with("https://"))
            {
                return Err(ConfigError::Invalid(format!(
                    "provider '{}' base_url must start with http:// or https://, got '{}'",
                    name, provider.base_url
                )));
            }
            if provider.timeout_secs == 0 {
                return Err(ConfigError::Invalid(format!(
                    "provider '{}' timeout_secs must be greater than 0",
                    name
                )));
            }
        }

        for (name, resource) in &self.resources {
            if !self.providers.contains_key(&resource.provider) {
                return Err(ConfigError::Invalid(format!(
                    "resource '{}' refers to unknown provider '{}'",
                    name, resource.provider
                )));
            }
            if !resource.path.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "resource '{}' path must start with '/', got '{}'",
                    name, resource.path
                )));
            }
        }

        Ok(())
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceSettings> {
        self.resources.get(name)
    }

    pub fn provider_for(&self, resource: &ResourceSettings) -> Option<&ProviderSettings> {
        self.providers.get(&resource.provider)
    }
}

/// `aviation` -> `DASHFEED_AVIATION_API_KEY`
pub fn api_key_env_var(provider: &str) -> String {
    let name: String = provider
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("DASHFEED_{}_API_KEY", name)
}
