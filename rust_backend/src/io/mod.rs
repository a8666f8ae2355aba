//! Fetching and loading provider data.
//!
//! This module connects the HTTP layer to the flattener: a [`JsonSource`]
//! delivers decoded JSON (or a typed fetch error) and the loaders turn it into
//! a ready-to-render record set.
//!
//! # Example
//!
//! ```no_run
//! use dashfeed::config::DashboardConfig;
//! use dashfeed::io::{HttpJsonSource, ResponseLoader, ResourceRequest};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = DashboardConfig::load()?;
//! let loader = ResponseLoader::with_config(HttpJsonSource::new(config.clone())?, &config);
//! let result = loader.load(&ResourceRequest::new("airport").param("apt", "KPIT")).await?;
//! println!("Loaded {} records", result.num_records());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod loaders;

#[cfg(feature = "http-client")]
pub use client::{build_url, HttpJsonSource};
pub use client::{JsonSource, ResourceRequest, StaticJsonSource};
pub use loaders::{load_from_file, load_from_json_str, LoadResult, ResponseLoader};
