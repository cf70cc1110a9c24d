// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Backlog feature flag engine.
//!
//! Values are layered from built-in defaults, a TOML file and
//! `BACKLOG_FLAGS_*` environment variables, in increasing precedence.
//!
//! ```toml
//! environment = "staging"
//!
//! [store]
//! backend = "sqlite"
//! database_url = "sqlite:/var/lib/backlog/flags.db"
//!
//! [evaluation]
//! timeout_ms = 250
//!
//! [logging]
//! level = "info"
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::FlagsConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use backlog_flags_core::Environment;
use tracing::{debug, info};

/// Fully resolved engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagsConfig {
	/// Environment the evaluator and admin operate in.
	pub environment: String,
	pub store: StoreConfig,
	pub evaluation: EvaluationConfig,
	pub logging: LoggingConfig,
}

impl Default for FlagsConfig {
	fn default() -> Self {
		Self {
			environment: Environment::DEFAULT.to_string(),
			store: StoreConfig::default(),
			evaluation: EvaluationConfig::default(),
			logging: LoggingConfig::default(),
		}
	}
}

impl FlagsConfig {
	/// Emits the resolved settings as a single event.
	///
	/// Loading happens before a subscriber can be installed from the logging
	/// section, so callers log the result once their subscriber is in place.
	pub fn log_summary(&self) {
		info!(
			environment = %self.environment,
			backend = %self.store.backend,
			timeout_ms = self.evaluation.timeout.map(|t| t.as_millis() as u64),
			log_level = %self.logging.level,
			"configuration loaded"
		);
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`BACKLOG_FLAGS_*`)
/// 2. Config file (`/etc/backlog/flags.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<FlagsConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path in place of the system one.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<FlagsConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<FlagsConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = FlagsConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: FlagsConfigLayer) -> Result<FlagsConfig, ConfigError> {
	let environment = layer
		.environment
		.unwrap_or_else(|| Environment::DEFAULT.to_string());
	if !Environment::validate_name(&environment) {
		return Err(ConfigError::InvalidValue {
			key: "environment".to_string(),
			message: format!("invalid environment name '{environment}'"),
		});
	}

	let store = layer.store.unwrap_or_default().finalize();
	if store.database_url.trim().is_empty() {
		return Err(ConfigError::InvalidValue {
			key: "store.database_url".to_string(),
			message: "must not be empty".to_string(),
		});
	}

	let evaluation = layer.evaluation.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	Ok(FlagsConfig {
		environment,
		store,
		evaluation,
		logging,
	})
}
