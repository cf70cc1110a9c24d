// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files and environment variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::FlagsConfigLayer;
use crate::sections::{
	EvaluationConfigLayer, LoggingConfigLayer, StoreBackend, StoreConfigLayer,
};

pub const ENV_ENVIRONMENT: &str = "BACKLOG_FLAGS_ENV";
pub const ENV_STORE_BACKEND: &str = "BACKLOG_FLAGS_STORE";
pub const ENV_DATABASE_URL: &str = "BACKLOG_FLAGS_DATABASE_URL";
pub const ENV_EVAL_TIMEOUT_MS: &str = "BACKLOG_FLAGS_EVAL_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "BACKLOG_FLAGS_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "BACKLOG_FLAGS_LOG_JSON";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<FlagsConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<FlagsConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(FlagsConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is not an error.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/backlog/flags.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<FlagsConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(FlagsConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: FlagsConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: BACKLOG_FLAGS_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<FlagsConfigLayer, ConfigError> {
		debug!("loading environment variables");
		load_from_lookup(|name| std::env::var(name).ok())
	}
}

/// Builds a layer from an arbitrary variable lookup. Empty values count as unset.
pub(crate) fn load_from_lookup<F>(lookup: F) -> Result<FlagsConfigLayer, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let var = |name: &str| lookup(name).filter(|s| !s.is_empty());

	let backend = match var(ENV_STORE_BACKEND) {
		Some(v) => Some(
			v.parse::<StoreBackend>()
				.map_err(|message| ConfigError::InvalidValue {
					key: ENV_STORE_BACKEND.to_string(),
					message,
				})?,
		),
		None => None,
	};

	let timeout_ms = match var(ENV_EVAL_TIMEOUT_MS) {
		Some(v) => Some(v.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
			key: ENV_EVAL_TIMEOUT_MS.to_string(),
			message: format!("invalid u64 value '{v}'"),
		})?),
		None => None,
	};

	Ok(FlagsConfigLayer {
		environment: var(ENV_ENVIRONMENT),
		store: Some(StoreConfigLayer {
			backend,
			database_url: var(ENV_DATABASE_URL),
		}),
		evaluation: Some(EvaluationConfigLayer { timeout_ms }),
		logging: Some(LoggingConfigLayer {
			level: var(ENV_LOG_LEVEL),
			json: var(ENV_LOG_JSON).map(|v| v.eq_ignore_ascii_case("true") || v == "1"),
		}),
	})
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;
	use std::io::Write;

	use super::*;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name| map.get(name).cloned()
	}

	#[test]
	fn test_precedence_order() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn test_missing_toml_file_is_empty_layer() {
		let dir = tempfile::tempdir().unwrap();
		let layer = TomlSource::new(dir.path().join("absent.toml")).load().unwrap();
		assert!(layer.environment.is_none());
		assert!(layer.store.is_none());
	}

	#[test]
	fn test_malformed_toml_file_is_error() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "environment = ").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_lookup_populates_layer() {
		let layer = load_from_lookup(lookup(&[
			(ENV_ENVIRONMENT, "dev"),
			(ENV_STORE_BACKEND, "memory"),
			(ENV_EVAL_TIMEOUT_MS, "150"),
			(ENV_LOG_LEVEL, "debug"),
			(ENV_LOG_JSON, "1"),
		]))
		.unwrap();

		assert_eq!(layer.environment.as_deref(), Some("dev"));
		assert_eq!(layer.store.unwrap().backend, Some(StoreBackend::Memory));
		assert_eq!(layer.evaluation.unwrap().timeout_ms, Some(150));
		let logging = layer.logging.unwrap();
		assert_eq!(logging.level.as_deref(), Some("debug"));
		assert_eq!(logging.json, Some(true));
	}

	#[test]
	fn test_empty_env_values_are_unset() {
		let layer = load_from_lookup(lookup(&[(ENV_ENVIRONMENT, ""), (ENV_DATABASE_URL, "")])).unwrap();
		assert!(layer.environment.is_none());
		assert!(layer.store.unwrap().database_url.is_none());
	}

	#[test]
	fn test_invalid_env_values_are_rejected() {
		let err = load_from_lookup(lookup(&[(ENV_EVAL_TIMEOUT_MS, "soon")])).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_EVAL_TIMEOUT_MS));

		let err = load_from_lookup(lookup(&[(ENV_STORE_BACKEND, "etcd")])).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_STORE_BACKEND));
	}
}
