// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Key-value store configuration.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./backlog-flags.db";

/// Which key-value backend the engine runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
	/// Process-local map; contents are lost on exit.
	Memory,
	#[default]
	Sqlite,
}

impl FromStr for StoreBackend {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"memory" => Ok(StoreBackend::Memory),
			"sqlite" => Ok(StoreBackend::Sqlite),
			other => Err(format!("unknown store backend '{other}' (expected memory or sqlite)")),
		}
	}
}

impl fmt::Display for StoreBackend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StoreBackend::Memory => f.write_str("memory"),
			StoreBackend::Sqlite => f.write_str("sqlite"),
		}
	}
}

/// Store configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
	pub backend: StoreBackend,
	pub database_url: String,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			backend: StoreBackend::default(),
			database_url: DEFAULT_DATABASE_URL.to_string(),
		}
	}
}

/// Store configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfigLayer {
	#[serde(default)]
	pub backend: Option<StoreBackend>,
	#[serde(default)]
	pub database_url: Option<String>,
}

impl StoreConfigLayer {
	pub fn merge(&mut self, other: StoreConfigLayer) {
		if other.backend.is_some() {
			self.backend = other.backend;
		}
		if other.database_url.is_some() {
			self.database_url = other.database_url;
		}
	}

	pub fn finalize(self) -> StoreConfig {
		StoreConfig {
			backend: self.backend.unwrap_or_default(),
			database_url: self
				.database_url
				.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
		}
	}
}
