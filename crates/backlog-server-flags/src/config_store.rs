// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use backlog_flags_core::{FlagConfig, FlagKeys};
use tracing::{instrument, warn};

use crate::error::Result;
use crate::store::KeyValueStore;

/// Reads and writes [`FlagConfig`] records for one environment.
#[derive(Clone)]
pub struct FlagConfigStore {
	store: Arc<dyn KeyValueStore>,
	keys: FlagKeys,
}

impl FlagConfigStore {
	pub fn new(store: Arc<dyn KeyValueStore>, keys: FlagKeys) -> Self {
		Self { store, keys }
	}

	pub fn keys(&self) -> &FlagKeys {
		&self.keys
	}

	/// Reads a flag for evaluation.
	///
	/// Store failures and malformed payloads are logged and reported as
	/// `None`, the same as a flag that was never configured.
	pub async fn read(&self, flag_name: &str) -> Option<FlagConfig> {
		match self.fetch(flag_name).await {
			Ok(config) => config,
			Err(e) => {
				warn!(flag = %flag_name, error = %e, "failed to read flag config");
				None
			}
		}
	}

	/// Reads a flag, propagating store failures.
	///
	/// Malformed payloads are still reported as `None`.
	#[instrument(skip(self), fields(environment = %self.keys.environment()))]
	pub async fn fetch(&self, flag_name: &str) -> Result<Option<FlagConfig>> {
		let key = self.keys.flag(flag_name);
		let Some(raw) = self.store.get(&key).await? else {
			return Ok(None);
		};

		match serde_json::from_slice::<FlagConfig>(&raw) {
			Ok(config) => Ok(Some(config)),
			Err(e) => {
				warn!(key = %key, error = %e, "ignoring malformed flag config");
				Ok(None)
			}
		}
	}

	#[instrument(skip(self, config), fields(environment = %self.keys.environment()))]
	pub async fn write(&self, flag_name: &str, config: &FlagConfig) -> Result<()> {
		let payload = serde_json::to_vec(config)?;
		self.store.put(&self.keys.flag(flag_name), &payload).await
	}

	#[instrument(skip(self), fields(environment = %self.keys.environment()))]
	pub async fn delete(&self, flag_name: &str) -> Result<()> {
		self.store.delete(&self.keys.flag(flag_name)).await
	}

	/// Names of every flag key in this environment, sorted.
	///
	/// Override keys and the rollout salt key are excluded.
	#[instrument(skip(self), fields(environment = %self.keys.environment()))]
	pub async fn list_names(&self) -> Result<Vec<String>> {
		let keys = self.store.list(self.keys.prefix()).await?;
		let mut names: Vec<String> = keys
			.iter()
			.filter_map(|key| self.keys.flag_name_from_key(key))
			.map(str::to_string)
			.collect();
		names.sort();
		names.dedup();
		Ok(names)
	}
}
