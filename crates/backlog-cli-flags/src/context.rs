// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use anyhow::Context;
use backlog_server_config::{FlagsConfig, StoreBackend, StoreConfig};
use backlog_server_flags::{FlagAdmin, FlagEvaluator, KeyValueStore, MemoryStore, SqliteStore};
use tracing::{debug, warn};

/// Everything a command handler needs, scoped to one environment.
pub struct CliContext {
	pub admin: FlagAdmin,
	pub evaluator: FlagEvaluator,
	pub json: bool,
}

impl CliContext {
	pub fn new(store: Arc<dyn KeyValueStore>, config: &FlagsConfig, json: bool) -> anyhow::Result<Self> {
		let admin = FlagAdmin::new(store.clone(), config.environment.clone())?;
		let mut evaluator = FlagEvaluator::new(store, config.environment.clone())?;
		if let Some(timeout) = config.evaluation.timeout {
			evaluator = evaluator.with_timeout(timeout);
		}

		Ok(Self {
			admin,
			evaluator,
			json,
		})
	}

	pub async fn from_config(config: &FlagsConfig, json: bool) -> anyhow::Result<Self> {
		let store = open_store(&config.store).await?;
		Self::new(store, config, json)
	}
}

pub async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
	match config.backend {
		StoreBackend::Memory => {
			warn!("using in-memory store; changes will not outlive this process");
			Ok(Arc::new(MemoryStore::new()))
		}
		StoreBackend::Sqlite => {
			debug!(url = %config.database_url, "opening sqlite store");
			let store = SqliteStore::connect(&config.database_url)
				.await
				.with_context(|| format!("failed to open store at {}", config.database_url))?;
			Ok(Arc::new(store))
		}
	}
}
