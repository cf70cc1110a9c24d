// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::error::Result;

/// Process-local store, used by tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn len(&self) -> usize {
		self.entries.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.entries.read().await.is_empty()
	}
}

#[async_trait]
impl KeyValueStore for MemoryStore {
	async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
		Ok(self.entries.read().await.get(key).cloned())
	}

	async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
		self.entries
			.write()
			.await
			.insert(key.to_string(), value.to_vec());
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<()> {
		self.entries.write().await.remove(key);
		Ok(())
	}

	async fn list(&self, prefix: &str) -> Result<Vec<String>> {
		let entries = self.entries.read().await;
		Ok(entries
			.range(prefix.to_string()..)
			.take_while(|(key, _)| key.starts_with(prefix))
			.map(|(key, _)| key.clone())
			.collect())
	}

	async fn put_if_absent(&self, key: &str, value: &[u8]) -> Result<bool> {
		let mut entries = self.entries.write().await;
		if entries.contains_key(key) {
			return Ok(false);
		}
		entries.insert(key.to_string(), value.to_vec());
		Ok(true)
	}
}
