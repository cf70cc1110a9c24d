// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Key-value storage the flag engine runs on.
//!
//! The engine only assumes per-key atomicity and eventual consistency. There
//! is no cross-key transaction, and a write may not be visible to another
//! process immediately.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{create_pool, SqliteStore};

use async_trait::async_trait;

use crate::error::Result;

/// Eventually consistent key-value store with opaque byte values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
	async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

	async fn put(&self, key: &str, value: &[u8]) -> Result<()>;

	/// Deleting a missing key is not an error.
	async fn delete(&self, key: &str) -> Result<()>;

	/// Returns every key starting with `prefix`, in no guaranteed order.
	async fn list(&self, prefix: &str) -> Result<Vec<String>>;

	/// Writes `value` only if `key` has no value yet, returning whether the
	/// write happened.
	///
	/// The default is a plain get-then-put and races with concurrent writers.
	/// Backends with a conditional write should override it.
	async fn put_if_absent(&self, key: &str, value: &[u8]) -> Result<bool> {
		if self.get(key).await?.is_some() {
			return Ok(false);
		}
		self.put(key, value).await?;
		Ok(true)
	}
}
