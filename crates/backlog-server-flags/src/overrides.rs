// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use backlog_flags_core::FlagKeys;
use tracing::{instrument, warn};

use crate::error::Result;
use crate::store::KeyValueStore;

/// Per-user forced values, stored as the literal strings `true` / `false`.
#[derive(Clone)]
pub struct UserOverrideStore {
	store: Arc<dyn KeyValueStore>,
	keys: FlagKeys,
}

impl UserOverrideStore {
	pub fn new(store: Arc<dyn KeyValueStore>, keys: FlagKeys) -> Self {
		Self { store, keys }
	}

	/// Any stored value other than `true` / `false` reads as no override.
	#[instrument(skip(self), fields(environment = %self.keys.environment()))]
	pub async fn get(&self, flag_name: &str, user_id: &str) -> Result<Option<bool>> {
		let key = self.keys.user_override(flag_name, user_id);
		let Some(raw) = self.store.get(&key).await? else {
			return Ok(None);
		};

		let value = parse_override(&raw);
		if value.is_none() {
			warn!(key = %key, "ignoring unrecognised override value");
		}
		Ok(value)
	}

	#[instrument(skip(self), fields(environment = %self.keys.environment()))]
	pub async fn set(&self, flag_name: &str, user_id: &str, enabled: bool) -> Result<()> {
		let value = if enabled { "true" } else { "false" };
		self.store
			.put(&self.keys.user_override(flag_name, user_id), value.as_bytes())
			.await
	}

	#[instrument(skip(self), fields(environment = %self.keys.environment()))]
	pub async fn delete(&self, flag_name: &str, user_id: &str) -> Result<()> {
		self.store
			.delete(&self.keys.user_override(flag_name, user_id))
			.await
	}
}

fn parse_override(raw: &[u8]) -> Option<bool> {
	match raw {
		b"true" => Some(true),
		b"false" => Some(false),
		_ => None,
	}
}
