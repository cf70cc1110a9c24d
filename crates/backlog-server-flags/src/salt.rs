// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use backlog_flags_core::{FlagKeys, FlagsError};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::store::KeyValueStore;

/// Lazily creates and caches the per-environment rollout salt.
///
/// The salt is read once per instance and cached for its lifetime. When no
/// salt exists yet a random one is written with a conditional put; a process
/// that loses that race adopts the salt that won.
pub struct SaltProvider {
	store: Arc<dyn KeyValueStore>,
	keys: FlagKeys,
	cached: RwLock<Option<String>>,
}

impl SaltProvider {
	pub fn new(store: Arc<dyn KeyValueStore>, keys: FlagKeys) -> Self {
		Self {
			store,
			keys,
			cached: RwLock::new(None),
		}
	}

	pub async fn get(&self) -> Result<String> {
		if let Some(salt) = self.cached.read().await.as_ref() {
			return Ok(salt.clone());
		}

		let salt = self.load_or_create().await?;
		let mut cached = self.cached.write().await;
		Ok(cached.get_or_insert(salt).clone())
	}

	/// Creates the salt ahead of traffic if none is stored yet.
	///
	/// Uses `salt` when given, otherwise a random one. Returns the salt now in
	/// effect and whether this call wrote it. A usable stored salt is never
	/// replaced.
	#[instrument(skip(self, salt), fields(environment = %self.keys.environment()))]
	pub async fn initialize(&self, salt: Option<&str>) -> Result<(String, bool)> {
		let candidate = match salt {
			Some(salt) => {
				ensure_usable(salt)?;
				salt.to_string()
			}
			None => Uuid::new_v4().to_string(),
		};

		let key = self.keys.rollout_salt();
		if !self.store.put_if_absent(&key, candidate.as_bytes()).await? {
			if let Some(existing) = self.store.get(&key).await?.as_deref().and_then(decode_salt) {
				debug!("rollout salt already present");
				*self.cached.write().await = Some(existing.clone());
				return Ok((existing, false));
			}

			warn!("stored rollout salt is unusable, replacing it");
			self.store.put(&key, candidate.as_bytes()).await?;
		}

		info!("created rollout salt");
		*self.cached.write().await = Some(candidate.clone());
		Ok((candidate, true))
	}

	/// Writes a known salt, replacing any existing one.
	#[instrument(skip(self, salt), fields(environment = %self.keys.environment()))]
	pub async fn install(&self, salt: &str) -> Result<()> {
		ensure_usable(salt)?;
		self.store
			.put(&self.keys.rollout_salt(), salt.as_bytes())
			.await?;
		*self.cached.write().await = Some(salt.to_string());
		info!("installed rollout salt");
		Ok(())
	}

	/// Deletes the stored salt so the next evaluation generates a new one.
	///
	/// This reshuffles every rollout and variant assignment in the
	/// environment. Other instances keep their cached salt until restarted.
	#[instrument(skip(self), fields(environment = %self.keys.environment()))]
	pub async fn reset(&self) -> Result<()> {
		self.store.delete(&self.keys.rollout_salt()).await?;
		*self.cached.write().await = None;
		info!("rollout salt reset");
		Ok(())
	}

	#[instrument(skip(self), fields(environment = %self.keys.environment()))]
	async fn load_or_create(&self) -> Result<String> {
		let key = self.keys.rollout_salt();

		if let Some(raw) = self.store.get(&key).await? {
			if let Some(salt) = decode_salt(&raw) {
				return Ok(salt);
			}

			warn!("stored rollout salt is unusable, replacing it");
			let fresh = Uuid::new_v4().to_string();
			self.store.put(&key, fresh.as_bytes()).await?;
			return Ok(fresh);
		}

		let fresh = Uuid::new_v4().to_string();
		if self.store.put_if_absent(&key, fresh.as_bytes()).await? {
			info!("created rollout salt");
			return Ok(fresh);
		}

		debug!("lost rollout salt creation race, adopting stored salt");
		match self.store.get(&key).await?.as_deref().and_then(decode_salt) {
			Some(salt) => Ok(salt),
			None => {
				warn!("winning rollout salt not visible yet, using local salt");
				Ok(fresh)
			}
		}
	}
}

fn ensure_usable(salt: &str) -> Result<()> {
	if salt.is_empty() {
		return Err(FlagsError::InvalidRolloutSalt.into());
	}
	Ok(())
}

/// The salt is hashed exactly as stored; only empty or non-UTF-8 values are unusable.
fn decode_salt(raw: &[u8]) -> Option<String> {
	match std::str::from_utf8(raw) {
		Ok(salt) if !salt.is_empty() => Some(salt.to_string()),
		_ => None,
	}
}
