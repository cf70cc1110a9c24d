// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::sync::Arc;

use backlog_flags_core::{Environment, FlagConfig, FlagKeys, FlagsError};
use tracing::{info, instrument};

use crate::config_store::FlagConfigStore;
use crate::error::Result;
use crate::overrides::UserOverrideStore;
use crate::salt::SaltProvider;
use crate::store::KeyValueStore;

/// Administrative mutations for one environment.
///
/// Writes are validated and store errors are returned to the caller.
/// `enable_flag` and `disable_flag` read the current config and write the
/// merged result back without any conditional write, so two concurrent
/// admins may overwrite each other. The last write wins.
pub struct FlagAdmin {
	environment: String,
	configs: FlagConfigStore,
	overrides: UserOverrideStore,
	salt: SaltProvider,
}

impl FlagAdmin {
	pub fn new(store: Arc<dyn KeyValueStore>, environment: impl Into<String>) -> Result<Self> {
		let environment = environment.into();
		Environment::ensure_valid(&environment)?;

		let keys = FlagKeys::new(environment.clone());
		Ok(Self {
			configs: FlagConfigStore::new(store.clone(), keys.clone()),
			overrides: UserOverrideStore::new(store.clone(), keys.clone()),
			salt: SaltProvider::new(store, keys),
			environment,
		})
	}

	pub fn environment(&self) -> &str {
		&self.environment
	}

	#[instrument(skip(self, config), fields(environment = %self.environment))]
	pub async fn set_flag(&self, flag_name: &str, config: &FlagConfig) -> Result<()> {
		FlagConfig::ensure_valid_name(flag_name)?;
		config.validate()?;

		self.configs.write(flag_name, config).await?;
		info!(flag = %flag_name, enabled = config.enabled, "flag configured");
		Ok(())
	}

	/// Returns the stored config, or `None` if absent or unparseable.
	pub async fn get_flag(&self, flag_name: &str) -> Result<Option<FlagConfig>> {
		self.configs.fetch(flag_name).await
	}

	/// Sets `enabled` and, if given, the rollout percentage, keeping every
	/// other field of the stored config.
	#[instrument(skip(self), fields(environment = %self.environment))]
	pub async fn enable_flag(
		&self,
		flag_name: &str,
		rollout_percentage: Option<u32>,
	) -> Result<FlagConfig> {
		FlagConfig::ensure_valid_name(flag_name)?;
		if let Some(percentage) = rollout_percentage.filter(|p| *p > 100) {
			return Err(FlagsError::InvalidRolloutPercentage(percentage).into());
		}

		let mut config = self.configs.fetch(flag_name).await?.unwrap_or_default();
		config.enabled = true;
		if rollout_percentage.is_some() {
			config.rollout_percentage = rollout_percentage;
		}

		self.configs.write(flag_name, &config).await?;
		info!(flag = %flag_name, rollout = ?config.rollout_percentage, "flag enabled");
		Ok(config)
	}

	/// Clears `enabled`, keeping every other field of the stored config.
	#[instrument(skip(self), fields(environment = %self.environment))]
	pub async fn disable_flag(&self, flag_name: &str) -> Result<FlagConfig> {
		FlagConfig::ensure_valid_name(flag_name)?;

		let mut config = self.configs.fetch(flag_name).await?.unwrap_or_default();
		config.enabled = false;

		self.configs.write(flag_name, &config).await?;
		info!(flag = %flag_name, "flag disabled");
		Ok(config)
	}

	/// Removes the flag config. User overrides for the flag are left in place.
	#[instrument(skip(self), fields(environment = %self.environment))]
	pub async fn delete_flag(&self, flag_name: &str) -> Result<()> {
		FlagConfig::ensure_valid_name(flag_name)?;

		self.configs.delete(flag_name).await?;
		info!(flag = %flag_name, "flag deleted");
		Ok(())
	}

	#[instrument(skip(self), fields(environment = %self.environment))]
	pub async fn set_user_override(&self, flag_name: &str, user_id: &str, enabled: bool) -> Result<()> {
		FlagConfig::ensure_valid_name(flag_name)?;
		ensure_valid_user(user_id)?;

		self.overrides.set(flag_name, user_id, enabled).await?;
		info!(flag = %flag_name, user = %user_id, enabled, "user override set");
		Ok(())
	}

	pub async fn get_user_override(&self, flag_name: &str, user_id: &str) -> Result<Option<bool>> {
		self.overrides.get(flag_name, user_id).await
	}

	#[instrument(skip(self), fields(environment = %self.environment))]
	pub async fn remove_user_override(&self, flag_name: &str, user_id: &str) -> Result<()> {
		FlagConfig::ensure_valid_name(flag_name)?;
		ensure_valid_user(user_id)?;

		self.overrides.delete(flag_name, user_id).await?;
		info!(flag = %flag_name, user = %user_id, "user override removed");
		Ok(())
	}

	/// Every flag configured in this environment, keyed by name.
	///
	/// Override and salt keys are never reported; unparseable configs are skipped.
	#[instrument(skip(self), fields(environment = %self.environment))]
	pub async fn list_flags(&self) -> Result<BTreeMap<String, FlagConfig>> {
		let mut flags = BTreeMap::new();
		for name in self.configs.list_names().await? {
			if let Some(config) = self.configs.fetch(&name).await? {
				flags.insert(name, config);
			}
		}
		Ok(flags)
	}

	/// Forces re-randomization of every rollout and variant assignment.
	pub async fn reset_rollout_salt(&self) -> Result<()> {
		self.salt.reset().await
	}

	/// Creates the rollout salt before any evaluation needs it, closing the
	/// window in which two first evaluations could race to create it.
	///
	/// Returns the salt in effect and whether it was created by this call.
	pub async fn init_rollout_salt(&self, salt: Option<&str>) -> Result<(String, bool)> {
		self.salt.initialize(salt).await
	}

	/// Overwrites the rollout salt with a known value, for example to match
	/// another deployment sharing the same user base.
	pub async fn install_rollout_salt(&self, salt: &str) -> Result<()> {
		self.salt.install(salt).await
	}
}

fn ensure_valid_user(user_id: &str) -> Result<()> {
	if user_id.is_empty() || user_id.chars().any(|c| c.is_whitespace() || c.is_control()) {
		return Err(FlagsError::InvalidUserId(user_id.to_string()).into());
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use backlog_flags_core::EvaluationReason;

	use crate::error::FlagsServerError;
	use crate::evaluator::FlagEvaluator;
	use crate::store::testing::FlakyStore;
	use crate::store::MemoryStore;

	fn admin(store: &Arc<MemoryStore>, env: &str) -> FlagAdmin {
		FlagAdmin::new(store.clone(), env).unwrap()
	}

	#[tokio::test]
	async fn test_rejects_invalid_environment() {
		let store = Arc::new(MemoryStore::new());
		assert!(matches!(
			FlagAdmin::new(store, "Prod:users"),
			Err(FlagsServerError::Core(FlagsError::InvalidEnvironment(_)))
		));
	}

	#[tokio::test]
	async fn test_set_and_get_flag() {
		let store = Arc::new(MemoryStore::new());
		let admin = admin(&store, "test");

		let config = FlagConfig::new(true)
			.with_rollout_percentage(50)
			.with_whitelisted_user("user1");
		admin.set_flag("complex_flag", &config).await.unwrap();

		assert_eq!(admin.get_flag("complex_flag").await.unwrap(), Some(config));
		assert_eq!(admin.get_flag("missing").await.unwrap(), None);
	}

	#[tokio::test]
	async fn test_set_flag_validation() {
		let store = Arc::new(MemoryStore::new());
		let admin = admin(&store, "test");

		for bad_name in ["", "global", "a:users:b"] {
			assert!(matches!(
				admin.set_flag(bad_name, &FlagConfig::new(true)).await,
				Err(FlagsServerError::Core(FlagsError::InvalidFlagName(_)))
			));
		}

		assert!(matches!(
			admin
				.set_flag("flag", &FlagConfig::new(true).with_rollout_percentage(150))
				.await,
			Err(FlagsServerError::Core(FlagsError::InvalidRolloutPercentage(150)))
		));
		assert!(matches!(
			admin.enable_flag("flag", Some(101)).await,
			Err(FlagsServerError::Core(FlagsError::InvalidRolloutPercentage(101)))
		));

		assert!(store.is_empty().await);
	}

	#[tokio::test]
	async fn test_enable_creates_missing_flag() {
		let store = Arc::new(MemoryStore::new());
		let admin = admin(&store, "test");

		let config = admin.enable_flag("fresh", None).await.unwrap();
		assert_eq!(config, FlagConfig::new(true));
		assert_eq!(admin.get_flag("fresh").await.unwrap(), Some(FlagConfig::new(true)));
	}

	#[tokio::test]
	async fn test_disable_then_enable_preserves_fields() {
		let store = Arc::new(MemoryStore::new());
		let admin = admin(&store, "test");

		let original = FlagConfig::new(true)
			.with_rollout_percentage(30)
			.with_blacklisted_user("spammer")
			.with_weighted_variant("control", 50.0)
			.with_weighted_variant("treatment", 50.0);
		admin.set_flag("feature", &original).await.unwrap();

		let disabled = admin.disable_flag("feature").await.unwrap();
		assert!(!disabled.enabled);
		assert_eq!(disabled.rollout_percentage, Some(30));

		let enabled = admin.enable_flag("feature", None).await.unwrap();
		assert_eq!(enabled, original);
		assert_eq!(admin.get_flag("feature").await.unwrap(), Some(original));
	}

	#[tokio::test]
	async fn test_enable_updates_rollout() {
		let store = Arc::new(MemoryStore::new());
		let admin = admin(&store, "test");
		admin.enable_flag("gradual", Some(10)).await.unwrap();

		let config = admin.enable_flag("gradual", Some(75)).await.unwrap();
		assert_eq!(config.rollout_percentage, Some(75));
	}

	#[tokio::test]
	async fn test_enable_disable_round_trip_through_evaluator() {
		let store = Arc::new(MemoryStore::new());
		let admin = admin(&store, "test");
		let evaluator = FlagEvaluator::new(store.clone(), "test").unwrap();

		admin.enable_flag("test_flag", None).await.unwrap();
		assert!(evaluator.is_enabled("test_flag", None, false).await);

		admin.disable_flag("test_flag").await.unwrap();
		let result = evaluator.evaluate("test_flag", None, true, "x").await;
		assert_eq!(result.reason, EvaluationReason::FlagDisabled);
		assert!(!result.enabled);
	}

	#[tokio::test]
	async fn test_user_overrides() {
		let store = Arc::new(MemoryStore::new());
		let admin = admin(&store, "test");
		let evaluator = FlagEvaluator::new(store.clone(), "test").unwrap();
		admin.disable_flag("feature").await.unwrap();

		admin.set_user_override("feature", "tester", true).await.unwrap();
		assert_eq!(admin.get_user_override("feature", "tester").await.unwrap(), Some(true));
		assert!(evaluator.is_enabled("feature", Some("tester"), false).await);

		admin.remove_user_override("feature", "tester").await.unwrap();
		assert_eq!(admin.get_user_override("feature", "tester").await.unwrap(), None);
		assert!(!evaluator.is_enabled("feature", Some("tester"), false).await);

		assert!(matches!(
			admin.set_user_override("feature", "", true).await,
			Err(FlagsServerError::Core(FlagsError::InvalidUserId(_)))
		));
	}

	#[tokio::test]
	async fn test_list_flags_excludes_overrides() {
		let store = Arc::new(MemoryStore::new());
		let admin = admin(&store, "test");
		let evaluator = FlagEvaluator::new(store.clone(), "test").unwrap();

		let a = FlagConfig::new(true).with_rollout_percentage(20);
		let b = FlagConfig::new(false);
		admin.set_flag("a", &a).await.unwrap();
		admin.set_flag("b", &b).await.unwrap();
		admin.set_user_override("a", "u1", true).await.unwrap();

		// Create the salt key as well
		evaluator.evaluate("a", Some("u2"), false, "x").await;
		assert!(store
			.get("feature:test:global:rollout_salt")
			.await
			.unwrap()
			.is_some());

		let flags = admin.list_flags().await.unwrap();
		let expected: BTreeMap<String, FlagConfig> =
			[("a".to_string(), a), ("b".to_string(), b)].into_iter().collect();
		assert_eq!(flags, expected);
	}

	#[tokio::test]
	async fn test_list_flags_is_environment_scoped() {
		let store = Arc::new(MemoryStore::new());
		admin(&store, "dev").set_flag("a", &FlagConfig::new(true)).await.unwrap();
		admin(&store, "prod").set_flag("b", &FlagConfig::new(true)).await.unwrap();

		let dev: Vec<_> = admin(&store, "dev").list_flags().await.unwrap().into_keys().collect();
		assert_eq!(dev, vec!["a"]);
	}

	#[tokio::test]
	async fn test_delete_flag_keeps_overrides() {
		let store = Arc::new(MemoryStore::new());
		let admin = admin(&store, "test");
		admin.set_flag("doomed", &FlagConfig::new(true)).await.unwrap();
		admin.set_user_override("doomed", "u1", false).await.unwrap();

		admin.delete_flag("doomed").await.unwrap();
		assert_eq!(admin.get_flag("doomed").await.unwrap(), None);
		assert_eq!(admin.get_user_override("doomed", "u1").await.unwrap(), Some(false));
	}

	#[tokio::test]
	async fn test_reset_rollout_salt() {
		let store = Arc::new(MemoryStore::new());
		let admin = admin(&store, "test");
		let evaluator = FlagEvaluator::new(store.clone(), "test").unwrap();
		evaluator.salt().install("old").await.unwrap();

		admin.reset_rollout_salt().await.unwrap();
		assert!(store
			.get("feature:test:global:rollout_salt")
			.await
			.unwrap()
			.is_none());

		let fresh = FlagEvaluator::new(store.clone(), "test").unwrap();
		assert_ne!(fresh.salt().get().await.unwrap(), "old");
	}

	#[tokio::test]
	async fn test_init_rollout_salt_fixes_assignments() {
		let store = Arc::new(MemoryStore::new());
		let admin = admin(&store, "test");

		let (salt, created) = admin.init_rollout_salt(Some("S")).await.unwrap();
		assert_eq!((salt.as_str(), created), ("S", true));
		let (salt, created) = admin.init_rollout_salt(None).await.unwrap();
		assert_eq!((salt.as_str(), created), ("S", false));

		admin.enable_flag("flagname", Some(50)).await.unwrap();
		let evaluator = FlagEvaluator::new(store.clone(), "test").unwrap();
		// bucket("u2", "flagname", "S") = 12, bucket("u1", "flagname", "S") = 62
		assert_eq!(
			evaluator.evaluate("flagname", Some("u2"), false, "x").await.reason,
			EvaluationReason::RolloutPercentage
		);
		assert_eq!(
			evaluator.evaluate("flagname", Some("u1"), false, "x").await.reason,
			EvaluationReason::RolloutExcluded
		);
	}

	#[tokio::test]
	async fn test_install_rollout_salt_overwrites() {
		let store = Arc::new(MemoryStore::new());
		let admin = admin(&store, "dev");

		admin.init_rollout_salt(Some("old")).await.unwrap();
		admin.install_rollout_salt("new").await.unwrap();

		let evaluator = FlagEvaluator::new(store.clone(), "dev").unwrap();
		assert_eq!(evaluator.salt().get().await.unwrap(), "new");
		assert!(admin.install_rollout_salt("").await.is_err());
	}

	#[tokio::test]
	async fn test_store_errors_propagate() {
		let store = Arc::new(FlakyStore::default());
		let admin = FlagAdmin::new(store.clone(), "test").unwrap();
		store.set_offline(true);

		assert!(matches!(
			admin.set_flag("flag", &FlagConfig::new(true)).await,
			Err(FlagsServerError::Store(_))
		));
		assert!(admin.enable_flag("flag", None).await.is_err());
		assert!(admin.list_flags().await.is_err());
	}
}
