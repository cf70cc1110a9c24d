// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;
use std::time::Duration;

use backlog_flags_core::{
	in_rollout, rollout_bucket, Environment, EvaluationReason, FlagConfig, FlagKeys, FlagResult,
	DEFAULT_VARIANT, VARIANT_SELECTION_CONTEXT,
};
use tracing::{debug, warn};

use crate::config_store::FlagConfigStore;
use crate::error::{FlagsServerError, Result};
use crate::overrides::UserOverrideStore;
use crate::salt::SaltProvider;
use crate::store::KeyValueStore;

/// Evaluates flags for one environment.
///
/// Rules are applied in order and the first match wins:
/// 1. Per-user override
/// 2. Missing flag (caller defaults)
/// 3. Environment restriction
/// 4. Global disable
/// 5. User blacklist
/// 6. User whitelist
/// 7. Percentage rollout
/// 8. The flag's own enabled state
///
/// Evaluation only reads from the store (apart from creating the rollout
/// salt on first use) and never fails: any error returns the caller's
/// defaults with [`EvaluationReason::EvaluationError`].
pub struct FlagEvaluator {
	environment: String,
	configs: FlagConfigStore,
	overrides: UserOverrideStore,
	salt: SaltProvider,
	timeout: Option<Duration>,
}

impl FlagEvaluator {
	/// Fails if `environment` is not a valid environment name, since a name
	/// containing `:` would read another environment's keys.
	pub fn new(store: Arc<dyn KeyValueStore>, environment: impl Into<String>) -> Result<Self> {
		let environment = environment.into();
		Environment::ensure_valid(&environment)?;

		let keys = FlagKeys::new(environment.clone());
		Ok(Self {
			configs: FlagConfigStore::new(store.clone(), keys.clone()),
			overrides: UserOverrideStore::new(store.clone(), keys.clone()),
			salt: SaltProvider::new(store, keys),
			environment,
			timeout: None,
		})
	}

	/// Bounds each evaluation; expiry yields the caller's defaults.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	pub fn environment(&self) -> &str {
		&self.environment
	}

	pub fn salt(&self) -> &SaltProvider {
		&self.salt
	}

	pub async fn is_enabled(&self, flag_name: &str, user_id: Option<&str>, default: bool) -> bool {
		self.evaluate(flag_name, user_id, default, DEFAULT_VARIANT)
			.await
			.enabled
	}

	pub async fn get_variant(
		&self,
		flag_name: &str,
		user_id: Option<&str>,
		default_variant: &str,
	) -> String {
		self.evaluate(flag_name, user_id, false, default_variant)
			.await
			.variant
	}

	/// Evaluates a flag, returning the decision and the rule that made it.
	pub async fn evaluate(
		&self,
		flag_name: &str,
		user_id: Option<&str>,
		default_enabled: bool,
		default_variant: &str,
	) -> FlagResult {
		let evaluation = self.try_evaluate(flag_name, user_id, default_enabled, default_variant);
		let outcome = match self.timeout {
			Some(limit) => tokio::time::timeout(limit, evaluation)
				.await
				.unwrap_or(Err(FlagsServerError::Timeout(limit))),
			None => evaluation.await,
		};

		match outcome {
			Ok(result) => {
				debug!(
					flag = %flag_name,
					environment = %self.environment,
					enabled = result.enabled,
					variant = %result.variant,
					reason = %result.reason,
					"flag evaluated"
				);
				result
			}
			Err(e) => {
				warn!(
					flag = %flag_name,
					environment = %self.environment,
					error = %e,
					"flag evaluation failed, returning default"
				);
				FlagResult::new(
					default_enabled,
					default_variant,
					EvaluationReason::EvaluationError,
				)
			}
		}
	}

	async fn try_evaluate(
		&self,
		flag_name: &str,
		user_id: Option<&str>,
		default_enabled: bool,
		default_variant: &str,
	) -> Result<FlagResult> {
		if let Some(user_id) = user_id {
			if let Some(forced) = self.overrides.get(flag_name, user_id).await? {
				return Ok(FlagResult::from_override(forced));
			}
		}

		let Some(config) = self.configs.read(flag_name).await else {
			return Ok(FlagResult::new(
				default_enabled,
				default_variant,
				EvaluationReason::FlagNotFound,
			));
		};

		if !config.allows_environment(&self.environment) {
			return Ok(FlagResult::disabled(EvaluationReason::EnvironmentRestricted));
		}

		if !config.enabled {
			return Ok(FlagResult::disabled(EvaluationReason::FlagDisabled));
		}

		if let Some(user_id) = user_id {
			if config.is_blacklisted(user_id) {
				return Ok(FlagResult::disabled(EvaluationReason::UserBlacklisted));
			}

			if config.is_whitelisted(user_id) {
				let variant = self.select_variant(&config, Some(user_id)).await?;
				return Ok(FlagResult::new(
					true,
					variant,
					EvaluationReason::UserWhitelisted,
				));
			}

			if let Some(percentage) = config.rollout_percentage {
				let salt = self.salt.get().await?;
				let bucket = rollout_bucket(user_id, flag_name, &salt);
				if !in_rollout(bucket, percentage) {
					return Ok(FlagResult::disabled(EvaluationReason::RolloutExcluded));
				}

				let variant = self.select_variant(&config, Some(user_id)).await?;
				return Ok(FlagResult::new(
					true,
					variant,
					EvaluationReason::RolloutPercentage,
				));
			}
		}

		let variant = self.select_variant(&config, user_id).await?;
		Ok(FlagResult::new(
			config.enabled,
			variant,
			EvaluationReason::Default,
		))
	}

	async fn select_variant(&self, config: &FlagConfig, user_id: Option<&str>) -> Result<String> {
		let Some(variants) = config.weighted_variants() else {
			return Ok(config.fixed_variant());
		};

		let Some(user_id) = user_id else {
			return Ok(variants.first_name().unwrap_or(DEFAULT_VARIANT).to_string());
		};

		let salt = self.salt.get().await?;
		let bucket = rollout_bucket(user_id, VARIANT_SELECTION_CONTEXT, &salt);
		Ok(variants.pick(bucket).unwrap_or(DEFAULT_VARIANT).to_string())
	}
}
