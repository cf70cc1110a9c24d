// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use serde::{Deserialize, Serialize};

pub const VARIANT_ENABLED: &str = "enabled";
pub const VARIANT_DISABLED: &str = "disabled";
pub const DEFAULT_VARIANT: &str = "default";

/// Outcome of evaluating one flag for one (optional) user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagResult {
	pub enabled: bool,
	pub variant: String,
	pub reason: EvaluationReason,
}

impl FlagResult {
	pub fn new(enabled: bool, variant: impl Into<String>, reason: EvaluationReason) -> Self {
		Self {
			enabled,
			variant: variant.into(),
			reason,
		}
	}

	/// A disabled result carrying the `disabled` variant.
	pub fn disabled(reason: EvaluationReason) -> Self {
		Self::new(false, VARIANT_DISABLED, reason)
	}

	/// A forced result from a per-user override.
	pub fn from_override(enabled: bool) -> Self {
		let variant = if enabled {
			VARIANT_ENABLED
		} else {
			VARIANT_DISABLED
		};
		Self::new(enabled, variant, EvaluationReason::UserOverride)
	}
}

/// Which rule of the precedence protocol produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationReason {
	UserOverride,
	FlagNotFound,
	EnvironmentRestricted,
	FlagDisabled,
	UserBlacklisted,
	UserWhitelisted,
	RolloutPercentage,
	RolloutExcluded,
	Default,
	EvaluationError,
}

impl EvaluationReason {
	pub fn as_str(&self) -> &'static str {
		match self {
			EvaluationReason::UserOverride => "user_override",
			EvaluationReason::FlagNotFound => "flag_not_found",
			EvaluationReason::EnvironmentRestricted => "environment_restricted",
			EvaluationReason::FlagDisabled => "flag_disabled",
			EvaluationReason::UserBlacklisted => "user_blacklisted",
			EvaluationReason::UserWhitelisted => "user_whitelisted",
			EvaluationReason::RolloutPercentage => "rollout_percentage",
			EvaluationReason::RolloutExcluded => "rollout_excluded",
			EvaluationReason::Default => "default",
			EvaluationReason::EvaluationError => "evaluation_error",
		}
	}

	/// Whether the caller's defaults were returned instead of a decision.
	pub fn is_fallback(&self) -> bool {
		matches!(
			self,
			EvaluationReason::FlagNotFound | EvaluationReason::EvaluationError
		)
	}
}

impl fmt::Display for EvaluationReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_reason_serializes_snake_case() {
		let all = [
			EvaluationReason::UserOverride,
			EvaluationReason::FlagNotFound,
			EvaluationReason::EnvironmentRestricted,
			EvaluationReason::FlagDisabled,
			EvaluationReason::UserBlacklisted,
			EvaluationReason::UserWhitelisted,
			EvaluationReason::RolloutPercentage,
			EvaluationReason::RolloutExcluded,
			EvaluationReason::Default,
			EvaluationReason::EvaluationError,
		];

		for reason in all {
			let json = serde_json::to_string(&reason).unwrap();
			assert_eq!(json, format!("\"{}\"", reason.as_str()));
		}
	}

	#[test]
	fn test_flag_result_json() {
		let result = FlagResult::new(true, "treatment", EvaluationReason::RolloutPercentage);
		let json = serde_json::to_value(&result).unwrap();
		assert_eq!(
			json,
			serde_json::json!({
				"enabled": true,
				"variant": "treatment",
				"reason": "rollout_percentage"
			})
		);
	}

	#[test]
	fn test_from_override() {
		assert_eq!(FlagResult::from_override(true).variant, "enabled");
		assert_eq!(FlagResult::from_override(false).variant, "disabled");
		assert_eq!(
			FlagResult::from_override(false).reason,
			EvaluationReason::UserOverride
		);
	}

	#[test]
	fn test_is_fallback() {
		assert!(EvaluationReason::FlagNotFound.is_fallback());
		assert!(EvaluationReason::EvaluationError.is_fallback());
		assert!(!EvaluationReason::Default.is_fallback());
	}
}
