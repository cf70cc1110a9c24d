// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors that can occur in the feature flags system.
#[derive(Debug, Error)]
pub enum FlagsError {
	#[error("invalid flag name: {0}")]
	InvalidFlagName(String),

	#[error("invalid environment name: {0}")]
	InvalidEnvironment(String),

	#[error("invalid user id: {0}")]
	InvalidUserId(String),

	#[error("rollout percentage must be within 0..=100, got {0}")]
	InvalidRolloutPercentage(u32),

	#[error("invalid weight for variant {name}: {weight}")]
	InvalidVariantWeight { name: String, weight: f64 },

	#[error("rollout salt must be a non-empty string")]
	InvalidRolloutSalt,

	#[error("serialization error: {0}")]
	Serialization(String),
}

impl From<serde_json::Error> for FlagsError {
	fn from(err: serde_json::Error) -> Self {
		FlagsError::Serialization(err.to_string())
	}
}

pub type Result<T> = std::result::Result<T, FlagsError>;
