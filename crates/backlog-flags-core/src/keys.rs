// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Key grammar shared by every reader and writer of the flag store.
//!
//! - Flag config: `feature:{environment}:{flag}`
//! - User override: `feature:{environment}:{flag}:users:{user}`
//! - Rollout salt: `feature:{environment}:global:rollout_salt`

pub const KEY_NAMESPACE: &str = "feature";
pub const USER_OVERRIDE_INFIX: &str = ":users:";
pub const RESERVED_GLOBAL_SEGMENT: &str = "global";
pub const ROLLOUT_SALT_SUFFIX: &str = "global:rollout_salt";

/// Builds and parses store keys for a single environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagKeys {
	environment: String,
	prefix: String,
}

impl FlagKeys {
	pub fn new(environment: impl Into<String>) -> Self {
		let environment = environment.into();
		let prefix = format!("{KEY_NAMESPACE}:{environment}:");
		Self {
			environment,
			prefix,
		}
	}

	pub fn environment(&self) -> &str {
		&self.environment
	}

	/// Prefix shared by every key of this environment.
	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	pub fn flag(&self, flag_name: &str) -> String {
		format!("{}{flag_name}", self.prefix)
	}

	pub fn user_override(&self, flag_name: &str, user_id: &str) -> String {
		format!("{}{flag_name}{USER_OVERRIDE_INFIX}{user_id}", self.prefix)
	}

	pub fn rollout_salt(&self) -> String {
		format!("{}{ROLLOUT_SALT_SUFFIX}", self.prefix)
	}

	/// Extracts the flag name from a listed key.
	///
	/// Returns `None` for keys outside this environment, override keys and
	/// the salt key, so listing never reports them as flags.
	pub fn flag_name_from_key<'a>(&self, key: &'a str) -> Option<&'a str> {
		let name = key.strip_prefix(self.prefix.as_str())?;
		if name.is_empty() || name.contains(USER_OVERRIDE_INFIX) || name == ROLLOUT_SALT_SUFFIX {
			return None;
		}
		Some(name)
	}
}
