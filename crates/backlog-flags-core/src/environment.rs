// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::error::{FlagsError, Result};

/// Deployment namespace under which flags, overrides and the rollout salt are isolated.
pub struct Environment;

impl Environment {
	/// Environments the admin tooling knows about out of the box.
	pub const KNOWN: &'static [&'static str] = &["dev", "staging", "prod"];

	/// Environment used when nothing else is configured.
	pub const DEFAULT: &'static str = "prod";

	/// Validates the environment name format.
	///
	/// Valid names:
	/// - Lowercase alphanumeric with underscores
	/// - 2-50 characters
	/// - Starting with a letter
	pub fn validate_name(name: &str) -> bool {
		if name.len() < 2 || name.len() > 50 {
			return false;
		}

		let mut chars = name.chars();

		match chars.next() {
			Some(c) if c.is_ascii_lowercase() => {}
			_ => return false,
		}

		chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
	}

	/// Like [`Environment::validate_name`], but returns the offending name as an error.
	pub fn ensure_valid(name: &str) -> Result<()> {
		if Self::validate_name(name) {
			Ok(())
		} else {
			Err(FlagsError::InvalidEnvironment(name.to_string()))
		}
	}
}
