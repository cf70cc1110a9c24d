// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use serde::Deserialize;

/// Evaluation configuration (runtime, fully resolved).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationConfig {
	/// Upper bound on a single evaluation; `None` waits for the store.
	pub timeout: Option<Duration>,
}

/// Evaluation configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluationConfigLayer {
	#[serde(default)]
	pub timeout_ms: Option<u64>,
}

impl EvaluationConfigLayer {
	pub fn merge(&mut self, other: EvaluationConfigLayer) {
		if other.timeout_ms.is_some() {
			self.timeout_ms = other.timeout_ms;
		}
	}

	/// A timeout of zero disables the bound.
	pub fn finalize(self) -> EvaluationConfig {
		EvaluationConfig {
			timeout: self
				.timeout_ms
				.filter(|ms| *ms > 0)
				.map(Duration::from_millis),
		}
	}
}
