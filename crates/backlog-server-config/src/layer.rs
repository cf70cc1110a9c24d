// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Deserialize;

use crate::sections::{EvaluationConfigLayer, LoggingConfigLayer, StoreConfigLayer};

/// Partial configuration as read from one source.
///
/// Every field is optional so that a later source only overrides what it
/// actually sets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlagsConfigLayer {
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub store: Option<StoreConfigLayer>,
	#[serde(default)]
	pub evaluation: Option<EvaluationConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl FlagsConfigLayer {
	pub fn merge(&mut self, other: FlagsConfigLayer) {
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		merge_section(&mut self.store, other.store, StoreConfigLayer::merge);
		merge_section(
			&mut self.evaluation,
			other.evaluation,
			EvaluationConfigLayer::merge,
		);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(target: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	match (target.as_mut(), other) {
		(Some(existing), Some(other)) => merge(existing, other),
		(None, Some(other)) => *target = Some(other),
		(_, None) => {}
	}
}
