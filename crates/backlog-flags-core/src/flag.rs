// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeSet;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FlagsError, Result};
use crate::keys::{RESERVED_GLOBAL_SEGMENT, USER_OVERRIDE_INFIX};

/// Stored configuration for one flag in one environment.
///
/// Serialized as a JSON object with camelCase field names, which is the
/// format every other reader of the key-value store expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagConfig {
	/// Master switch.
	#[serde(default)]
	pub enabled: bool,
	/// Share of non-listed users admitted, 0..=100.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rollout_percentage: Option<u32>,
	#[serde(
		default,
		deserialize_with = "null_as_empty",
		skip_serializing_if = "BTreeSet::is_empty"
	)]
	pub user_whitelist: BTreeSet<String>,
	#[serde(
		default,
		deserialize_with = "null_as_empty",
		skip_serializing_if = "BTreeSet::is_empty"
	)]
	pub user_blacklist: BTreeSet<String>,
	/// `None` means every environment.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub environments: Option<BTreeSet<String>>,
	/// Fixed variant used when `variants` is absent or empty.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub variant: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub variants: Option<Variants>,
}

impl FlagConfig {
	pub fn new(enabled: bool) -> Self {
		Self {
			enabled,
			..Default::default()
		}
	}

	pub fn with_rollout_percentage(mut self, percentage: u32) -> Self {
		self.rollout_percentage = Some(percentage);
		self
	}

	pub fn with_whitelisted_user(mut self, user_id: impl Into<String>) -> Self {
		self.user_whitelist.insert(user_id.into());
		self
	}

	pub fn with_blacklisted_user(mut self, user_id: impl Into<String>) -> Self {
		self.user_blacklist.insert(user_id.into());
		self
	}

	pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
		self.environments
			.get_or_insert_with(BTreeSet::new)
			.insert(environment.into());
		self
	}

	pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
		self.variant = Some(variant.into());
		self
	}

	pub fn with_weighted_variant(mut self, name: impl Into<String>, weight: f64) -> Self {
		self.variants
			.get_or_insert_with(Variants::new)
			.insert(name, weight);
		self
	}

	/// Whether the flag may evaluate truthy in `environment`.
	pub fn allows_environment(&self, environment: &str) -> bool {
		self.environments
			.as_ref()
			.map_or(true, |envs| envs.contains(environment))
	}

	pub fn is_blacklisted(&self, user_id: &str) -> bool {
		self.user_blacklist.contains(user_id)
	}

	pub fn is_whitelisted(&self, user_id: &str) -> bool {
		self.user_whitelist.contains(user_id)
	}

	/// Weighted variants, if any are configured.
	pub fn weighted_variants(&self) -> Option<&Variants> {
		self.variants.as_ref().filter(|v| !v.is_empty())
	}

	/// Variant reported when no weighted selection applies.
	pub fn fixed_variant(&self) -> String {
		match &self.variant {
			Some(variant) => variant.clone(),
			None if self.enabled => crate::VARIANT_ENABLED.to_string(),
			None => crate::VARIANT_DISABLED.to_string(),
		}
	}

	/// Checks the values an admin is allowed to write.
	pub fn validate(&self) -> Result<()> {
		if let Some(percentage) = self.rollout_percentage {
			if percentage > 100 {
				return Err(FlagsError::InvalidRolloutPercentage(percentage));
			}
		}

		if let Some(variants) = &self.variants {
			for v in variants.iter() {
				if !v.weight.is_finite() || v.weight < 0.0 {
					return Err(FlagsError::InvalidVariantWeight {
						name: v.name.clone(),
						weight: v.weight,
					});
				}
			}
		}

		Ok(())
	}

	/// Validates a flag name against the key grammar.
	///
	/// Names must be non-empty, free of whitespace and control characters,
	/// must not contain the override infix and must not collide with the
	/// reserved `global` segment that holds the rollout salt.
	pub fn validate_name(name: &str) -> bool {
		if name.is_empty() || name.len() > 200 {
			return false;
		}

		if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
			return false;
		}

		if name.contains(USER_OVERRIDE_INFIX) {
			return false;
		}

		if name.ends_with(":users") {
			return false;
		}

		name != RESERVED_GLOBAL_SEGMENT && !name.starts_with(&format!("{RESERVED_GLOBAL_SEGMENT}:"))
	}

	pub fn ensure_valid_name(name: &str) -> Result<()> {
		if Self::validate_name(name) {
			Ok(())
		} else {
			Err(FlagsError::InvalidFlagName(name.to_string()))
		}
	}
}

/// Other writers store `null` for an empty user list.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<BTreeSet<String>, D::Error> {
	Ok(Option::<BTreeSet<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single weighted experiment arm.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantWeight {
	pub name: String,
	/// Percentage weight; weights should add up to 100 for full coverage.
	pub weight: f64,
}

/// Ordered variant name to weight mapping.
///
/// Order is the insertion order of the stored JSON object and drives the
/// cumulative walk in [`Variants::pick`], so it is preserved through
/// (de)serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variants(Vec<VariantWeight>);

impl Variants {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a variant, replacing the weight in place if the name exists.
	pub fn insert(&mut self, name: impl Into<String>, weight: f64) {
		let name = name.into();
		match self.0.iter_mut().find(|v| v.name == name) {
			Some(existing) => existing.weight = weight,
			None => self.0.push(VariantWeight { name, weight }),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &VariantWeight> {
		self.0.iter()
	}

	pub fn first_name(&self) -> Option<&str> {
		self.0.first().map(|v| v.name.as_str())
	}

	pub fn total_weight(&self) -> f64 {
		self.0.iter().map(|v| v.weight).sum()
	}

	/// Returns the first variant whose cumulative weight exceeds `bucket`.
	///
	/// Falls back to the first variant when the weights sum below the bucket.
	pub fn pick(&self, bucket: u32) -> Option<&str> {
		let bucket = f64::from(bucket);
		let mut cumulative = 0.0;

		for variant in &self.0 {
			cumulative += variant.weight;
			if bucket < cumulative {
				return Some(&variant.name);
			}
		}

		self.first_name()
	}
}

impl<N: Into<String>> FromIterator<(N, f64)> for Variants {
	fn from_iter<I: IntoIterator<Item = (N, f64)>>(iter: I) -> Self {
		let mut variants = Variants::new();
		for (name, weight) in iter {
			variants.insert(name, weight);
		}
		variants
	}
}

impl Serialize for Variants {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.0.len()))?;
		for variant in &self.0 {
			map.serialize_entry(&variant.name, &variant.weight)?;
		}
		map.end()
	}
}

impl<'de> Deserialize<'de> for Variants {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		struct VariantsVisitor;

		impl<'de> Visitor<'de> for VariantsVisitor {
			type Value = Variants;

			fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str("a map of variant name to percentage weight")
			}

			fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Variants, A::Error> {
				let mut variants = Variants::new();
				while let Some((name, weight)) = access.next_entry::<String, f64>()? {
					variants.insert(name, weight);
				}
				Ok(variants)
			}
		}

		deserializer.deserialize_map(VariantsVisitor)
	}
}
