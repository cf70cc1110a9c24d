// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sha2::{Digest, Sha256};

/// Hash context used for variant selection; rollout inclusion uses the flag name.
pub const VARIANT_SELECTION_CONTEXT: &str = "variant_selection";

pub const BUCKET_COUNT: u32 = 100;

/// Maps `(user_id, context, salt)` to a stable bucket in `0..100`.
///
/// SHA-256 over `"{user_id}:{context}:{salt}"`, first four digest bytes read
/// as a big-endian `u32`, reduced modulo 100. Any implementation hashing the
/// same string gets the same bucket.
pub fn rollout_bucket(user_id: &str, context: &str, salt: &str) -> u32 {
	let mut hasher = Sha256::new();
	hasher.update(user_id.as_bytes());
	hasher.update(b":");
	hasher.update(context.as_bytes());
	hasher.update(b":");
	hasher.update(salt.as_bytes());
	let digest = hasher.finalize();

	let prefix = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
	prefix % BUCKET_COUNT
}

/// Whether a bucket falls inside a rollout percentage.
pub fn in_rollout(bucket: u32, percentage: u32) -> bool {
	bucket < percentage
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_reference_vectors() {
		// sha256("u1:flagname:S") starts with e2 29 26 f2 = 3794347762
		assert_eq!(rollout_bucket("u1", "flagname", "S"), 62);
		assert_eq!(rollout_bucket("u2", "checkout", "S"), 80);
		assert_eq!(rollout_bucket("alice", VARIANT_SELECTION_CONTEXT, "S"), 43);
	}

	#[test]
	fn test_high_bit_prefix_is_unsigned() {
		// A signed reading of e22926f2 would give 34 instead of 62.
		assert_ne!(rollout_bucket("u1", "flagname", "S"), 34);
	}

	#[test]
	fn test_distribution_is_roughly_uniform() {
		let included = (0..1000)
			.filter(|i| in_rollout(rollout_bucket(&format!("user-{i}"), "rollout_flag", "fixed-salt"), 30))
			.count();
		assert!((200..=400).contains(&included), "included {included} of 1000");
	}

	#[test]
	fn test_context_separates_decisions() {
		let differing = (0..200)
			.filter(|i| {
				let user = format!("user-{i}");
				rollout_bucket(&user, "checkout", "salt")
					!= rollout_bucket(&user, VARIANT_SELECTION_CONTEXT, "salt")
			})
			.count();
		assert!(differing > 150);
	}

	#[test]
	fn test_percentage_zero_excludes_all() {
		for i in 0..100 {
			let bucket = rollout_bucket(&format!("user{i}"), "test.feature", "salt");
			assert!(!in_rollout(bucket, 0));
		}
	}

	#[test]
	fn test_percentage_hundred_includes_all() {
		for i in 0..100 {
			let bucket = rollout_bucket(&format!("user{i}"), "test.feature", "salt");
			assert!(in_rollout(bucket, 100));
		}
	}

	proptest! {
		#[test]
		fn bucket_is_deterministic(user_id in "[a-zA-Z0-9]{1,50}", context in "[a-z][a-z0-9_.]{2,49}", salt in "[a-f0-9-]{36}") {
			prop_assert_eq!(
				rollout_bucket(&user_id, &context, &salt),
				rollout_bucket(&user_id, &context, &salt)
			);
		}

		#[test]
		fn bucket_is_in_range(user_id in ".{0,40}", context in ".{0,40}", salt in ".{0,40}") {
			prop_assert!(rollout_bucket(&user_id, &context, &salt) < BUCKET_COUNT);
		}

		#[test]
		fn rollout_is_monotonic(user_id in "[a-zA-Z0-9]{1,50}", flag in "[a-z][a-z0-9_.]{2,49}") {
			let bucket = rollout_bucket(&user_id, &flag, "salt");
			for pct in 0..=100u32 {
				if in_rollout(bucket, pct) {
					for higher in pct..=100 {
						prop_assert!(in_rollout(bucket, higher));
					}
					break;
				}
			}
		}
	}
}
