// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Backlog feature flags engine.
//!
//! This crate holds everything that does not touch storage: the stored
//! [`FlagConfig`] record, the [`FlagResult`] produced by evaluation, the key
//! grammar used in the key-value store, and the consistent hash used for
//! percentage rollout and variant selection. The engine itself lives in
//! `backlog-server-flags`.
//!
//! # Example
//!
//! ```
//! use backlog_flags_core::{rollout_bucket, FlagConfig, FlagKeys};
//!
//! let config = FlagConfig::new(true)
//!     .with_rollout_percentage(50)
//!     .with_weighted_variant("control", 50.0)
//!     .with_weighted_variant("treatment", 50.0);
//! assert!(config.validate().is_ok());
//!
//! let keys = FlagKeys::new("prod");
//! assert_eq!(keys.flag("checkout"), "feature:prod:checkout");
//!
//! assert!(rollout_bucket("user123", "checkout", "salt") < 100);
//! ```

pub mod environment;
pub mod error;
pub mod evaluation;
pub mod flag;
pub mod keys;
pub mod rollout;

pub use environment::Environment;
pub use error::{FlagsError, Result};
pub use evaluation::{
	EvaluationReason, FlagResult, DEFAULT_VARIANT, VARIANT_DISABLED, VARIANT_ENABLED,
};
pub use flag::{FlagConfig, VariantWeight, Variants};
pub use keys::FlagKeys;
pub use rollout::{in_rollout, rollout_bucket, BUCKET_COUNT, VARIANT_SELECTION_CONTEXT};
