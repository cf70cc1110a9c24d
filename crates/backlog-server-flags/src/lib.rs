// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feature flag evaluation and rollout engine for Backlog.
//!
//! The engine runs on any [`KeyValueStore`] and keeps all of its state there
//! except for the in-memory rollout salt cache held by each
//! [`FlagEvaluator`].
//!
//! # Architecture
//!
//! - `store` - The key-value contract plus in-memory and SQLite backends
//! - `config_store` - Flag configs under `feature:{env}:{flag}`
//! - `overrides` - Per-user overrides under `feature:{env}:{flag}:users:{user}`
//! - `salt` - Per-environment rollout salt, created lazily
//! - `evaluator` - The precedence protocol, fail-open to caller defaults
//! - `admin` - Validated writes and listing
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use backlog_server_flags::{FlagAdmin, FlagEvaluator, MemoryStore, KeyValueStore};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
//!
//! let admin = FlagAdmin::new(store.clone(), "prod").unwrap();
//! admin.enable_flag("new_dashboard", Some(25)).await.unwrap();
//!
//! let flags = FlagEvaluator::new(store, "prod").unwrap();
//! let result = flags.evaluate("new_dashboard", Some("user123"), false, "default").await;
//! println!("{} ({})", result.enabled, result.reason);
//! # });
//! ```

pub mod admin;
pub mod config_store;
pub mod error;
pub mod evaluator;
pub mod overrides;
pub mod salt;
pub mod store;

pub use admin::FlagAdmin;
pub use config_store::FlagConfigStore;
pub use error::{FlagsServerError, Result};
pub use evaluator::FlagEvaluator;
pub use overrides::UserOverrideStore;
pub use salt::SaltProvider;
pub use store::{create_pool, KeyValueStore, MemoryStore, SqliteStore};

// Re-export core types for convenience
pub use backlog_flags_core::*;
