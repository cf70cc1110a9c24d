// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use thiserror::Error;

/// Errors raised by the flag engine's storage and admin paths.
///
/// Evaluation never surfaces these; they are folded into
/// `evaluation_error` results.
#[derive(Debug, Error)]
pub enum FlagsServerError {
	#[error(transparent)]
	Core(#[from] backlog_flags_core::FlagsError),

	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("store unavailable: {0}")]
	Store(String),

	#[error("evaluation timed out after {0:?}")]
	Timeout(Duration),

	#[error("internal error: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, FlagsServerError>;
