// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use backlog_server_config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable.
///
/// `RUST_LOG` wins over `level_override`, which wins over the configured level.
pub fn init(config: &LoggingConfig, level_override: Option<&str>) {
	let directive = level_override.unwrap_or(&config.level);
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

	if config.json {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().compact().with_writer(std::io::stderr))
			.init();
	}
}
