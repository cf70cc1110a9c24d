// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `backlog-flags`: manage and evaluate feature flags from the shell.

pub mod cli;
pub mod commands;
pub mod context;
pub mod logging;

pub use context::CliContext;

use backlog_server_config::FlagsConfig;

/// Loads configuration from the `--config` file (or the system file) and
/// applies `--env` on top.
pub fn resolve_config(cli: &cli::Cli) -> anyhow::Result<FlagsConfig> {
	let mut config = match &cli.config {
		Some(path) => backlog_server_config::load_config_with_file(path.clone())?,
		None => backlog_server_config::load_config()?,
	};
	if let Some(environment) = &cli.env {
		config.environment = environment.clone();
	}
	Ok(config)
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use clap::Parser;

	use super::*;

	#[test]
	fn test_resolve_config_applies_env_flag() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "environment = \"staging\"\n[store]\nbackend = \"memory\"").unwrap();
		let path = file.path().to_str().unwrap();

		let cli = cli::Cli::try_parse_from(["backlog-flags", "--config", path, "list"]).unwrap();
		let config = resolve_config(&cli).unwrap();
		assert_eq!(config.environment, "staging");
		assert_eq!(config.store.backend, backlog_server_config::StoreBackend::Memory);

		let cli = cli::Cli::try_parse_from(["backlog-flags", "--config", path, "--env", "dev", "list"]).unwrap();
		assert_eq!(resolve_config(&cli).unwrap().environment, "dev");
	}
}
