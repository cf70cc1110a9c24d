// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use anyhow::Result;
use clap::Parser;

use backlog_cli_flags::cli::Cli;
use backlog_cli_flags::{commands, logging, resolve_config, CliContext};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = resolve_config(&cli)?;
	logging::init(&config.logging, cli.log_level.as_deref());
	config.log_summary();

	let ctx = CliContext::from_config(&config, cli.json).await?;
	commands::dispatch(cli.command, &ctx).await
}
