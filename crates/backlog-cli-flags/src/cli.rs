// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Backlog feature flags
#[derive(Parser, Debug)]
#[command(name = "backlog-flags", version, about, long_about = None)]
pub struct Cli {
	/// Path to custom configuration file
	#[arg(short, long, global = true)]
	pub config: Option<PathBuf>,

	/// Environment to operate in (overrides config)
	#[arg(short, long, global = true)]
	pub env: Option<String>,

	/// Log level or filter directive (overrides config)
	#[arg(short, long, global = true)]
	pub log_level: Option<String>,

	/// Print results as JSON
	#[arg(long, global = true)]
	pub json: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// List every flag in the environment
	List,
	/// Show one flag's configuration
	Get(FlagArgs),
	/// Enable a flag, optionally setting its rollout percentage
	Enable(EnableArgs),
	/// Disable a flag, keeping the rest of its configuration
	Disable(FlagArgs),
	/// Replace a flag's configuration with a JSON document
	Set(SetArgs),
	/// Delete a flag's configuration
	Delete(FlagArgs),
	/// Force a flag on or off for one user
	User(UserOverrideArgs),
	/// Remove a user's override for a flag
	RemoveUser(UserArgs),
	/// Evaluate a flag
	Eval(EvalArgs),
	/// Create the rollout salt ahead of traffic if it does not exist yet
	InitSalt(InitSaltArgs),
	/// Delete the rollout salt; a new one is created on next use, reshuffling every percentage rollout
	ResetSalt,
}

#[derive(Debug, Clone, Args)]
pub struct InitSaltArgs {
	/// Salt to store instead of a random one
	#[arg(long)]
	pub value: Option<String>,

	/// Overwrite an existing salt with --value
	#[arg(long, requires = "value")]
	pub force: bool,
}

#[derive(Debug, Clone, Args)]
pub struct FlagArgs {
	/// Flag name
	pub flag: String,
}

#[derive(Debug, Clone, Args)]
pub struct EnableArgs {
	/// Flag name
	pub flag: String,

	/// Percentage of users (0-100) that should see the flag
	#[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
	pub rollout: Option<u32>,
}

#[derive(Debug, Clone, Args)]
pub struct SetArgs {
	/// Flag name
	pub flag: String,

	/// Flag configuration, e.g. '{"enabled":true,"rolloutPercentage":25}'
	pub config: String,
}

#[derive(Debug, Clone, Args)]
pub struct UserArgs {
	/// Flag name
	pub flag: String,

	/// User ID
	pub user: String,
}

#[derive(Debug, Clone, Args)]
pub struct UserOverrideArgs {
	/// Flag name
	pub flag: String,

	/// User ID
	pub user: String,

	/// Forced value: true or false
	#[arg(action = clap::ArgAction::Set)]
	pub enabled: bool,
}

#[derive(Debug, Clone, Args)]
pub struct EvalArgs {
	/// Flag name
	pub flag: String,

	/// User to evaluate for; rollouts only apply when set
	#[arg(short, long)]
	pub user: Option<String>,

	/// Value to fall back to when the flag is missing or unreadable
	#[arg(long = "default")]
	pub default_enabled: bool,

	/// Variant to fall back to when the flag is missing or unreadable
	#[arg(long, default_value = backlog_server_flags::DEFAULT_VARIANT)]
	pub default_variant: String,
}
