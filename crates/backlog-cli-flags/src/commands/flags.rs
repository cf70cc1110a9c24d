// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use anyhow::Context;
use backlog_server_flags::FlagConfig;
use console::style;
use serde_json::json;
use tracing::instrument;

use super::print_json;
use crate::cli::{EnableArgs, FlagArgs, SetArgs};
use crate::context::CliContext;

#[instrument(skip(ctx))]
pub async fn handle_list(ctx: &CliContext) -> anyhow::Result<()> {
	let flags = ctx.admin.list_flags().await?;

	if ctx.json {
		return print_json(&flags);
	}

	if flags.is_empty() {
		println!(
			"{} No flags in {}",
			style("!").yellow().bold(),
			style(ctx.admin.environment()).cyan()
		);
		return Ok(());
	}

	for (name, config) in &flags {
		println!("{} {}", state_marker(config), style(name).bold());
		print_details(config);
	}
	Ok(())
}

#[instrument(skip(ctx))]
pub async fn handle_get(args: FlagArgs, ctx: &CliContext) -> anyhow::Result<()> {
	let config = ctx.admin.get_flag(&args.flag).await?;

	if ctx.json {
		return print_json(&config);
	}

	match config {
		Some(config) => {
			println!("{} {}", state_marker(&config), style(&args.flag).bold());
			print_details(&config);
		}
		None => println!(
			"{} Flag {} not found in {}",
			style("!").yellow().bold(),
			style(&args.flag).bold(),
			style(ctx.admin.environment()).cyan()
		),
	}
	Ok(())
}

#[instrument(skip(ctx))]
pub async fn handle_enable(args: EnableArgs, ctx: &CliContext) -> anyhow::Result<()> {
	let config = ctx.admin.enable_flag(&args.flag, args.rollout).await?;

	if ctx.json {
		return print_json(&config);
	}

	println!("{} Enabled {}", style("✓").green().bold(), style(&args.flag).bold());
	print_details(&config);
	Ok(())
}

#[instrument(skip(ctx))]
pub async fn handle_disable(args: FlagArgs, ctx: &CliContext) -> anyhow::Result<()> {
	let config = ctx.admin.disable_flag(&args.flag).await?;

	if ctx.json {
		return print_json(&config);
	}

	println!("{} Disabled {}", style("✓").green().bold(), style(&args.flag).bold());
	Ok(())
}

#[instrument(skip(ctx, args), fields(flag = %args.flag))]
pub async fn handle_set(args: SetArgs, ctx: &CliContext) -> anyhow::Result<()> {
	let config = parse_config(&args.config)?;
	ctx.admin.set_flag(&args.flag, &config).await?;

	if ctx.json {
		return print_json(&config);
	}

	println!("{} Stored {}", style("✓").green().bold(), style(&args.flag).bold());
	print_details(&config);
	Ok(())
}

#[instrument(skip(ctx))]
pub async fn handle_delete(args: FlagArgs, ctx: &CliContext) -> anyhow::Result<()> {
	ctx.admin.delete_flag(&args.flag).await?;

	if ctx.json {
		return print_json(&json!({ "deleted": args.flag }));
	}

	println!("{} Deleted {}", style("✓").green().bold(), style(&args.flag).bold());
	Ok(())
}

pub(crate) fn parse_config(raw: &str) -> anyhow::Result<FlagConfig> {
	serde_json::from_str(raw).context("flag configuration is not valid JSON")
}

fn state_marker(config: &FlagConfig) -> console::StyledObject<&'static str> {
	if config.enabled {
		style("●").green()
	} else {
		style("○").dim()
	}
}

fn print_details(config: &FlagConfig) {
	if let Some(percentage) = config.rollout_percentage {
		println!("  Rollout:     {}%", style(percentage).cyan());
	}
	if let Some(environments) = &config.environments {
		let names: Vec<&str> = environments.iter().map(String::as_str).collect();
		println!("  Envs:        {}", style(names.join(", ")).cyan());
	}
	if !config.user_whitelist.is_empty() {
		println!("  Whitelisted: {}", config.user_whitelist.len());
	}
	if !config.user_blacklist.is_empty() {
		println!("  Blacklisted: {}", config.user_blacklist.len());
	}
	if let Some(variants) = config.weighted_variants() {
		for variant in variants.iter() {
			println!("  Variant:     {} ({})", style(&variant.name).cyan(), variant.weight);
		}
	} else if let Some(variant) = &config.variant {
		println!("  Variant:     {}", style(variant).cyan());
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use backlog_server_config::FlagsConfig;
	use backlog_server_flags::MemoryStore;

	use super::*;

	fn context() -> CliContext {
		CliContext::new(Arc::new(MemoryStore::new()), &FlagsConfig::default(), true).unwrap()
	}

	#[test]
	fn test_parse_config_accepts_camel_case() {
		let config = parse_config(r#"{"enabled":true,"rolloutPercentage":25,"userWhitelist":["alice"]}"#).unwrap();
		assert!(config.enabled);
		assert_eq!(config.rollout_percentage, Some(25));
		assert!(config.is_whitelisted("alice"));
	}

	#[test]
	fn test_parse_config_rejects_garbage() {
		assert!(parse_config("{enabled").is_err());
	}

	#[tokio::test]
	async fn test_enable_then_disable_keeps_rollout() {
		let ctx = context();
		handle_enable(
			EnableArgs {
				flag: "checkout".to_string(),
				rollout: Some(40),
			},
			&ctx,
		)
		.await
		.unwrap();
		handle_disable(
			FlagArgs {
				flag: "checkout".to_string(),
			},
			&ctx,
		)
		.await
		.unwrap();

		let config = ctx.admin.get_flag("checkout").await.unwrap().unwrap();
		assert!(!config.enabled);
		assert_eq!(config.rollout_percentage, Some(40));
	}

	#[tokio::test]
	async fn test_set_rejects_invalid_config() {
		let ctx = context();
		let result = handle_set(
			SetArgs {
				flag: "checkout".to_string(),
				config: r#"{"enabled":true,"rolloutPercentage":150}"#.to_string(),
			},
			&ctx,
		)
		.await;

		assert!(result.is_err());
		assert!(ctx.admin.get_flag("checkout").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_delete_removes_flag() {
		let ctx = context();
		handle_set(
			SetArgs {
				flag: "checkout".to_string(),
				config: r#"{"enabled":true}"#.to_string(),
			},
			&ctx,
		)
		.await
		.unwrap();
		handle_delete(
			FlagArgs {
				flag: "checkout".to_string(),
			},
			&ctx,
		)
		.await
		.unwrap();

		assert!(ctx.admin.list_flags().await.unwrap().is_empty());
	}
}
