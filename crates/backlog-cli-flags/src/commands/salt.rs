// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use console::style;
use serde_json::json;
use tracing::instrument;

use super::print_json;
use crate::cli::InitSaltArgs;
use crate::context::CliContext;

#[instrument(skip(ctx, args), fields(force = args.force))]
pub async fn handle_init(args: InitSaltArgs, ctx: &CliContext) -> anyhow::Result<()> {
	let created = match (&args.value, args.force) {
		(Some(value), true) => {
			ctx.admin.install_rollout_salt(value).await?;
			true
		}
		(value, _) => ctx.admin.init_rollout_salt(value.as_deref()).await?.1,
	};

	if ctx.json {
		return print_json(&json!({ "environment": ctx.admin.environment(), "created": created }));
	}

	if created {
		println!(
			"{} Rollout salt created for {}",
			style("✓").green().bold(),
			style(ctx.admin.environment()).cyan()
		);
	} else {
		println!(
			"{} Rollout salt already exists for {}; left unchanged",
			style("!").yellow().bold(),
			style(ctx.admin.environment()).cyan()
		);
	}
	Ok(())
}

#[instrument(skip(ctx))]
pub async fn handle_reset(ctx: &CliContext) -> anyhow::Result<()> {
	ctx.admin.reset_rollout_salt().await?;

	if ctx.json {
		return print_json(&json!({ "environment": ctx.admin.environment(), "saltReset": true }));
	}

	println!(
		"{} Rollout salt deleted for {}",
		style("✓").green().bold(),
		style(ctx.admin.environment()).cyan()
	);
	println!("  A new salt is created on next use; every percentage rollout will be reshuffled.");
	Ok(())
}
