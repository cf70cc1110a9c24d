// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use console::style;
use serde_json::json;
use tracing::instrument;

use super::print_json;
use crate::cli::{UserArgs, UserOverrideArgs};
use crate::context::CliContext;

#[instrument(skip(ctx))]
pub async fn handle_set(args: UserOverrideArgs, ctx: &CliContext) -> anyhow::Result<()> {
	ctx.admin
		.set_user_override(&args.flag, &args.user, args.enabled)
		.await?;

	if ctx.json {
		return print_json(&json!({
			"flag": args.flag,
			"user": args.user,
			"enabled": args.enabled,
		}));
	}

	let state = if args.enabled {
		style("on").green()
	} else {
		style("off").red()
	};
	println!(
		"{} {} forced {} for {}",
		style("✓").green().bold(),
		style(&args.flag).bold(),
		state,
		style(&args.user).cyan()
	);
	Ok(())
}

#[instrument(skip(ctx))]
pub async fn handle_remove(args: UserArgs, ctx: &CliContext) -> anyhow::Result<()> {
	ctx.admin.remove_user_override(&args.flag, &args.user).await?;

	if ctx.json {
		return print_json(&json!({ "flag": args.flag, "user": args.user, "removed": true }));
	}

	println!(
		"{} Removed override of {} for {}",
		style("✓").green().bold(),
		style(&args.flag).bold(),
		style(&args.user).cyan()
	);
	Ok(())
}
