// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use console::style;
use tracing::instrument;

use super::print_json;
use crate::cli::EvalArgs;
use crate::context::CliContext;

#[instrument(skip(ctx))]
pub async fn handle_eval(args: EvalArgs, ctx: &CliContext) -> anyhow::Result<()> {
	let result = ctx
		.evaluator
		.evaluate(
			&args.flag,
			args.user.as_deref(),
			args.default_enabled,
			&args.default_variant,
		)
		.await;

	if ctx.json {
		return print_json(&result);
	}

	let state = if result.enabled {
		style("enabled").green().bold()
	} else {
		style("disabled").red().bold()
	};
	println!("{} is {}", style(&args.flag).bold(), state);
	println!("  Variant: {}", style(&result.variant).cyan());
	let reason = if result.reason.is_fallback() {
		style(result.reason.as_str()).yellow()
	} else {
		style(result.reason.as_str()).dim()
	};
	println!("  Reason:  {reason}");
	Ok(())
}
