// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod eval;
pub mod flags;
pub mod salt;
pub mod users;

use serde::Serialize;

use crate::cli::Command;
use crate::context::CliContext;

pub async fn dispatch(command: Command, ctx: &CliContext) -> anyhow::Result<()> {
	match command {
		Command::List => flags::handle_list(ctx).await,
		Command::Get(args) => flags::handle_get(args, ctx).await,
		Command::Enable(args) => flags::handle_enable(args, ctx).await,
		Command::Disable(args) => flags::handle_disable(args, ctx).await,
		Command::Set(args) => flags::handle_set(args, ctx).await,
		Command::Delete(args) => flags::handle_delete(args, ctx).await,
		Command::User(args) => users::handle_set(args, ctx).await,
		Command::RemoveUser(args) => users::handle_remove(args, ctx).await,
		Command::Eval(args) => eval::handle_eval(args, ctx).await,
		Command::InitSalt(args) => salt::handle_init(args, ctx).await,
		Command::ResetSalt => salt::handle_reset(ctx).await,
	}
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}
