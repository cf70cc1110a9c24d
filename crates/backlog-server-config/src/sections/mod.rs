// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod evaluation;
mod logging;
mod store;

pub use evaluation::{EvaluationConfig, EvaluationConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use store::{StoreBackend, StoreConfig, StoreConfigLayer};
