// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use khronos_engine::CronEngine;
use khronos_storage::{Storage, TokenStore};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
	pub storage: Arc<dyn Storage>,
	pub tokens: Arc<dyn TokenStore>,
	pub engine: Arc<CronEngine>,
	pub resources_per_page: u64,
	pub security_disabled: bool,
}
