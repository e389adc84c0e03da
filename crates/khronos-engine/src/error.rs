// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
	#[error("engine already running")]
	AlreadyRunning,

	#[error("engine not running")]
	NotRunning,

	#[error("invalid when expression: {0}")]
	InvalidWhen(#[from] khronos_domain::DomainError),

	#[error("storage error: {0}")]
	Storage(#[from] khronos_storage::StorageError),
}
