// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for storage operations.

use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	#[error("not found")]
	NotFound,

	#[error("bad range")]
	BadRange,

	#[error("storage is closed")]
	Closed,

	#[error("storage io error: {0}")]
	Io(#[from] sled::Error),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}
