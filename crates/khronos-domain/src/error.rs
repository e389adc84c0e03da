// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the domain crate.

use thiserror::Error;

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Errors that can occur while constructing or validating domain types.
#[derive(Debug, Error)]
pub enum DomainError {
	#[error("name must not be empty")]
	EmptyName,

	#[error("When is not a valid cron")]
	InvalidCron,

	#[error("invalid url: {0}")]
	InvalidUrl(#[from] url::ParseError),
}
