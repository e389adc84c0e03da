// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	ReadFile {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file {path}: {source}")]
	ParseFile {
		path: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("invalid value for {key}: {value}")]
	InvalidEnvValue { key: &'static str, value: String },

	#[error("invalid storage engine: {0} (expected one of: dummy, boltdb)")]
	InvalidStorageEngine(String),
}
