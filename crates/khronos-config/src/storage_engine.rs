// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The selectable storage backends, mirroring `ValidStorageEngines` upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngine {
	Dummy,
	Boltdb,
}

impl FromStr for StorageEngine {
	type Err = ConfigError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s {
			"dummy" => Ok(Self::Dummy),
			"boltdb" => Ok(Self::Boltdb),
			other => Err(ConfigError::InvalidStorageEngine(other.to_string())),
		}
	}
}

impl Default for StorageEngine {
	fn default() -> Self {
		Self::Boltdb
	}
}
