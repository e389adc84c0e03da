// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration: a JSON file (path from `KHRONOS_CONFIG_FILE`)
//! merged with environment overrides, each env var taking precedence over
//! the file when both are present.

use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::storage_engine::StorageEngine;

const ENV_CONFIG_FILE: &str = "KHRONOS_CONFIG_FILE";

/// Fully resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
	pub result_buffer_len: usize,
	pub storage_engine: StorageEngine,
	pub boltdb_path: PathBuf,
	pub boltdb_timeout_seconds: u64,
	pub dont_schedule_jobs_on_start: bool,
	pub api_resources_per_page: usize,
	pub api_disable_security: bool,
	pub http_port: u16,
	pub log_level: String,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			result_buffer_len: 100,
			storage_engine: StorageEngine::Boltdb,
			boltdb_path: PathBuf::from("data/khronos.db"),
			boltdb_timeout_seconds: 1,
			dont_schedule_jobs_on_start: false,
			api_resources_per_page: 20,
			api_disable_security: false,
			http_port: 8080,
			log_level: "info".to_string(),
		}
	}
}

/// The JSON file shape: every field optional, so a file only needs to
/// mention the settings it overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialConfig {
	result_buffer_len: Option<usize>,
	storage_engine: Option<StorageEngine>,
	boltdb_path: Option<PathBuf>,
	boltdb_timeout_seconds: Option<u64>,
	dont_schedule_jobs_on_start: Option<bool>,
	api_resources_per_page: Option<usize>,
	api_disable_security: Option<bool>,
	http_port: Option<u16>,
	log_level: Option<String>,
}

impl AppConfig {
	/// Loads configuration: defaults, overridden by the JSON file named by
	/// `KHRONOS_CONFIG_FILE` (if set), overridden in turn by individual
	/// `KHRONOS_*`/`BOLTDB_*` environment variables.
	pub fn load() -> Result<Self> {
		let mut cfg = Self::default();

		if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
			cfg.apply_file(&path)?;
		}

		cfg.apply_env()?;
		Ok(cfg)
	}

	fn apply_file(&mut self, path: &str) -> Result<()> {
		let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
			path: path.to_string(),
			source,
		})?;
		let partial: PartialConfig =
			serde_json::from_str(&contents).map_err(|source| ConfigError::ParseFile {
				path: path.to_string(),
				source,
			})?;

		if let Some(v) = partial.result_buffer_len {
			self.result_buffer_len = v;
		}
		if let Some(v) = partial.storage_engine {
			self.storage_engine = v;
		}
		if let Some(v) = partial.boltdb_path {
			self.boltdb_path = v;
		}
		if let Some(v) = partial.boltdb_timeout_seconds {
			self.boltdb_timeout_seconds = v;
		}
		if let Some(v) = partial.dont_schedule_jobs_on_start {
			self.dont_schedule_jobs_on_start = v;
		}
		if let Some(v) = partial.api_resources_per_page {
			self.api_resources_per_page = v;
		}
		if let Some(v) = partial.api_disable_security {
			self.api_disable_security = v;
		}
		if let Some(v) = partial.http_port {
			self.http_port = v;
		}
		if let Some(v) = partial.log_level {
			self.log_level = v;
		}

		tracing::info!(path, "loaded configuration file");
		Ok(())
	}

	fn apply_env(&mut self) -> Result<()> {
		parse_env("KHRONOS_RESULT_BUFFER_LEN", &mut self.result_buffer_len)?;
		parse_env_with("KHRONOS_STORAGE_ENGINE", &mut self.storage_engine, StorageEngine::from_str)?;
		parse_env_string("BOLTDB_PATH", &mut self.boltdb_path)?;
		parse_env("BOLTDB_TIMEOUT_SECONDS", &mut self.boltdb_timeout_seconds)?;
		parse_env("KHRONOS_DONT_SCHEDULE_JOBS_ON_START", &mut self.dont_schedule_jobs_on_start)?;
		parse_env("KHRONOS_API_RESOURCES_PER_PAGE", &mut self.api_resources_per_page)?;
		parse_env("KHRONOS_API_DISABLE_SECURITY", &mut self.api_disable_security)?;
		parse_env("KHRONOS_HTTP_PORT", &mut self.http_port)?;
		if let Ok(v) = std::env::var("KHRONOS_LOG_LEVEL") {
			self.log_level = v;
		}

		tracing::debug!(
			result_buffer_len = self.result_buffer_len,
			storage_engine = ?self.storage_engine,
			"using '{:?}' storage engine with result buffer length {}",
			self.storage_engine,
			self.result_buffer_len,
		);
		Ok(())
	}
}

fn parse_env<T>(key: &'static str, target: &mut T) -> Result<()>
where
	T: FromStr,
{
	parse_env_with(key, target, |s| {
		T::from_str(s).map_err(|_| ConfigError::InvalidEnvValue {
			key,
			value: s.to_string(),
		})
	})
}

fn parse_env_with<T>(
	key: &'static str,
	target: &mut T,
	parse: impl FnOnce(&str) -> Result<T>,
) -> Result<()> {
	if let Ok(value) = std::env::var(key) {
		*target = parse(&value)?;
	}
	Ok(())
}

fn parse_env_string(key: &'static str, target: &mut PathBuf) -> Result<()> {
	if let Ok(value) = std::env::var(key) {
		*target = PathBuf::from(value);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Mutex;

	// Environment variables are process-global; serialize the tests that touch them.
	static ENV_LOCK: Mutex<()> = Mutex::new(());

	fn clear_all() {
		for key in [
			ENV_CONFIG_FILE,
			"KHRONOS_RESULT_BUFFER_LEN",
			"KHRONOS_STORAGE_ENGINE",
			"BOLTDB_PATH",
			"BOLTDB_TIMEOUT_SECONDS",
			"KHRONOS_DONT_SCHEDULE_JOBS_ON_START",
			"KHRONOS_API_RESOURCES_PER_PAGE",
			"KHRONOS_API_DISABLE_SECURITY",
			"KHRONOS_HTTP_PORT",
			"KHRONOS_LOG_LEVEL",
		] {
			std::env::remove_var(key);
		}
	}

	#[test]
	fn defaults_match_upstream() {
		let _guard = ENV_LOCK.lock().unwrap();
		clear_all();
		let cfg = AppConfig::load().unwrap();
		assert_eq!(cfg, AppConfig::default());
		assert_eq!(cfg.result_buffer_len, 100);
		assert_eq!(cfg.storage_engine, StorageEngine::Boltdb);
	}

	#[test]
	fn env_var_overrides_default() {
		let _guard = ENV_LOCK.lock().unwrap();
		clear_all();
		std::env::set_var("KHRONOS_RESULT_BUFFER_LEN", "250");
		std::env::set_var("KHRONOS_STORAGE_ENGINE", "dummy");
		let cfg = AppConfig::load().unwrap();
		assert_eq!(cfg.result_buffer_len, 250);
		assert_eq!(cfg.storage_engine, StorageEngine::Dummy);
		clear_all();
	}

	#[test]
	fn env_var_overrides_file_value() {
		let _guard = ENV_LOCK.lock().unwrap();
		clear_all();
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("khronos.json");
		std::fs::write(&path, r#"{"resultBufferLen": 5, "storageEngine": "dummy"}"#).unwrap();
		std::env::set_var(ENV_CONFIG_FILE, &path);
		std::env::set_var("KHRONOS_RESULT_BUFFER_LEN", "42");

		let cfg = AppConfig::load().unwrap();
		assert_eq!(cfg.result_buffer_len, 42, "env wins over file");
		assert_eq!(cfg.storage_engine, StorageEngine::Dummy, "file value kept when no env override");
		clear_all();
	}

	#[test]
	fn rejects_invalid_storage_engine() {
		let _guard = ENV_LOCK.lock().unwrap();
		clear_all();
		std::env::set_var("KHRONOS_STORAGE_ENGINE", "postgres");
		assert!(matches!(
			AppConfig::load(),
			Err(ConfigError::InvalidStorageEngine(ref v)) if v == "postgres"
		));
		clear_all();
	}
}
