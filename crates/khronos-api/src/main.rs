// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `khronosd` — the Khronos server binary: loads configuration, opens
//! storage, starts the cron engine, and serves the REST API + dashboard.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use khronos_api::AppState;
use khronos_chain::DEFAULT_TRANSPORT_TIMEOUT;
use khronos_config::{AppConfig, StorageEngine};
use khronos_engine::CronEngine;
use khronos_storage::{InMemoryStorage, SledStorage, Storage, TokenStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let config = AppConfig::load().context("loading configuration")?;

	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_level))
		.init();

	tracing::info!(port = config.http_port, storage = ?config.storage_engine, "starting khronos");

	let (storage, tokens): (Arc<dyn Storage>, Arc<dyn TokenStore>) = match config.storage_engine {
		StorageEngine::Dummy => {
			let store = Arc::new(InMemoryStorage::new());
			(store.clone(), store)
		}
		StorageEngine::Boltdb => {
			let timeout = Duration::from_secs(config.boltdb_timeout_seconds);
			let store = Arc::new(SledStorage::open(&config.boltdb_path, timeout).context("opening storage")?);
			(store.clone(), store)
		}
	};

	let chain = khronos_chain::simple_run(DEFAULT_TRANSPORT_TIMEOUT);
	let engine = Arc::new(CronEngine::with_options(
		storage.clone(),
		chain,
		config.result_buffer_len,
		config.dont_schedule_jobs_on_start,
	));
	engine.start(None).await.context("starting cron engine")?;

	let state = AppState {
		storage,
		tokens,
		engine,
		resources_per_page: config.api_resources_per_page as u64,
		security_disabled: config.api_disable_security,
	};

	let app = khronos_api::router(state);

	let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port))
		.await
		.context("binding listener")?;
	tracing::info!(addr = %listener.local_addr()?, "listening");

	axum::serve(listener, app).await.context("serving")?;
	Ok(())
}
