// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The cron engine: tick source, job registration, and result processing.
//!
//! [`CronEngine`] owns the set of registered jobs and their firing tasks.
//! `Start`/`Stop` form a small state machine (see [`EngineError`]);
//! rehydration from storage runs at most once per instance.

mod engine;
mod error;
mod handler;

pub use engine::{CronEngine, DEFAULT_RESULT_BUFFER_LEN};
pub use error::{EngineError, Result};
pub use handler::{default_handler, ResultHandler};

#[cfg(test)]
mod tests {
	use super::*;
	use khronos_chain::dummy_run;
	use khronos_domain::{Job, Status};
	use khronos_storage::{InMemoryStorage, Storage};
	use std::sync::Arc;
	use std::time::Duration;
	use tokio::sync::Mutex;
	use url::Url;

	fn sample_job(when: &str) -> Job {
		Job::new(
			"tick-test",
			"",
			when,
			true,
			Url::parse("https://example.com/hook").unwrap(),
		)
		.unwrap()
	}

	#[tokio::test(start_paused = true)]
	async fn fire_and_collect_three_results() {
		let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
		let job = Arc::new(storage.save_job(sample_job("@every 1s")).await.unwrap());
		let chain = dummy_run(Status::Ok, "Result: 42");
		let engine = CronEngine::new(storage.clone(), chain);
		engine.register_cron_job(job.clone()).await.unwrap();

		let collected: Arc<Mutex<Vec<khronos_domain::JobResult>>> = Arc::new(Mutex::new(Vec::new()));
		let sink = collected.clone();
		let handler: ResultHandler = Arc::new(move |result| {
			let sink = sink.clone();
			Box::pin(async move {
				sink.lock().await.push(result);
			})
		});

		engine.start(Some(handler)).await.unwrap();
		tokio::time::advance(Duration::from_millis(3500)).await;
		// Each tick spawns its own firing task, one hop beyond the tick
		// loop itself; yield a few times so every spawned firing gets
		// polled to completion before we inspect the results.
		for _ in 0..8 {
			tokio::task::yield_now().await;
		}
		engine.stop().await.unwrap();

		let results = collected.lock().await;
		assert_eq!(results.len(), 3);
		for r in results.iter() {
			assert_eq!(r.status, Status::Ok);
			assert_eq!(r.out, "Result: 42");
		}
	}

	#[tokio::test]
	async fn start_is_not_reentrant() {
		let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
		let engine = CronEngine::new(storage, dummy_run(Status::Ok, "ok"));
		engine.start(None).await.unwrap();
		assert!(matches!(
			engine.start(None).await,
			Err(EngineError::AlreadyRunning)
		));
		engine.stop().await.unwrap();
	}

	#[tokio::test]
	async fn stop_without_start_is_not_running() {
		let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
		let engine = CronEngine::new(storage, dummy_run(Status::Ok, "ok"));
		assert!(matches!(engine.stop().await, Err(EngineError::NotRunning)));
	}

	#[tokio::test]
	async fn rehydration_runs_at_most_once_per_instance() {
		let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
		storage.save_job(sample_job("@reboot")).await.unwrap();
		let engine = CronEngine::new(storage.clone(), dummy_run(Status::Ok, "ok"));

		engine.start(None).await.unwrap();
		engine.stop().await.unwrap();

		storage.save_job(sample_job("@reboot")).await.unwrap();
		engine.start(None).await.unwrap();
		engine.stop().await.unwrap();
	}
}
