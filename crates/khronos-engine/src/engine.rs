// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The cron engine: owns the registered jobs, drives each one's tick
//! source, and hands firing results to a bounded channel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use khronos_chain::StageFn;
use khronos_domain::{parse_when, Job, JobResult, ParsedWhen};
use khronos_storage::Storage;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::error::{EngineError, Result};
use crate::handler::{default_handler, ResultHandler};

/// Default capacity of the result channel, matching the reference config default.
pub const DEFAULT_RESULT_BUFFER_LEN: usize = 100;

struct RegisteredJob {
	job: Arc<Job>,
	parsed: ParsedWhen,
}

struct Inner {
	started: bool,
	jobs: HashMap<u64, RegisteredJob>,
	shutdown_tx: Option<broadcast::Sender<()>>,
	results_tx: Option<mpsc::Sender<JobResult>>,
	handles: Vec<JoinHandle<()>>,
}

/// The cron engine. `Start`/`Stop` are serialized by a single mutex;
/// rehydration from storage happens at most once per instance.
pub struct CronEngine {
	storage: Arc<dyn Storage>,
	chain: StageFn,
	result_buffer_len: usize,
	suppress_rehydration: bool,
	rehydrated: AtomicBool,
	inner: Mutex<Inner>,
}

impl CronEngine {
	pub fn new(storage: Arc<dyn Storage>, chain: StageFn) -> Self {
		Self::with_options(storage, chain, DEFAULT_RESULT_BUFFER_LEN, false)
	}

	pub fn with_options(
		storage: Arc<dyn Storage>,
		chain: StageFn,
		result_buffer_len: usize,
		suppress_rehydration: bool,
	) -> Self {
		Self {
			storage,
			chain,
			result_buffer_len,
			suppress_rehydration,
			rehydrated: AtomicBool::new(false),
			inner: Mutex::new(Inner {
				started: false,
				jobs: HashMap::new(),
				shutdown_tx: None,
				results_tx: None,
				handles: Vec::new(),
			}),
		}
	}

	/// Associates `job` with a firing task inside the tick source. If the
	/// engine is already running, the task is spawned immediately;
	/// otherwise it is spawned on the next `Start`.
	pub async fn register_cron_job(&self, job: Arc<Job>) -> Result<()> {
		let parsed = parse_when(&job.when)?;
		let (started, shutdown_tx, results_tx) = {
			let mut inner = self.inner.lock().await;
			inner.jobs.insert(
				job.id,
				RegisteredJob {
					job: job.clone(),
					parsed: parsed.clone(),
				},
			);
			(inner.started, inner.shutdown_tx.clone(), inner.results_tx.clone())
		};

		if started {
			if let (Some(shutdown_tx), Some(results_tx)) = (shutdown_tx, results_tx) {
				self.spawn_firing_loop(job, parsed, shutdown_tx, results_tx).await;
			}
		}
		Ok(())
	}

	/// Starts the tick source and the result processor. `handler` replaces
	/// the default log-then-save behaviour when provided. Returns
	/// [`EngineError::AlreadyRunning`] if already started.
	pub async fn start(&self, handler: Option<ResultHandler>) -> Result<()> {
		let (shutdown_tx, results_tx, results_rx, snapshot) = {
			let mut inner = self.inner.lock().await;
			if inner.started {
				return Err(EngineError::AlreadyRunning);
			}
			let (shutdown_tx, _) = broadcast::channel(16);
			let (results_tx, results_rx) = mpsc::channel(self.result_buffer_len);
			inner.shutdown_tx = Some(shutdown_tx.clone());
			inner.results_tx = Some(results_tx.clone());
			inner.started = true;
			let snapshot: Vec<_> = inner
				.jobs
				.values()
				.map(|r| (r.job.clone(), r.parsed.clone()))
				.collect();
			(shutdown_tx, results_tx, results_rx, snapshot)
		};

		for (job, parsed) in snapshot {
			self.spawn_firing_loop(job, parsed, shutdown_tx.clone(), results_tx.clone())
				.await;
		}

		let handler = handler.unwrap_or_else(|| default_handler(self.storage.clone()));
		let processor = tokio::spawn(async move {
			let mut results_rx = results_rx;
			while let Some(result) = results_rx.recv().await {
				handler(result).await;
			}
		});
		self.inner.lock().await.handles.push(processor);

		if !self.suppress_rehydration && !self.rehydrated.swap(true, Ordering::SeqCst) {
			let stored_jobs = self.storage.get_jobs(0, 0).await?;
			for job in stored_jobs {
				self.register_cron_job(Arc::new(job)).await?;
			}
		}

		Ok(())
	}

	/// Stops the tick source and closes the result channel, waiting for
	/// in-flight firing tasks and the processor to finish. Returns
	/// [`EngineError::NotRunning`] if not started.
	pub async fn stop(&self) -> Result<()> {
		let (shutdown_tx, handles) = {
			let mut inner = self.inner.lock().await;
			if !inner.started {
				return Err(EngineError::NotRunning);
			}
			inner.started = false;
			let shutdown_tx = inner.shutdown_tx.take();
			inner.results_tx = None;
			let handles = std::mem::take(&mut inner.handles);
			(shutdown_tx, handles)
		};

		if let Some(tx) = shutdown_tx {
			let _ = tx.send(());
		}
		for handle in handles {
			let _ = handle.await;
		}
		Ok(())
	}

	/// Drives `job`'s tick source. The loop task itself only decides *when*
	/// to fire; each firing is spawned onto its own task via
	/// [`spawn_firing`] so that overlapping firings of the same job (a slow
	/// chain run delaying a later tick) can run concurrently rather than
	/// serializing through this loop.
	async fn spawn_firing_loop(
		&self,
		job: Arc<Job>,
		parsed: ParsedWhen,
		shutdown_tx: broadcast::Sender<()>,
		results_tx: mpsc::Sender<JobResult>,
	) {
		let chain = self.chain.clone();
		let mut shutdown_rx = shutdown_tx.subscribe();
		let handle = tokio::spawn(async move {
			match parsed {
				ParsedWhen::Reboot => {
					spawn_firing(job.clone(), chain.clone(), results_tx.clone(), shutdown_tx.subscribe());
				}
				ParsedWhen::Every(duration) => {
					let mut interval = tokio::time::interval(duration);
					// The first tick fires immediately; the contract is
					// "starting one duration after the tick source starts".
					interval.tick().await;
					loop {
						tokio::select! {
							_ = interval.tick() => {
								spawn_firing(job.clone(), chain.clone(), results_tx.clone(), shutdown_tx.subscribe());
							}
							_ = shutdown_rx.recv() => break,
						}
					}
				}
				ParsedWhen::Cron(schedule) => loop {
					let Some(next) = schedule.upcoming(Utc).next() else {
						break;
					};
					let delay = (next - Utc::now())
						.to_std()
						.unwrap_or(std::time::Duration::ZERO);
					tokio::select! {
						_ = tokio::time::sleep(delay) => {
							spawn_firing(job.clone(), chain.clone(), results_tx.clone(), shutdown_tx.subscribe());
						}
						_ = shutdown_rx.recv() => break,
					}
				},
			}
		});
		self.inner.lock().await.handles.push(handle);
	}
}

/// Spawns one firing onto its own task, detached from the tick loop that
/// triggered it: `spawn` returns immediately so the tick loop can move on to
/// the next due time even if this firing's chain is still running,
/// permitting overlapping firings of the same job per spec.md §5.
fn spawn_firing(
	job: Arc<Job>,
	chain: StageFn,
	results_tx: mpsc::Sender<JobResult>,
	shutdown_rx: broadcast::Receiver<()>,
) {
	tokio::spawn(fire_once(job, chain, results_tx, shutdown_rx));
}

/// Runs one firing: builds a fresh [`JobResult`], runs the chain, then
/// hands the result to the channel — racing the send against the shutdown
/// signal so a concurrent `Stop` discards it instead of blocking forever.
async fn fire_once(
	job: Arc<Job>,
	chain: StageFn,
	results_tx: mpsc::Sender<JobResult>,
	mut shutdown_rx: broadcast::Receiver<()>,
) {
	if !job.active {
		tracing::debug!(job_id = job.id, "skipping firing: job is inactive");
		return;
	}

	let result = JobResult::new(job.clone());
	let result = chain(result, job.clone()).await;

	tokio::select! {
		send_result = results_tx.send(result) => {
			if send_result.is_err() {
				tracing::warn!(job_id = job.id, "result channel closed, dropping result");
			}
		}
		_ = shutdown_rx.recv() => {
			tracing::debug!(job_id = job.id, "engine stopping, discarding in-flight result");
		}
	}
}
