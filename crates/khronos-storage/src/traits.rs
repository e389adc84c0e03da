// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The storage interface consumed by the cron engine and the REST surface.

use std::sync::Arc;

use async_trait::async_trait;
use khronos_domain::{Job, JobResult};

use crate::error::Result;

/// Durable, ordered key-value storage for jobs and their results.
///
/// IDs are 1-based in persisted form; `get_jobs`/`get_results` accept
/// 0-based `(low, high)` windows per the pagination contract documented on
/// [`crate::pagination`].
#[async_trait]
pub trait Storage: Send + Sync {
	/// Release resources. Idempotent; later calls on any method fail with
	/// [`crate::StorageError::Closed`].
	async fn close(&self) -> Result<()>;

	async fn get_jobs(&self, low: u64, high: u64) -> Result<Vec<Job>>;
	async fn get_job(&self, id: u64) -> Result<Job>;

	/// Saves `job`. If `job.id == 0` a fresh, monotonically increasing ID
	/// is assigned; otherwise the job is upserted at its existing ID.
	/// Returns the saved job (with its assigned ID).
	async fn save_job(&self, job: Job) -> Result<Job>;

	/// Removes `job` and cascade-deletes every result in its namespace.
	/// Missing jobs are not an error.
	async fn delete_job(&self, job: &Job) -> Result<()>;

	async fn jobs_length(&self) -> Result<u64>;

	async fn get_results(&self, job: &Arc<Job>, low: u64, high: u64) -> Result<Vec<JobResult>>;
	async fn get_result(&self, job: &Arc<Job>, id: u64) -> Result<JobResult>;

	/// Saves `result`. Requires `get_job(result.job.id)` to succeed.
	/// Assigns a per-job result ID if `result.id == 0`.
	async fn save_result(&self, result: JobResult) -> Result<JobResult>;

	async fn delete_result(&self, result: &JobResult) -> Result<()>;
	async fn results_length(&self, job: &Job) -> Result<u64>;
}

/// Auth-token side-table, consumed only by the (external) bearer-token
/// middleware.
#[async_trait]
pub trait TokenStore: Send + Sync {
	async fn save(&self, token: &str) -> Result<()>;
	async fn delete(&self, token: &str) -> Result<()>;
	async fn exists(&self, token: &str) -> Result<bool>;
}
