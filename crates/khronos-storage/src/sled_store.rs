// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! A durable [`Storage`] backend on top of `sled`.
//!
//! Layout: a `jobs` tree keyed by the 8-byte big-endian job ID, a `meta`
//! tree holding the next-ID counters, and one results tree per job named
//! `job:<id bytes>:results/`. Byte-wise key order equals numeric ID order,
//! so pagination windows become `Tree::range` calls directly.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use khronos_domain::{Job, JobResult};
use sled::Tree;

use crate::error::{Result, StorageError};
use crate::pagination::{self, Window};
use crate::record::{bytes_to_id, id_to_bytes, results_tree_name, ResultRecord};
use crate::traits::{Storage, TokenStore};

const NEXT_JOB_ID_KEY: &[u8] = b"next_job_id";
const TOKENS_TREE: &str = "tokens";

/// The interval between retries while waiting on the file lock in [`SledStorage::open`].
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

pub struct SledStorage {
	db: sled::Db,
	jobs: Tree,
	meta: Tree,
	tokens: Tree,
	closed: AtomicBool,
}

impl SledStorage {
	/// Opens (or creates) the database at `path`, retrying on lock
	/// contention until `timeout` elapses, matching `BOLTDB_TIMEOUT_SECONDS`
	/// ("file-lock acquisition timeout" per spec.md §6).
	pub fn open(path: impl AsRef<Path>, timeout: Duration) -> Result<Self> {
		let db = Self::open_db(path.as_ref(), timeout)?;
		let jobs = db.open_tree("jobs")?;
		let meta = db.open_tree("meta")?;
		let tokens = db.open_tree(TOKENS_TREE)?;
		Ok(Self {
			db,
			jobs,
			meta,
			tokens,
			closed: AtomicBool::new(false),
		})
	}

	fn open_db(path: &Path, timeout: Duration) -> Result<sled::Db> {
		let deadline = Instant::now() + timeout;
		loop {
			match sled::open(path) {
				Ok(db) => return Ok(db),
				Err(err) if is_lock_contention(&err) && Instant::now() < deadline => {
					tracing::debug!("storage file locked, retrying open");
					std::thread::sleep(LOCK_RETRY_INTERVAL);
				}
				Err(err) => return Err(err.into()),
			}
		}
	}

	fn check_open(&self) -> Result<()> {
		if self.closed.load(Ordering::SeqCst) {
			return Err(StorageError::Closed);
		}
		Ok(())
	}

	fn results_tree(&self, job_id: u64) -> Result<Tree> {
		Ok(self.db.open_tree(results_tree_name(job_id))?)
	}

	/// Atomically returns the next job ID and advances the counter.
	fn next_job_id(&self) -> Result<u64> {
		let old = self
			.meta
			.fetch_and_update(NEXT_JOB_ID_KEY, |old| {
				let current = old.map(bytes_to_id).unwrap_or(0);
				Some(id_to_bytes(current + 1).to_vec())
			})?;
		Ok(old.map(|v| bytes_to_id(&v)).unwrap_or(0) + 1)
	}

	/// Advances the job-ID counter to at least `id`, for explicit-ID saves.
	fn bump_job_id_floor(&self, id: u64) -> Result<()> {
		self.meta.fetch_and_update(NEXT_JOB_ID_KEY, move |old| {
			let current = old.map(bytes_to_id).unwrap_or(0);
			if id > current {
				Some(id_to_bytes(id).to_vec())
			} else {
				old.map(|o| o.to_vec())
			}
		})?;
		Ok(())
	}

	fn next_result_id(&self, job_id: u64) -> Result<u64> {
		let key = result_counter_key(job_id);
		let old = self.meta.fetch_and_update(&key, |old| {
			let current = old.map(bytes_to_id).unwrap_or(0);
			Some(id_to_bytes(current + 1).to_vec())
		})?;
		Ok(old.map(|v| bytes_to_id(&v)).unwrap_or(0) + 1)
	}

	fn bump_result_id_floor(&self, job_id: u64, id: u64) -> Result<()> {
		let key = result_counter_key(job_id);
		self.meta.fetch_and_update(&key, move |old| {
			let current = old.map(bytes_to_id).unwrap_or(0);
			if id > current {
				Some(id_to_bytes(id).to_vec())
			} else {
				old.map(|o| o.to_vec())
			}
		})?;
		Ok(())
	}
}

fn result_counter_key(job_id: u64) -> Vec<u8> {
	let mut key = b"next_result_id:".to_vec();
	key.extend_from_slice(&id_to_bytes(job_id));
	key
}

/// Whether `err` is the kind of failure worth retrying while waiting on the
/// database's file lock, as opposed to a structural corruption/
/// unsupported-format error that a retry could never resolve. Lock
/// contention surfaces from `sled::open` as a plain OS-level I/O failure
/// (the lock file is acquired with ordinary file APIs), so any `Io` error
/// is treated as transient and retried until the deadline.
fn is_lock_contention(err: &sled::Error) -> bool {
	matches!(err, sled::Error::Io(_))
}

#[async_trait]
impl Storage for SledStorage {
	async fn close(&self) -> Result<()> {
		self.check_open()?;
		self.closed.store(true, Ordering::SeqCst);
		self.db.flush_async().await?;
		Ok(())
	}

	async fn get_jobs(&self, low: u64, high: u64) -> Result<Vec<Job>> {
		self.check_open()?;
		let window = match pagination::resolve(low, high)? {
			Some(w) => w,
			None => return Ok(Vec::new()),
		};
		let mut matched = Vec::new();
		let iter = match window {
			Window::Open { from } => self.jobs.range(id_to_bytes(from).to_vec()..),
			Window::Bounded { from, to_exclusive } => {
				self.jobs.range(id_to_bytes(from).to_vec()..id_to_bytes(to_exclusive).to_vec())
			}
		};
		for entry in iter {
			let (_, value) = entry?;
			matched.push(serde_json::from_slice(&value)?);
		}
		pagination::check_bounded_satisfied(window, matched.len())?;
		Ok(matched)
	}

	async fn get_job(&self, id: u64) -> Result<Job> {
		self.check_open()?;
		let value = self.jobs.get(id_to_bytes(id))?.ok_or(StorageError::NotFound)?;
		Ok(serde_json::from_slice(&value)?)
	}

	#[tracing::instrument(skip(self, job), fields(job_id = job.id))]
	async fn save_job(&self, mut job: Job) -> Result<Job> {
		self.check_open()?;
		if job.id == 0 {
			job.id = self.next_job_id()?;
		} else {
			self.bump_job_id_floor(job.id)?;
		}
		let encoded = serde_json::to_vec(&job)?;
		self.jobs.insert(id_to_bytes(job.id), encoded)?;
		tracing::debug!(job_id = job.id, "saved job");
		Ok(job)
	}

	#[tracing::instrument(skip(self, job), fields(job_id = job.id))]
	async fn delete_job(&self, job: &Job) -> Result<()> {
		self.check_open()?;
		self.jobs.remove(id_to_bytes(job.id))?;
		self.db.drop_tree(results_tree_name(job.id))?;
		self.meta.remove(result_counter_key(job.id))?;
		tracing::debug!(job_id = job.id, "deleted job, dropped its results tree");
		Ok(())
	}

	async fn jobs_length(&self) -> Result<u64> {
		self.check_open()?;
		Ok(self.jobs.len() as u64)
	}

	async fn get_results(&self, job: &Arc<Job>, low: u64, high: u64) -> Result<Vec<JobResult>> {
		self.check_open()?;
		let window = match pagination::resolve(low, high)? {
			Some(w) => w,
			None => return Ok(Vec::new()),
		};
		let tree = self.results_tree(job.id)?;
		let mut matched = Vec::new();
		let iter = match window {
			Window::Open { from } => tree.range(id_to_bytes(from).to_vec()..),
			Window::Bounded { from, to_exclusive } => {
				tree.range(id_to_bytes(from).to_vec()..id_to_bytes(to_exclusive).to_vec())
			}
		};
		for entry in iter {
			let (_, value) = entry?;
			let record: ResultRecord = serde_json::from_slice(&value)?;
			matched.push(record);
		}
		pagination::check_bounded_satisfied(window, matched.len())?;
		Ok(matched
			.into_iter()
			.map(|r| r.into_result(job.clone()))
			.collect())
	}

	async fn get_result(&self, job: &Arc<Job>, id: u64) -> Result<JobResult> {
		self.check_open()?;
		let tree = self.results_tree(job.id)?;
		let value = tree.get(id_to_bytes(id))?.ok_or(StorageError::NotFound)?;
		let record: ResultRecord = serde_json::from_slice(&value)?;
		Ok(record.into_result(job.clone()))
	}

	#[tracing::instrument(skip(self, result), fields(job_id = result.job.id))]
	async fn save_result(&self, mut result: JobResult) -> Result<JobResult> {
		self.check_open()?;
		self.get_job(result.job.id).await?;
		if result.id == 0 {
			result.id = self.next_result_id(result.job.id)?;
		} else {
			self.bump_result_id_floor(result.job.id, result.id)?;
		}
		let tree = self.results_tree(result.job.id)?;
		let encoded = serde_json::to_vec(&ResultRecord::from_result(&result))?;
		tree.insert(id_to_bytes(result.id), encoded)?;
		tracing::debug!(job_id = result.job.id, result_id = result.id, "saved result");
		Ok(result)
	}

	#[tracing::instrument(skip(self, result), fields(job_id = result.job.id, result_id = result.id))]
	async fn delete_result(&self, result: &JobResult) -> Result<()> {
		self.check_open()?;
		let tree = self.results_tree(result.job.id)?;
		tree.remove(id_to_bytes(result.id))?;
		tracing::debug!(job_id = result.job.id, result_id = result.id, "deleted result");
		Ok(())
	}

	async fn results_length(&self, job: &Job) -> Result<u64> {
		self.check_open()?;
		Ok(self.results_tree(job.id)?.len() as u64)
	}
}

#[async_trait]
impl TokenStore for SledStorage {
	async fn save(&self, token: &str) -> Result<()> {
		self.check_open()?;
		self.tokens.insert(token.as_bytes(), &[])?;
		Ok(())
	}

	async fn delete(&self, token: &str) -> Result<()> {
		self.check_open()?;
		self.tokens.remove(token.as_bytes())?;
		Ok(())
	}

	async fn exists(&self, token: &str) -> Result<bool> {
		self.check_open()?;
		Ok(self.tokens.contains_key(token.as_bytes())?)
	}
}
