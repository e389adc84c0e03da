// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! A non-persistent [`Storage`] backend. Useful for tests and for running
//! Khronos without a data directory.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use khronos_domain::{Job, JobResult};
use tokio::sync::Mutex;

use crate::error::{Result, StorageError};
use crate::pagination::{self, Window};
use crate::record::ResultRecord;
use crate::traits::{Storage, TokenStore};

#[derive(Default)]
struct JobsCollection {
	jobs: BTreeMap<u64, Job>,
	next_id: u64,
}

#[derive(Default)]
struct ResultsCollection {
	by_job: HashMap<u64, BTreeMap<u64, ResultRecord>>,
	next_id: HashMap<u64, u64>,
}

/// In-memory [`Storage`] implementation.
///
/// Each collection (jobs, results) is guarded by its own lock, held for the
/// duration of a single call, matching the concurrency contract documented
/// on the storage crate.
pub struct InMemoryStorage {
	jobs: Mutex<JobsCollection>,
	results: Mutex<ResultsCollection>,
	tokens: Mutex<HashSet<String>>,
	closed: Mutex<bool>,
}

impl InMemoryStorage {
	pub fn new() -> Self {
		Self {
			jobs: Mutex::new(JobsCollection::default()),
			results: Mutex::new(ResultsCollection::default()),
			tokens: Mutex::new(HashSet::new()),
			closed: Mutex::new(false),
		}
	}

	async fn check_open(&self) -> Result<()> {
		if *self.closed.lock().await {
			return Err(StorageError::Closed);
		}
		Ok(())
	}
}

impl Default for InMemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Storage for InMemoryStorage {
	async fn close(&self) -> Result<()> {
		self.check_open().await?;
		*self.closed.lock().await = true;
		Ok(())
	}

	async fn get_jobs(&self, low: u64, high: u64) -> Result<Vec<Job>> {
		self.check_open().await?;
		let window = match pagination::resolve(low, high)? {
			Some(w) => w,
			None => return Ok(Vec::new()),
		};
		let jobs = self.jobs.lock().await;
		let matched: Vec<Job> = match window {
			Window::Open { from } => jobs.jobs.range(from..).map(|(_, j)| j.clone()).collect(),
			Window::Bounded { from, to_exclusive } => jobs
				.jobs
				.range(from..to_exclusive)
				.map(|(_, j)| j.clone())
				.collect(),
		};
		pagination::check_bounded_satisfied(window, matched.len())?;
		Ok(matched)
	}

	async fn get_job(&self, id: u64) -> Result<Job> {
		self.check_open().await?;
		self.jobs
			.lock()
			.await
			.jobs
			.get(&id)
			.cloned()
			.ok_or(StorageError::NotFound)
	}

	#[tracing::instrument(skip(self, job), fields(job_id = job.id))]
	async fn save_job(&self, mut job: Job) -> Result<Job> {
		self.check_open().await?;
		let mut jobs = self.jobs.lock().await;
		if job.id == 0 {
			jobs.next_id += 1;
			job.id = jobs.next_id;
		} else if job.id > jobs.next_id {
			jobs.next_id = job.id;
		}
		jobs.jobs.insert(job.id, job.clone());
		tracing::debug!(job_id = job.id, "saved job");
		Ok(job)
	}

	#[tracing::instrument(skip(self, job), fields(job_id = job.id))]
	async fn delete_job(&self, job: &Job) -> Result<()> {
		self.check_open().await?;
		self.jobs.lock().await.jobs.remove(&job.id);
		let mut results = self.results.lock().await;
		results.by_job.remove(&job.id);
		results.next_id.remove(&job.id);
		tracing::debug!(job_id = job.id, "deleted job, cascaded its results");
		Ok(())
	}

	async fn jobs_length(&self) -> Result<u64> {
		self.check_open().await?;
		Ok(self.jobs.lock().await.jobs.len() as u64)
	}

	async fn get_results(&self, job: &Arc<Job>, low: u64, high: u64) -> Result<Vec<JobResult>> {
		self.check_open().await?;
		let window = match pagination::resolve(low, high)? {
			Some(w) => w,
			None => return Ok(Vec::new()),
		};
		let results = self.results.lock().await;
		let Some(tree) = results.by_job.get(&job.id) else {
			pagination::check_bounded_satisfied(window, 0)?;
			return Ok(Vec::new());
		};
		let matched: Vec<ResultRecord> = match window {
			Window::Open { from } => tree.range(from..).map(|(_, r)| r.clone()).collect(),
			Window::Bounded { from, to_exclusive } => {
				tree.range(from..to_exclusive).map(|(_, r)| r.clone()).collect()
			}
		};
		pagination::check_bounded_satisfied(window, matched.len())?;
		Ok(matched
			.into_iter()
			.map(|r| r.into_result(job.clone()))
			.collect())
	}

	async fn get_result(&self, job: &Arc<Job>, id: u64) -> Result<JobResult> {
		self.check_open().await?;
		let results = self.results.lock().await;
		let record = results
			.by_job
			.get(&job.id)
			.and_then(|tree| tree.get(&id))
			.cloned()
			.ok_or(StorageError::NotFound)?;
		Ok(record.into_result(job.clone()))
	}

	#[tracing::instrument(skip(self, result), fields(job_id = result.job.id))]
	async fn save_result(&self, mut result: JobResult) -> Result<JobResult> {
		self.check_open().await?;
		self.get_job(result.job.id).await?;
		let mut results = self.results.lock().await;
		if result.id == 0 {
			let next = results.next_id.entry(result.job.id).or_insert(0);
			*next += 1;
			result.id = *next;
		} else {
			let next = results.next_id.entry(result.job.id).or_insert(0);
			if result.id > *next {
				*next = result.id;
			}
		}
		results
			.by_job
			.entry(result.job.id)
			.or_default()
			.insert(result.id, ResultRecord::from_result(&result));
		tracing::debug!(job_id = result.job.id, result_id = result.id, "saved result");
		Ok(result)
	}

	#[tracing::instrument(skip(self, result), fields(job_id = result.job.id, result_id = result.id))]
	async fn delete_result(&self, result: &JobResult) -> Result<()> {
		self.check_open().await?;
		if let Some(tree) = self.results.lock().await.by_job.get_mut(&result.job.id) {
			tree.remove(&result.id);
		}
		tracing::debug!(job_id = result.job.id, result_id = result.id, "deleted result");
		Ok(())
	}

	async fn results_length(&self, job: &Job) -> Result<u64> {
		self.check_open().await?;
		Ok(self
			.results
			.lock()
			.await
			.by_job
			.get(&job.id)
			.map(|tree| tree.len())
			.unwrap_or(0) as u64)
	}
}

#[async_trait]
impl TokenStore for InMemoryStorage {
	async fn save(&self, token: &str) -> Result<()> {
		self.check_open().await?;
		self.tokens.lock().await.insert(token.to_string());
		Ok(())
	}

	async fn delete(&self, token: &str) -> Result<()> {
		self.check_open().await?;
		self.tokens.lock().await.remove(token);
		Ok(())
	}

	async fn exists(&self, token: &str) -> Result<bool> {
		self.check_open().await?;
		Ok(self.tokens.lock().await.contains(token))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use khronos_domain::Job;
	use url::Url;

	fn sample_job(name: &str) -> Job {
		Job::new(
			name.to_string(),
			String::new(),
			"@hourly".to_string(),
			true,
			Url::parse("https://example.com/hook").unwrap(),
		)
		.unwrap()
	}

	#[tokio::test]
	async fn saved_job_ids_are_monotonic_without_gaps() {
		let storage = InMemoryStorage::new();
		let mut ids = Vec::new();
		for i in 0..5 {
			let saved = storage.save_job(sample_job(&format!("job-{i}"))).await.unwrap();
			ids.push(saved.id);
		}
		assert_eq!(ids, vec![1, 2, 3, 4, 5]);
	}

	#[tokio::test]
	async fn get_jobs_matches_spec_pagination_examples() {
		let storage = InMemoryStorage::new();
		for i in 0..50 {
			storage.save_job(sample_job(&format!("job-{i}"))).await.unwrap();
		}
		let page = storage.get_jobs(29, 39).await.unwrap();
		assert_eq!(page.len(), 10);
		assert_eq!(page.first().unwrap().id, 30);
		assert_eq!(page.last().unwrap().id, 39);

		let rest = storage.get_jobs(40, 0).await.unwrap();
		assert_eq!(rest.len(), 10);

		let empty = storage.get_jobs(20, 20).await.unwrap();
		assert!(empty.is_empty());

		assert!(matches!(
			storage.get_jobs(30, 1).await,
			Err(StorageError::BadRange)
		));
	}

	#[tokio::test]
	async fn delete_job_cascades_to_results() {
		let storage = InMemoryStorage::new();
		let job = Arc::new(storage.save_job(sample_job("cascade")).await.unwrap());
		storage
			.save_result(JobResult::new(job.clone()))
			.await
			.unwrap();
		assert_eq!(storage.results_length(&job).await.unwrap(), 1);

		storage.delete_job(&job).await.unwrap();
		assert!(matches!(
			storage.get_job(job.id).await,
			Err(StorageError::NotFound)
		));
		assert_eq!(storage.results_length(&job).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn save_result_rejects_unknown_job() {
		let storage = InMemoryStorage::new();
		let orphan = Arc::new(sample_job("orphan"));
		assert!(matches!(
			storage.save_result(JobResult::new(orphan)).await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn result_ids_are_scoped_per_job() {
		let storage = InMemoryStorage::new();
		let job_a = Arc::new(storage.save_job(sample_job("a")).await.unwrap());
		let job_b = Arc::new(storage.save_job(sample_job("b")).await.unwrap());

		let ra1 = storage.save_result(JobResult::new(job_a.clone())).await.unwrap();
		let rb1 = storage.save_result(JobResult::new(job_b.clone())).await.unwrap();
		let ra2 = storage.save_result(JobResult::new(job_a.clone())).await.unwrap();

		assert_eq!((ra1.id, rb1.id, ra2.id), (1, 1, 2));
	}

	#[tokio::test]
	async fn closed_storage_rejects_calls() {
		let storage = InMemoryStorage::new();
		storage.close().await.unwrap();
		assert!(matches!(
			storage.get_jobs(0, 0).await,
			Err(StorageError::Closed)
		));
	}

	#[tokio::test]
	async fn token_store_roundtrip() {
		let storage = InMemoryStorage::new();
		assert!(!storage.exists("abc").await.unwrap());
		storage.save("abc").await.unwrap();
		assert!(storage.exists("abc").await.unwrap());
		storage.delete("abc").await.unwrap();
		assert!(!storage.exists("abc").await.unwrap());
	}
}
