// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The four canonical stages, each a factory taking the next stage in the
//! chain and returning a new one that wraps it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use khronos_domain::{Job, JobResult, Status};

/// A single link in the execution chain.
///
/// Stages consume and return an owned [`JobResult`] rather than mutating it
/// through a reference, which keeps the boxed future free of the borrow's
/// lifetime. Composed outside-in: the outermost factory's stage runs first
/// and explicitly invokes the next.
pub type StageFn = Arc<
	dyn Fn(JobResult, Arc<Job>) -> Pin<Box<dyn Future<Output = JobResult> + Send>> + Send + Sync,
>;

/// The terminal no-op stage that anchors every chain.
pub fn terminator() -> StageFn {
	Arc::new(|result, _job| Box::pin(async move { result }))
}

/// Emits a start/stop log line around the inner stages. Never touches `Result`.
pub fn log_stage(next: StageFn) -> StageFn {
	Arc::new(move |result, job| {
		let next = next.clone();
		Box::pin(async move {
			tracing::info!(job_id = job.id, "start running cron");
			let result = next(result, job.clone()).await;
			tracing::info!(job_id = job.id, "stop running cron");
			result
		})
	})
}

/// Brackets the inner stages with `Start`/`Finish` timestamps.
pub fn timing_stage(next: StageFn) -> StageFn {
	Arc::new(move |mut result, job| {
		let next = next.clone();
		Box::pin(async move {
			result.start = Utc::now();
			let mut result = next(result, job).await;
			result.finish = Utc::now();
			result
		})
	})
}

/// Issues `GET Job.url` with `timeout` and maps the outcome onto `Result`.
///
/// Request construction and network/timeout failures both surface as a
/// `reqwest::Error` from `send`; both map to `InternalError`. A failure
/// reading the response body after a status line was already received
/// overrides whatever status was about to be recorded.
pub fn transport_stage(timeout: Duration, next: StageFn) -> StageFn {
	let client = reqwest::Client::new();
	Arc::new(move |mut result, job| {
		let next = next.clone();
		let client = client.clone();
		Box::pin(async move {
			match client.get(job.url.clone()).timeout(timeout).send().await {
				Ok(response) => {
					let status = response.status();
					match response.text().await {
						Ok(body) => {
							result.status = if status.as_u16() == 200 {
								Status::Ok
							} else if status.as_u16() == 500 {
								Status::Error
							} else {
								Status::Unknown
							};
							result.out = body;
						}
						Err(err) => {
							result.status = Status::InternalError;
							result.out = err.to_string();
						}
					}
				}
				Err(err) => {
					result.status = Status::InternalError;
					result.out = err.to_string();
				}
			}
			next(result, job).await
		})
	})
}

/// Test double for [`transport_stage`]: sets `Status`/`Out` to fixed values
/// and does not invoke `next`, intentionally terminating the chain early.
pub fn dummy_stage(status: Status, out: String, _next: StageFn) -> StageFn {
	Arc::new(move |mut result, job| {
		let status = status;
		let out = out.clone();
		Box::pin(async move {
			tracing::debug!(job_id = job.id, url = %job.url, "dummy transport stage");
			result.status = status;
			result.out = out;
			result
		})
	})
}
