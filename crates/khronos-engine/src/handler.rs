// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The function invoked by the result processor for every firing's [`JobResult`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use khronos_domain::JobResult;
use khronos_storage::Storage;

pub type ResultHandler = Arc<dyn Fn(JobResult) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Logs the result, then persists it. Used whenever `Start` is called
/// without a caller-supplied handler.
pub fn default_handler(storage: Arc<dyn Storage>) -> ResultHandler {
	Arc::new(move |result| {
		let storage = storage.clone();
		Box::pin(async move {
			tracing::debug!(
				job_id = result.job.id,
				status = ?result.status,
				"received result from job"
			);
			if let Err(err) = storage.save_result(result).await {
				tracing::error!(error = %err, "failed to save job result");
			}
		})
	})
}
