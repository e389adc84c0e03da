// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One execution outcome of one firing of a [`Job`](crate::Job).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::Job;

/// The outcome of a single transport attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
	/// Transport returned HTTP 200.
	Ok,
	/// Transport returned HTTP 500.
	Error,
	/// Transport returned any other status.
	Unknown,
	/// Local failure: request construction, network, timeout, or body read.
	InternalError,
}

/// One execution outcome of one firing of a job.
///
/// `job` is a shared reference to the owning [`Job`] so that every `Result`
/// loaded for a given job shares one in-memory instance, per the storage
/// layer's loader contract (see `khronos-storage`).
///
/// Only `Serialize` is derived: the REST surface returns these directly as
/// `Json<JobResult>`, but nothing ever deserializes one back — the wire/disk
/// format for persistence is `khronos_storage::ResultRecord`, which omits
/// `job` entirely rather than skipping it on a type with no `Default`.
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
	pub id: u64,
	pub job: Arc<Job>,
	pub out: String,
	pub status: Status,
	pub start: DateTime<Utc>,
	pub finish: DateTime<Utc>,
}

impl JobResult {
	/// Construct a fresh, unsaved result (`id == 0`) for a firing that is
	/// about to run. `start`/`finish` are set by the timing stage.
	pub fn new(job: Arc<Job>) -> Self {
		let now = Utc::now();
		Self {
			id: 0,
			job,
			out: String::new(),
			status: Status::Unknown,
			start: now,
			finish: now,
		}
	}

	pub fn is_unsaved(&self) -> bool {
		self.id == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use url::Url;

	fn job() -> Arc<Job> {
		Arc::new(Job::new("ping", "", "@hourly", true, Url::parse("https://example.com").unwrap()).unwrap())
	}

	#[test]
	fn new_result_is_unsaved_with_matching_start_finish() {
		let r = JobResult::new(job());
		assert!(r.is_unsaved());
		assert_eq!(r.start, r.finish);
	}
}
