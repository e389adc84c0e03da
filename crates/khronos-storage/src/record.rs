// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The on-disk/in-memory representation of a [`JobResult`], with the `job`
//! back-reference stripped (see `khronos-domain::result` for why).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use khronos_domain::{Job, JobResult, Status};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
	pub id: u64,
	pub out: String,
	pub status: Status,
	pub start: DateTime<Utc>,
	pub finish: DateTime<Utc>,
}

impl ResultRecord {
	pub fn from_result(r: &JobResult) -> Self {
		Self {
			id: r.id,
			out: r.out.clone(),
			status: r.status,
			start: r.start,
			finish: r.finish,
		}
	}

	pub fn into_result(self, job: Arc<Job>) -> JobResult {
		JobResult {
			id: self.id,
			job,
			out: self.out,
			status: self.status,
			start: self.start,
			finish: self.finish,
		}
	}
}

/// 8-byte big-endian encoding of a 64-bit ID: lexicographic order on the
/// encoded bytes equals numeric order on the ID.
pub fn id_to_bytes(id: u64) -> [u8; 8] {
	id.to_be_bytes()
}

pub fn bytes_to_id(bytes: &[u8]) -> u64 {
	let mut buf = [0u8; 8];
	buf.copy_from_slice(bytes);
	u64::from_be_bytes(buf)
}

/// The literal byte-string name of the sub-bucket holding `job_id`'s
/// results, matching the on-disk layout documented in the storage module.
pub fn results_tree_name(job_id: u64) -> Vec<u8> {
	let mut name = b"job:".to_vec();
	name.extend_from_slice(&id_to_bytes(job_id));
	name.extend_from_slice(b":results/");
	name
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn id_bytes_roundtrip() {
		for id in [0u64, 1, 255, 256, u64::MAX] {
			assert_eq!(bytes_to_id(&id_to_bytes(id)), id);
		}
	}

	#[test]
	fn id_byte_order_matches_numeric_order() {
		let mut ids: Vec<u64> = vec![5, 1, 300, 2, 65536];
		let mut by_bytes = ids.clone();
		by_bytes.sort_by(|a, b| id_to_bytes(*a).cmp(&id_to_bytes(*b)));
		ids.sort();
		assert_eq!(ids, by_bytes);
	}
}
