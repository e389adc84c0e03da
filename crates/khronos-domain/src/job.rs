// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The schedulable unit: a cron expression plus a target URL.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::cron_grammar;
use crate::error::{DomainError, Result};

/// A schedulable unit: a cron expression (`when`) paired with an HTTP
/// target (`url`).
///
/// `id == 0` means the job has never been saved. Storage assigns the real
/// ID on first save and it is stable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
	pub id: u64,
	pub name: String,
	#[serde(default)]
	pub description: String,
	pub when: String,
	#[serde(default)]
	pub active: bool,
	#[serde(with = "url_as_string")]
	pub url: Url,
}

impl Job {
	/// Construct a new, unsaved job (`id == 0`), validating `name`,
	/// `when`, and `url` up front.
	pub fn new(name: impl Into<String>, description: impl Into<String>, when: impl Into<String>, active: bool, url: Url) -> Result<Self> {
		let name = name.into();
		let when = when.into();

		if name.is_empty() {
			return Err(DomainError::EmptyName);
		}
		cron_grammar::validate(&when)?;

		Ok(Self {
			id: 0,
			name,
			description: description.into(),
			when,
			active,
			url,
		})
	}

	/// Whether this job has ever been saved.
	pub fn is_unsaved(&self) -> bool {
		self.id == 0
	}
}

mod url_as_string {
	use serde::{Deserialize, Deserializer, Serializer};
	use url::Url;

	pub fn serialize<S>(url: &Url, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(url.as_str())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Url, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		Url::parse(&s).map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn url(s: &str) -> Url {
		Url::parse(s).unwrap()
	}

	#[test]
	fn new_job_is_unsaved() {
		let j = Job::new("ping", "", "@hourly", true, url("https://example.com")).unwrap();
		assert!(j.is_unsaved());
		assert_eq!(j.id, 0);
	}

	#[test]
	fn rejects_empty_name() {
		let err = Job::new("", "", "@hourly", true, url("https://example.com")).unwrap_err();
		assert!(matches!(err, DomainError::EmptyName));
	}

	#[test]
	fn rejects_invalid_cron() {
		let err = Job::new("ping", "", "not a cron", true, url("https://example.com")).unwrap_err();
		assert!(matches!(err, DomainError::InvalidCron));
	}

	#[test]
	fn json_roundtrip_preserves_url_as_string() {
		let j = Job::new("ping", "desc", "@daily", false, url("https://example.com/a?b=1")).unwrap();
		let encoded = serde_json::to_string(&j).unwrap();
		assert!(encoded.contains("\"url\":\"https://example.com/a?b=1\""));
		let decoded: Job = serde_json::from_str(&encoded).unwrap();
		assert_eq!(decoded, j);
	}
}
