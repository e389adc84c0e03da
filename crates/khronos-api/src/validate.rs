// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Validates a job-creation request body, collecting every field error
//! rather than stopping at the first one.

use khronos_domain::Job;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
pub struct JobCreateRequest {
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	pub when: Option<String>,
	#[serde(default)]
	pub active: Option<bool>,
	pub url: Option<String>,
}

/// Validates `body` into a fresh, unsaved [`Job`], or the full list of
/// field errors found.
pub fn validate_job_request(body: JobCreateRequest) -> Result<Job, Vec<String>> {
	let mut errors = Vec::new();

	let name = body.name.unwrap_or_default();
	if name.is_empty() {
		errors.push("name is required".to_string());
	}

	let when = body.when.unwrap_or_default();
	if when.is_empty() {
		errors.push("when is required".to_string());
	} else if khronos_domain::validate_when(&when).is_err() {
		errors.push("when is not a valid cron".to_string());
	}

	let url_input = body.url.unwrap_or_default();
	let mut parsed_url = None;
	if url_input.is_empty() {
		errors.push("url is required".to_string());
	} else {
		match Url::parse(&url_input) {
			Ok(url) => parsed_url = Some(url),
			Err(_) => errors.push("url is not a valid url".to_string()),
		}
	}

	if !errors.is_empty() {
		return Err(errors);
	}

	Job::new(
		name,
		body.description.unwrap_or_default(),
		when,
		body.active.unwrap_or(false),
		parsed_url.expect("validated above"),
	)
	.map_err(|err| vec![err.to_string()])
}

#[cfg(test)]
mod tests {
	use super::*;

	fn valid_request() -> JobCreateRequest {
		JobCreateRequest {
			name: Some("ping".to_string()),
			description: None,
			when: Some("@hourly".to_string()),
			active: Some(true),
			url: Some("https://example.com/hook".to_string()),
		}
	}

	#[test]
	fn accepts_a_complete_request() {
		assert!(validate_job_request(valid_request()).is_ok());
	}

	#[test]
	fn collects_every_missing_field_instead_of_short_circuiting() {
		let request = JobCreateRequest {
			name: None,
			description: None,
			when: None,
			active: None,
			url: None,
		};
		let errors = validate_job_request(request).unwrap_err();
		assert_eq!(errors.len(), 3);
	}

	#[test]
	fn rejects_invalid_cron_and_url_together() {
		let mut request = valid_request();
		request.when = Some("not a cron".to_string());
		request.url = Some("not a url".to_string());
		let errors = validate_job_request(request).unwrap_err();
		assert_eq!(errors.len(), 2);
	}
}
