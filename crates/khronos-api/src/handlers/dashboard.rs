// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! A minimal HTML dashboard listing registered jobs. Deliberately thin —
//! not the focus of this system.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use crate::error::ApiError;
use crate::state::AppState;

const TEMPLATE: &str = include_str!("../../templates/dashboard.html");

/// How many of a job's most recent results to show on the dashboard.
const RECENT_RESULTS_PER_JOB: u64 = 5;

/// GET / — renders the job list, each with its most recent results, into
/// the static dashboard template.
pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
	let jobs = state.storage.get_jobs(0, 0).await?;

	let mut rows = String::new();
	for job in &jobs {
		rows.push_str(&format!(
			"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
			job.id,
			html_escape(&job.name),
			html_escape(&job.description),
			html_escape(&job.when),
			job.active,
			html_escape(job.url.as_str()),
		));

		let total = state.storage.results_length(job).await?;
		let job_ref = Arc::new(job.clone());
		let low = total.saturating_sub(RECENT_RESULTS_PER_JOB);
		let results = state.storage.get_results(&job_ref, low, total).await?;
		for result in results.iter().rev() {
			rows.push_str(&format!(
				"<tr><td colspan=\"2\"></td><td colspan=\"4\">result #{} ({:?} at {})</td></tr>",
				result.id, result.status, result.finish,
			));
		}
	}

	Ok(Html(TEMPLATE.replace("{{rows}}", &rows)))
}

fn html_escape(value: &str) -> String {
	value
		.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::extract::State as AxumState;
	use khronos_chain::dummy_run;
	use khronos_domain::{Job, JobResult, Status};
	use khronos_engine::CronEngine;
	use khronos_storage::{InMemoryStorage, Storage};
	use url::Url;

	#[test]
	fn escapes_angle_brackets_and_ampersands() {
		assert_eq!(html_escape("<script>&</script>"), "&lt;script&gt;&amp;&lt;/script&gt;");
	}

	#[tokio::test]
	async fn renders_jobs_and_their_recent_results() {
		let storage = Arc::new(InMemoryStorage::new());
		let job = storage
			.save_job(Job::new("ping", "", "@hourly", true, Url::parse("https://example.com/hook").unwrap()).unwrap())
			.await
			.unwrap();
		let job = Arc::new(job);
		storage.save_result(JobResult::new(job.clone())).await.unwrap();

		let engine = Arc::new(CronEngine::new(storage.clone(), dummy_run(Status::Ok, "ok")));
		let state = AppState {
			storage: storage.clone(),
			tokens: storage,
			engine,
			resources_per_page: 20,
			security_disabled: true,
		};

		let Html(page) = dashboard(AxumState(state)).await.unwrap();
		assert!(page.contains("ping"));
		assert!(page.contains("result #1"));
	}
}
