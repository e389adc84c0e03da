// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use khronos_domain::JobResult;
use khronos_storage::StorageError;

use crate::error::ApiError;
use crate::pagination::{resolve_page, PageParams};
use crate::state::AppState;

/// GET /api/v1/jobs/{jobID}/results?page=N
pub async fn list_results(
	State(state): State<AppState>,
	Path(job_id): Path<u64>,
	Query(params): Query<PageParams>,
) -> Result<Json<Vec<JobResult>>, ApiError> {
	let job = Arc::new(state.storage.get_job(job_id).await?);
	let total = state.storage.results_length(&job).await?;
	let Some((low, high)) = resolve_page(params.page, state.resources_per_page, total) else {
		return Ok(Json(Vec::new()));
	};
	let results = state.storage.get_results(&job, low, high).await?;
	Ok(Json(results))
}

/// GET /api/v1/jobs/{jobID}/results/{resultID}
pub async fn get_result(
	State(state): State<AppState>,
	Path((job_id, result_id)): Path<(u64, u64)>,
) -> Result<Json<JobResult>, ApiError> {
	let job = Arc::new(state.storage.get_job(job_id).await?);
	let result = state.storage.get_result(&job, result_id).await?;
	Ok(Json(result))
}

/// DELETE /api/v1/jobs/{jobID}/results/{resultID} — 204 whether or not the
/// result existed.
pub async fn delete_result(
	State(state): State<AppState>,
	Path((job_id, result_id)): Path<(u64, u64)>,
) -> Result<StatusCode, ApiError> {
	let job = match state.storage.get_job(job_id).await {
		Ok(job) => job,
		Err(StorageError::NotFound) => return Ok(StatusCode::NO_CONTENT),
		Err(err) => return Err(err.into()),
	};
	let job = Arc::new(job);
	match state.storage.get_result(&job, result_id).await {
		Ok(result) => {
			state.storage.delete_result(&result).await?;
			Ok(StatusCode::NO_CONTENT)
		}
		Err(StorageError::NotFound) => Ok(StatusCode::NO_CONTENT),
		Err(err) => Err(err.into()),
	}
}
