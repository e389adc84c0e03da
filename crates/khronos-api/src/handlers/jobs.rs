// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use khronos_domain::Job;
use khronos_storage::StorageError;

use crate::error::ApiError;
use crate::pagination::{resolve_page, PageParams};
use crate::state::AppState;
use crate::validate::{validate_job_request, JobCreateRequest};

/// GET /api/v1/jobs?page=N
pub async fn list_jobs(
	State(state): State<AppState>,
	Query(params): Query<PageParams>,
) -> Result<Json<Vec<Job>>, ApiError> {
	let total = state.storage.jobs_length().await?;
	let Some((low, high)) = resolve_page(params.page, state.resources_per_page, total) else {
		return Ok(Json(Vec::new()));
	};
	let jobs = state.storage.get_jobs(low, high).await?;
	Ok(Json(jobs))
}

/// POST /api/v1/jobs
pub async fn create_job(
	State(state): State<AppState>,
	Json(body): Json<JobCreateRequest>,
) -> Result<(StatusCode, Json<Job>), ApiError> {
	let job = validate_job_request(body).map_err(ApiError::Validation)?;
	let saved = state.storage.save_job(job).await?;
	state.engine.register_cron_job(Arc::new(saved.clone())).await?;
	Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/v1/jobs/{id}
pub async fn get_job(
	State(state): State<AppState>,
	Path(id): Path<u64>,
) -> Result<Json<Job>, ApiError> {
	let job = state.storage.get_job(id).await?;
	Ok(Json(job))
}

/// DELETE /api/v1/jobs/{id} — 204 whether or not the job existed.
pub async fn delete_job(State(state): State<AppState>, Path(id): Path<u64>) -> Result<StatusCode, ApiError> {
	match state.storage.get_job(id).await {
		Ok(job) => {
			state.storage.delete_job(&job).await?;
			Ok(StatusCode::NO_CONTENT)
		}
		Err(StorageError::NotFound) => Ok(StatusCode::NO_CONTENT),
		Err(err) => Err(err.into()),
	}
}
