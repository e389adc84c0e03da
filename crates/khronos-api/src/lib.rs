// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The Khronos HTTP server: REST surface over the job/result storage and
//! cron engine, plus a read-only dashboard.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pagination;
pub mod state;
pub mod validate;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Builds the full application router: `/api/v1/ping` is open, every other
/// `/api/v1` route requires a bearer token unless `security_disabled` is
/// set, and `/` serves the dashboard.
pub fn router(state: AppState) -> Router {
	let protected = Router::new()
		.route("/jobs", get(handlers::jobs::list_jobs).post(handlers::jobs::create_job))
		.route("/jobs/{id}", get(handlers::jobs::get_job).delete(handlers::jobs::delete_job))
		.route("/jobs/{job_id}/results", get(handlers::results::list_results))
		.route(
			"/jobs/{job_id}/results/{result_id}",
			get(handlers::results::get_result).delete(handlers::results::delete_result),
		)
		.route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token));

	let api = Router::new()
		.route("/ping", get(handlers::ping::ping))
		.merge(protected);

	Router::new()
		.route("/", get(handlers::dashboard::dashboard))
		.nest("/api/v1", api)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
		.with_state(state)
}
