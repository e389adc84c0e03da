// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer-token auth middleware, gating every mutating/API route other than
//! `/api/v1/ping`. Disabled entirely when `security_disabled` is set.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracts the bearer token from `Authorization: Bearer <token>`.
fn extract_bearer_token(req: &Request) -> Option<&str> {
	req.headers()
		.get(AUTHORIZATION)?
		.to_str()
		.ok()?
		.strip_prefix("Bearer ")
}

pub async fn require_bearer_token(
	State(state): State<AppState>,
	req: Request,
	next: Next,
) -> Result<Response, ApiError> {
	if state.security_disabled {
		return Ok(next.run(req).await);
	}

	let Some(token) = extract_bearer_token(&req) else {
		return Err(ApiError::Forbidden);
	};

	match state.tokens.exists(token).await {
		Ok(true) => Ok(next.run(req).await),
		Ok(false) => Err(ApiError::Forbidden),
		Err(err) => Err(ApiError::internal("token lookup failed", err)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;
	use axum::http::Request as HttpRequest;

	#[test]
	fn extracts_token_from_bearer_header() {
		let req = HttpRequest::builder()
			.header(AUTHORIZATION, "Bearer secret-token")
			.body(Body::empty())
			.unwrap();
		assert_eq!(extract_bearer_token(&req), Some("secret-token"));
	}

	#[test]
	fn rejects_non_bearer_schemes() {
		let req = HttpRequest::builder()
			.header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
			.body(Body::empty())
			.unwrap();
		assert_eq!(extract_bearer_token(&req), None);
	}

	#[test]
	fn missing_header_yields_none() {
		let req = HttpRequest::builder().body(Body::empty()).unwrap();
		assert_eq!(extract_bearer_token(&req), None);
	}
}
