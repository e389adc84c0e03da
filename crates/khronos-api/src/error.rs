// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Maps internal errors onto the REST boundary's status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
	errors: Vec<String>,
}

/// An error surfaced to an HTTP caller.
///
/// Storage and engine errors are opaque 500s (the stable user-visible
/// messages from the reference implementation); `Validation` is the only
/// variant that carries a list of field-level problems.
pub enum ApiError {
	Validation(Vec<String>),
	Forbidden,
	Internal(String),
}

impl ApiError {
	pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
		tracing::error!(error = %err, "{context}");
		Self::Internal(context.to_string())
	}
}

impl From<khronos_storage::StorageError> for ApiError {
	fn from(err: khronos_storage::StorageError) -> Self {
		Self::internal("storage error", err)
	}
}

impl From<khronos_domain::DomainError> for ApiError {
	fn from(err: khronos_domain::DomainError) -> Self {
		Self::Validation(vec![err.to_string()])
	}
}

impl From<khronos_engine::EngineError> for ApiError {
	fn from(err: khronos_engine::EngineError) -> Self {
		Self::internal("engine error", err)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		match self {
			Self::Validation(errors) => {
				(StatusCode::BAD_REQUEST, Json(ErrorBody { errors })).into_response()
			}
			Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
			Self::Internal(message) => {
				(StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { errors: vec![message] }))
					.into_response()
			}
		}
	}
}
