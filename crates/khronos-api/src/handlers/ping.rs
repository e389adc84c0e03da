// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// GET /api/v1/ping — liveness check.
pub async fn ping() -> &'static str {
	"pong"
}
