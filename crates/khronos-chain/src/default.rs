// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ready-made chains for the engine's two standard operating modes.

use std::time::Duration;

use khronos_domain::Status;

use crate::stages::{dummy_stage, log_stage, terminator, timing_stage, transport_stage, StageFn};

/// The default per-call HTTP timeout, matching the upstream default.
pub const DEFAULT_TRANSPORT_TIMEOUT: Duration = Duration::from_secs(2);

/// `Log(Timing(Transport(Terminator)))` — the chain run for real jobs.
pub fn simple_run(timeout: Duration) -> StageFn {
	log_stage(timing_stage(transport_stage(timeout, terminator())))
}

/// `Log(Timing(Dummy))` — a chain that never makes a network call, for
/// tests and for operators running Khronos in a dry-run mode.
pub fn dummy_run(status: Status, out: impl Into<String>) -> StageFn {
	log_stage(timing_stage(dummy_stage(status, out.into(), terminator())))
}
