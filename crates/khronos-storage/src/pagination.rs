// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pagination window arithmetic shared by every storage backend.
//!
//! Callers pass 0-based `(low, high)` windows; persisted IDs are 1-based.
//! The store adds 1 to both bounds before resolving the window, so an
//! external `high == 0` becomes the internal "open upper bound" marker
//! (adjusted `high == 1`).

use crate::error::StorageError;

/// A resolved, validated window over 1-based IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
	/// All IDs `>= from`.
	Open { from: u64 },
	/// IDs in the half-open range `[from, to_exclusive)`.
	Bounded { from: u64, to_exclusive: u64 },
}

/// Resolve a `(low, high)` pair into a validated window, or empty.
///
/// Returns `Ok(None)` for a bounded window that is empty by construction
/// (`low == high` after adjustment); callers should short-circuit and
/// return an empty result without touching the backend.
pub fn resolve(low: u64, high: u64) -> Result<Option<Window>, StorageError> {
	let adjusted_low = low + 1;
	let adjusted_high = high + 1;

	if adjusted_high == 1 {
		return Ok(Some(Window::Open { from: adjusted_low }));
	}

	if adjusted_low == adjusted_high {
		return Ok(None);
	}

	if adjusted_low > adjusted_high {
		return Err(StorageError::BadRange);
	}

	Ok(Some(Window::Bounded {
		from: adjusted_low,
		to_exclusive: adjusted_high,
	}))
}

/// Validate that a bounded window was fully satisfied: a short read on a
/// bounded (non-open) window is a `BadRange`, not a partial result.
pub fn check_bounded_satisfied(window: Window, retrieved: usize) -> Result<(), StorageError> {
	if let Window::Bounded { from, to_exclusive } = window {
		let expected = (to_exclusive - from) as usize;
		if retrieved != expected {
			return Err(StorageError::BadRange);
		}
	}
	Ok(())
}
