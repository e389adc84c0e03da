// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Translates a 1-based `page` query parameter into the 0-based `(low, high)`
//! window the storage layer expects.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PageParams {
	pub page: Option<i64>,
}

/// Resolves `page` against `page_size` and `total`. Returns `None` when the
/// requested page starts beyond `total` — the caller should respond with an
/// empty array rather than querying storage (a window starting past the end
/// would otherwise read as `BadRange`).
pub fn resolve_page(page: Option<i64>, page_size: u64, total: u64) -> Option<(u64, u64)> {
	let page = page.filter(|&p| p > 0).unwrap_or(1) as u64;
	let end = page_size.saturating_mul(page);
	let start = end.saturating_sub(page_size);
	if start >= total {
		return None;
	}
	Some((start, end.min(total)))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_or_non_positive_page_defaults_to_first_page() {
		assert_eq!(resolve_page(None, 20, 50), Some((0, 20)));
		assert_eq!(resolve_page(Some(0), 20, 50), Some((0, 20)));
		assert_eq!(resolve_page(Some(-5), 20, 50), Some((0, 20)));
	}

	#[test]
	fn last_partial_page_is_clamped() {
		assert_eq!(resolve_page(Some(3), 20, 45), Some((40, 45)));
	}

	#[test]
	fn page_past_total_is_empty() {
		assert_eq!(resolve_page(Some(10), 20, 45), None);
	}
}
