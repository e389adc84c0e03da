// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cron grammar: mnemonic expansion and validation of `Job::when` expressions.
//!
//! The `cron` crate parses the standard six-field form (second minute hour
//! day-of-month month day-of-week). This module expands the mnemonic
//! prefixes (`@every`, `@daily`, ...) into either an equivalent six-field
//! expression or a fixed interval, matching the descriptor table the
//! `robfig/cron`-derived reference scheduler uses.

use std::str::FromStr;
use std::time::Duration;

use cron::Schedule;

use crate::error::{DomainError, Result};

/// A parsed `When` expression, ready to drive a tick source.
#[derive(Debug, Clone)]
pub enum ParsedWhen {
	/// A standard six-field cron schedule.
	Cron(Schedule),
	/// `@every <duration>`: fires every `duration`, starting one `duration`
	/// after the tick source starts.
	Every(Duration),
	/// `@reboot`: fires exactly once, immediately after the tick source
	/// starts.
	Reboot,
}

/// Validate a `When` expression without retaining the parsed form.
///
/// Returns [`DomainError::InvalidCron`] on any malformed expression,
/// matching the reference implementation's single composite error message.
pub fn validate(when: &str) -> Result<()> {
	parse(when).map(|_| ())
}

/// Parse a `When` expression into a [`ParsedWhen`].
pub fn parse(when: &str) -> Result<ParsedWhen> {
	let when = when.trim();

	if let Some(rest) = when.strip_prefix("@every") {
		let duration = parse_duration(rest.trim()).ok_or(DomainError::InvalidCron)?;
		return Ok(ParsedWhen::Every(duration));
	}

	if when == "@reboot" {
		return Ok(ParsedWhen::Reboot);
	}

	let expanded = match when {
		"@yearly" | "@annually" => "0 0 0 1 1 *",
		"@monthly" => "0 0 0 1 * *",
		"@weekly" => "0 0 0 * * 0",
		"@daily" | "@midnight" => "0 0 0 * * *",
		"@hourly" => "0 0 * * * *",
		other => other,
	};

	Schedule::from_str(expanded)
		.map(ParsedWhen::Cron)
		.map_err(|_| DomainError::InvalidCron)
}

/// Parse a simple `<integer><unit>` duration, e.g. `1s`, `5m`, `1h`.
fn parse_duration(s: &str) -> Option<Duration> {
	let unit_start = s.find(|c: char| !c.is_ascii_digit())?;
	let (digits, unit) = s.split_at(unit_start);
	let value: u64 = digits.parse().ok()?;

	let seconds = match unit {
		"s" => value,
		"m" => value.checked_mul(60)?,
		"h" => value.checked_mul(3600)?,
		_ => return None,
	};

	if seconds == 0 {
		return None;
	}

	Some(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn validates_standard_six_field_expression() {
		assert!(validate("0 */5 * * * *").is_ok());
	}

	#[test]
	fn validates_mnemonics() {
		for expr in ["@daily", "@hourly", "@weekly", "@monthly", "@yearly", "@annually", "@midnight"] {
			assert!(validate(expr).is_ok(), "{expr} should be valid");
		}
	}

	#[test]
	fn validates_reboot() {
		assert!(matches!(parse("@reboot").unwrap(), ParsedWhen::Reboot));
	}

	#[test]
	fn parses_every_duration() {
		match parse("@every 5m").unwrap() {
			ParsedWhen::Every(d) => assert_eq!(d, Duration::from_secs(300)),
			_ => panic!("expected Every"),
		}
	}

	#[test]
	fn rejects_zero_duration() {
		assert!(validate("@every 0s").is_err());
	}

	#[test]
	fn rejects_garbage() {
		assert!(validate("not a cron expression").is_err());
		assert!(validate("@every").is_err());
		assert!(validate("* * * *").is_err());
	}

	proptest::proptest! {
		#[test]
		fn every_seconds_roundtrips_to_the_same_duration(n in 1u64..100_000) {
			let when = format!("@every {n}s");
			match parse(&when).unwrap() {
				ParsedWhen::Every(d) => proptest::prop_assert_eq!(d, Duration::from_secs(n)),
				_ => proptest::prop_assert!(false, "expected Every"),
			}
		}

		#[test]
		fn every_minutes_roundtrips_to_seconds(n in 1u64..1_000) {
			let when = format!("@every {n}m");
			match parse(&when).unwrap() {
				ParsedWhen::Every(d) => proptest::prop_assert_eq!(d, Duration::from_secs(n * 60)),
				_ => proptest::prop_assert!(false, "expected Every"),
			}
		}
	}
}
