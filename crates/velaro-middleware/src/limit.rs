//! Human-readable size limits.

use once_cell::sync::Lazy;
use regex::Regex;
use velaro_http::{Error, Result};

static SIZE_FORMAT: Lazy<Regex> = Lazy::new(|| {
	// Compiled once; the pattern is a literal.
	Regex::new(r"^(\d+)\s*([A-Za-z]{1,2})$").unwrap_or_else(|_| unreachable!("valid literal regex"))
});

/// Parses a size string such as `"100KB"` or `"2MB"` into bytes.
///
/// Accepted units are `B`, `KB`, `MB`, `GB` and `TB`, case-insensitive.
///
/// # Examples
///
/// ```
/// use velaro_middleware::parse_size;
///
/// assert_eq!(parse_size("1KB").unwrap(), 1024);
/// assert_eq!(parse_size("2mb").unwrap(), 2 * 1024 * 1024);
/// assert!(parse_size("fast").is_err());
/// ```
///
/// # Errors
///
/// Fails with [`Error::InvalidSizeLimit`] on an unrecognized format or unit.
pub fn parse_size(size: &str) -> Result<usize> {
	let caps = SIZE_FORMAT.captures(size.trim()).ok_or_else(|| {
		Error::InvalidSizeLimit(format!(
			"`{}` is not a size; use a format like \"1KB\", \"2MB\" or \"3GB\"",
			size
		))
	})?;

	let value: usize = caps[1]
		.parse()
		.map_err(|_| Error::InvalidSizeLimit(format!("`{}` overflows", &caps[1])))?;

	let multiplier: usize = match caps[2].to_ascii_uppercase().as_str() {
		"B" => 1,
		"KB" => 1024,
		"MB" => 1024 * 1024,
		"GB" => 1024 * 1024 * 1024,
		"TB" => 1024 * 1024 * 1024 * 1024,
		unit => {
			return Err(Error::InvalidSizeLimit(format!(
				"invalid unit `{}`; use one of B, KB, MB, GB, TB",
				unit
			)));
		}
	};

	value.checked_mul(multiplier).ok_or_else(|| {
		Error::InvalidSizeLimit(format!("`{}` overflows", size))
	})
}
