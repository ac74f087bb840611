//! Path template compilation and matching.
//!
//! A template is compiled once, at registration time, into a [`PathPattern`].
//! Matching is stateless: the compiled pattern holds no cursor or other
//! mutable state, so matching the same path twice always yields the same
//! result, and one pattern may serve concurrent requests.

use regex::{Regex, RegexBuilder};
use velaro_http::{Error, PathParams, Result};

/// Per-router matching options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOptions {
	/// Match path literals case-sensitively. Default `false`.
	pub case_sensitive: bool,
	/// Reject a trailing slash not present in the template. Default `false`.
	pub strict: bool,
	/// Let entries of a mounted router see the parent's captured parameters.
	/// Default `false`.
	pub merge_params: bool,
}

/// How a compiled pattern anchors against a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
	/// The whole path must match (routes).
	Full,
	/// The template must match a leading portion of the path, ending at a
	/// segment boundary (layers and mounts).
	Prefix,
}

/// A successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
	/// Parameters captured by `:name` segments, in template order.
	pub params: PathParams,
	/// Byte offset where the unmatched remainder of the path begins.
	/// Equals the path length for a full match.
	pub tail_start: usize,
}

/// Longest template accepted, in bytes.
const MAX_TEMPLATE_LENGTH: usize = 1024;

/// Most path segments accepted in one template.
const MAX_TEMPLATE_SEGMENTS: usize = 32;

/// Size cap for the compiled regex.
const MAX_REGEX_SIZE: usize = 1 << 20;

/// A compiled path template.
///
/// Templates are literal segments plus `:name` parameter segments; a
/// parameter captures one or more of `[A-Za-z0-9_-]`.
///
/// # Examples
///
/// ```
/// use velaro_routers::{MatchKind, PathPattern, RouteOptions};
///
/// let options = RouteOptions::default();
/// let pattern = PathPattern::compile("/users/:id", &options, MatchKind::Full).unwrap();
///
/// let m = pattern.matches("/users/42").unwrap();
/// assert_eq!(m.params.get("id"), Some("42"));
///
/// // A single trailing slash is tolerated unless `strict` is set.
/// assert!(pattern.matches("/users/42/").is_some());
/// assert!(pattern.matches("/users/42/posts").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PathPattern {
	template: String,
	regex: Regex,
	param_names: Vec<String>,
	kind: MatchKind,
}

impl PathPattern {
	/// Compiles a template into a matcher.
	///
	/// # Errors
	///
	/// Fails with [`Error::PatternCompile`] when the template is malformed
	/// (a `:` with no parameter name, a duplicate parameter name, an
	/// oversized template) so a bad route definition surfaces at
	/// registration, not per request.
	pub fn compile(template: &str, options: &RouteOptions, kind: MatchKind) -> Result<Self> {
		if template.len() > MAX_TEMPLATE_LENGTH {
			return Err(compile_error(
				template,
				format!("template exceeds {} bytes", MAX_TEMPLATE_LENGTH),
			));
		}
		if template.split('/').count() > MAX_TEMPLATE_SEGMENTS {
			return Err(compile_error(
				template,
				format!("template exceeds {} segments", MAX_TEMPLATE_SEGMENTS),
			));
		}

		// Mount prefixes are segment-oriented: "/blog/" and "/blog" denote
		// the same mount point, and "/" denotes the root.
		let effective = match kind {
			MatchKind::Full => template,
			MatchKind::Prefix => template.trim_end_matches('/'),
		};

		let (body, param_names) = translate(template, effective)?;
		let regex_str = match kind {
			MatchKind::Full if options.strict => format!("^{}$", body),
			MatchKind::Full => format!("^{}/?$", body),
			MatchKind::Prefix => format!("^({})(/.*)?$", body),
		};

		let regex = RegexBuilder::new(&regex_str)
			.case_insensitive(!options.case_sensitive)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| compile_error(template, e.to_string()))?;

		Ok(Self {
			template: template.to_string(),
			regex,
			param_names,
			kind,
		})
	}

	/// Compiles the root prefix, which matches every request path. Used for
	/// bare middleware registered without a mount path.
	pub fn catch_all(options: &RouteOptions) -> Self {
		// The root prefix cannot fail to compile.
		Self::compile("/", options, MatchKind::Prefix)
			.unwrap_or_else(|_| unreachable!("root prefix always compiles"))
	}

	/// Matches `path`, returning captured parameters and the offset of the
	/// unmatched tail. Stateless: repeated calls yield identical results.
	pub fn matches(&self, path: &str) -> Option<PathMatch> {
		let caps = self.regex.captures(path)?;

		let mut params = PathParams::new();
		for name in &self.param_names {
			if let Some(m) = caps.name(name) {
				params.insert(name.clone(), m.as_str().to_string());
			}
		}

		let tail_start = match self.kind {
			MatchKind::Full => path.len(),
			MatchKind::Prefix => caps.get(1).map(|m| m.end()).unwrap_or(path.len()),
		};

		Some(PathMatch { params, tail_start })
	}

	/// Returns true when `path` matches, without extracting parameters.
	pub fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}

	/// The original template string.
	pub fn template(&self) -> &str {
		&self.template
	}

	/// Parameter names in template order.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// How this pattern anchors against paths.
	pub fn kind(&self) -> MatchKind {
		self.kind
	}
}

impl std::fmt::Display for PathPattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.template)
	}
}

fn compile_error(template: &str, reason: impl Into<String>) -> Error {
	Error::PatternCompile {
		pattern: template.to_string(),
		reason: reason.into(),
	}
}

/// Translates a template into a regex body plus its parameter names.
///
/// `template` is the original string (for error messages); `effective` is the
/// possibly prefix-trimmed form that gets translated.
fn translate(template: &str, effective: &str) -> Result<(String, Vec<String>)> {
	let mut body = String::new();
	let mut param_names = Vec::new();
	let mut chars = effective.chars().peekable();

	while let Some(c) = chars.next() {
		match c {
			':' => {
				let mut name = String::new();
				while let Some(&next) = chars.peek() {
					if next.is_ascii_alphanumeric() || next == '_' {
						name.push(next);
						chars.next();
					} else {
						break;
					}
				}
				if name.is_empty() {
					return Err(compile_error(template, "missing parameter name after `:`"));
				}
				if param_names.contains(&name) {
					return Err(compile_error(
						template,
						format!("duplicate parameter name `{}`", name),
					));
				}
				body.push_str(&format!("(?P<{}>[A-Za-z0-9_-]+)", name));
				param_names.push(name);
			}
			'/' | '.' | '+' | '*' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|'
			| '\\' => {
				body.push('\\');
				body.push(c);
			}
			_ => body.push(c),
		}
	}

	Ok((body, param_names))
}
