//! HTTP request representation.

use bytes::Bytes;
use hyper::{HeaderMap, Method, Uri, Version};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;

use crate::{Error, Extensions, PathParams, Payload, Result};

/// HTTP request passed through middleware and route handlers.
///
/// `path` starts out as the request URI's path and is rewritten to the
/// unmatched remainder while a mounted router dispatches, so nested routers
/// always match against their own view of the path.
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	/// Raw buffered body.
	pub body: Bytes,
	/// Path the current router matches against (mount-relative).
	pub path: String,
	/// Parameters captured by the entry whose handlers are currently running.
	pub params: PathParams,
	/// Query parameters, split on `&`/`=`, undecoded.
	pub query_params: HashMap<String, String>,
	/// Body decoded by a body-parsing middleware, when one ran.
	pub payload: Option<Payload>,
	/// Request-scoped typed storage.
	pub extensions: Extensions,
}

impl Request {
	/// Creates a builder for assembling a request.
	///
	/// # Examples
	///
	/// ```
	/// use velaro_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::GET)
	///     .uri("/users/42?verbose=1")
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.path, "/users/42");
	/// assert_eq!(request.query("verbose"), Some("1"));
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::new()
	}

	/// Returns a header value as a string, if present and valid UTF-8.
	///
	/// Header lookup is case-insensitive.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// Returns the media type from `Content-Type`, without parameters.
	///
	/// `application/json; charset=utf-8` yields `application/json`.
	pub fn content_type(&self) -> Option<&str> {
		self.header(hyper::header::CONTENT_TYPE.as_str())
			.and_then(|value| value.split(';').next())
			.map(str::trim)
	}

	/// Returns the declared `Content-Length`, when present and numeric.
	pub fn content_length(&self) -> Option<usize> {
		self.header(hyper::header::CONTENT_LENGTH.as_str())
			.and_then(|value| value.trim().parse().ok())
	}

	/// Returns the path parameter captured under `name`.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name)
	}

	/// Returns the raw query parameter `name`.
	pub fn query(&self, name: &str) -> Option<&str> {
		self.query_params.get(name).map(String::as_str)
	}

	/// Returns all query parameters with percent-encoding decoded.
	///
	/// # Examples
	///
	/// ```
	/// use velaro_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::GET)
	///     .uri("/search?name=John%20Doe")
	///     .build()
	///     .unwrap();
	///
	/// let decoded = request.decoded_query_params();
	/// assert_eq!(decoded.get("name"), Some(&"John Doe".to_string()));
	/// ```
	pub fn decoded_query_params(&self) -> HashMap<String, String> {
		self.query_params
			.iter()
			.map(|(k, v)| {
				let key = percent_decode_str(k).decode_utf8_lossy().to_string();
				let value = percent_decode_str(v).decode_utf8_lossy().to_string();
				(key, value)
			})
			.collect()
	}

	fn parse_query_params(uri: &Uri) -> HashMap<String, String> {
		uri.query()
			.map(|query| {
				query
					.split('&')
					.filter(|pair| !pair.is_empty())
					.map(|pair| {
						// Split on the first '=' only so values may contain '='
						let mut parts = pair.splitn(2, '=');
						(
							parts.next().unwrap_or("").to_string(),
							parts.next().unwrap_or("").to_string(),
						)
					})
					.collect()
			})
			.unwrap_or_default()
	}
}

impl std::fmt::Debug for Request {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Request")
			.field("method", &self.method)
			.field("uri", &self.uri)
			.field("path", &self.path)
			.field("params", &self.params)
			.finish_non_exhaustive()
	}
}

/// Builder for [`Request`].
#[derive(Default)]
pub struct RequestBuilder {
	method: Option<Method>,
	uri: Option<String>,
	version: Option<Version>,
	headers: HeaderMap,
	body: Bytes,
}

impl RequestBuilder {
	/// Creates a builder with no fields set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the HTTP method. Defaults to `GET`.
	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	/// Sets the request URI.
	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	/// Sets the HTTP version. Defaults to HTTP/1.1.
	pub fn version(mut self, version: Version) -> Self {
		self.version = Some(version);
		self
	}

	/// Replaces the full header map.
	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Adds a single header. Invalid names or values are ignored.
	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let Ok(name) = hyper::header::HeaderName::from_bytes(name.as_bytes())
			&& let Ok(value) = hyper::header::HeaderValue::from_str(value)
		{
			self.headers.insert(name, value);
		}
		self
	}

	/// Sets the raw body.
	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Builds the request.
	///
	/// # Errors
	///
	/// Fails when the URI is missing or cannot be parsed.
	pub fn build(self) -> Result<Request> {
		let uri: Uri = self
			.uri
			.ok_or_else(|| Error::Handler("request URI is required".to_string()))?
			.parse()
			.map_err(|e: hyper::http::uri::InvalidUri| Error::Handler(e.to_string()))?;
		let path = uri.path().to_string();
		let query_params = Request::parse_query_params(&uri);

		Ok(Request {
			method: self.method.unwrap_or(Method::GET),
			uri,
			version: self.version.unwrap_or(Version::HTTP_11),
			headers: self.headers,
			body: self.body,
			path,
			params: PathParams::new(),
			query_params,
			payload: None,
			extensions: Extensions::new(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_builder_defaults() {
		let request = Request::builder().uri("/").build().unwrap();

		assert_eq!(request.method, Method::GET);
		assert_eq!(request.version, Version::HTTP_11);
		assert_eq!(request.path, "/");
		assert!(request.body.is_empty());
		assert!(request.payload.is_none());
	}

	#[test]
	fn test_builder_requires_uri() {
		assert!(Request::builder().method(Method::GET).build().is_err());
	}

	#[test]
	fn test_query_params_preserve_equals_in_values() {
		let request = Request::builder()
			.uri("/callback?token=a=b=c&empty")
			.build()
			.unwrap();

		assert_eq!(request.query("token"), Some("a=b=c"));
		assert_eq!(request.query("empty"), Some(""));
	}

	#[rstest]
	#[case("application/json; charset=utf-8", "application/json")]
	#[case("application/json", "application/json")]
	#[case("multipart/form-data; boundary=abc", "multipart/form-data")]
	#[case("text/html ; charset=utf-8", "text/html")]
	fn test_content_type_strips_parameters(#[case] header: &str, #[case] expected: &str) {
		let request = Request::builder()
			.uri("/")
			.header("content-type", header)
			.build()
			.unwrap();

		assert_eq!(request.content_type(), Some(expected));
	}

	#[test]
	fn test_header_lookup_is_case_insensitive() {
		let request = Request::builder()
			.uri("/")
			.header("X-Request-Id", "abc-123")
			.build()
			.unwrap();

		assert_eq!(request.header("x-request-id"), Some("abc-123"));
		assert_eq!(request.header("X-REQUEST-ID"), Some("abc-123"));
	}

	#[test]
	fn test_content_length() {
		let request = Request::builder()
			.uri("/")
			.header("content-length", "42")
			.build()
			.unwrap();

		assert_eq!(request.content_length(), Some(42));
	}
}
