//! HTTP response representation.

use bytes::Bytes;
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;

use crate::{Error, Result};

/// HTTP response accumulated by a handler chain.
///
/// A response starts out as `200 OK` with an empty body and is mutated in
/// place by handlers. The first terminal write ([`send`](Response::send),
/// [`json`](Response::json) or [`end`](Response::end)) finishes the response;
/// every later terminal write is a no-op, so a handler that runs after the
/// response was finalized cannot corrupt what is already on the wire.
///
/// # Examples
///
/// ```
/// use velaro_http::Response;
/// use hyper::StatusCode;
///
/// let mut response = Response::new();
/// response.status(StatusCode::CREATED).set("Location", "/users/42");
/// response.send("created");
///
/// assert!(response.is_finished());
/// assert_eq!(response.status, StatusCode::CREATED);
///
/// // Terminal writes after the first are ignored.
/// response.send("too late");
/// assert_eq!(response.body, bytes::Bytes::from("created"));
/// ```
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
	finished: bool,
}

impl Response {
	/// Creates an unfinished `200 OK` response with an empty body.
	pub fn new() -> Self {
		Self {
			status: StatusCode::OK,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			finished: false,
		}
	}

	/// Sets the status code.
	pub fn status(&mut self, status: StatusCode) -> &mut Self {
		if !self.finished {
			self.status = status;
		}
		self
	}

	/// Sets a header. Invalid names or values are ignored.
	pub fn set(&mut self, name: &str, value: &str) -> &mut Self {
		if self.finished {
			return self;
		}
		if let Ok(name) = hyper::header::HeaderName::from_bytes(name.as_bytes())
			&& let Ok(value) = hyper::header::HeaderValue::from_str(value)
		{
			self.headers.insert(name, value);
		}
		self
	}

	/// Returns a header value as a string, if present and valid UTF-8.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// Serializes `data` as the JSON body and finishes the response.
	///
	/// Sets `Content-Type: application/json; charset=utf-8` unless a content
	/// type was already set. A no-op when the response is finished.
	pub fn json<T: Serialize>(&mut self, data: &T) -> Result<()> {
		if self.finished {
			return Ok(());
		}
		let body = serde_json::to_vec(data).map_err(|e| Error::Serialization(e.to_string()))?;
		if self.get(hyper::header::CONTENT_TYPE.as_str()).is_none() {
			self.set(
				hyper::header::CONTENT_TYPE.as_str(),
				"application/json; charset=utf-8",
			);
		}
		self.body = Bytes::from(body);
		self.end();
		Ok(())
	}

	/// Sets the body and finishes the response.
	///
	/// Defaults `Content-Type` to `text/html; charset=utf-8` when none was
	/// set. A no-op when the response is finished.
	pub fn send(&mut self, body: impl Into<Bytes>) {
		if self.finished {
			return;
		}
		if self.get(hyper::header::CONTENT_TYPE.as_str()).is_none() {
			self.set(hyper::header::CONTENT_TYPE.as_str(), "text/html; charset=utf-8");
		}
		self.body = body.into();
		self.end();
	}

	/// Finishes the response with whatever status, headers and body are set.
	///
	/// Populates `Content-Length` from the body. Idempotent.
	pub fn end(&mut self) {
		if self.finished {
			return;
		}
		let length = self.body.len().to_string();
		self.set(hyper::header::CONTENT_LENGTH.as_str(), &length);
		self.finished = true;
	}

	/// Returns true once a terminal write happened.
	pub fn is_finished(&self) -> bool {
		self.finished
	}
}

impl Default for Response {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Response {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Response")
			.field("status", &self.status)
			.field("finished", &self.finished)
			.field("body_len", &self.body.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_new_response_is_unfinished_200() {
		let response = Response::new();
		assert_eq!(response.status, StatusCode::OK);
		assert!(!response.is_finished());
		assert!(response.body.is_empty());
	}

	#[test]
	fn test_send_sets_default_content_type_and_length() {
		let mut response = Response::new();
		response.send("hello");

		assert!(response.is_finished());
		assert_eq!(response.get("content-type"), Some("text/html; charset=utf-8"));
		assert_eq!(response.get("content-length"), Some("5"));
		assert_eq!(response.body, Bytes::from("hello"));
	}

	#[test]
	fn test_send_keeps_explicit_content_type() {
		let mut response = Response::new();
		response.set("Content-Type", "text/plain");
		response.send("hi");

		assert_eq!(response.get("content-type"), Some("text/plain"));
	}

	#[test]
	fn test_json_sets_content_type_and_finishes() {
		let mut response = Response::new();
		response.json(&serde_json::json!({"ok": true})).unwrap();

		assert!(response.is_finished());
		assert_eq!(
			response.get("content-type"),
			Some("application/json; charset=utf-8")
		);
		assert_eq!(response.body, Bytes::from(r#"{"ok":true}"#));
	}

	#[test]
	fn test_terminal_writes_are_idempotent() {
		let mut response = Response::new();
		response.status(StatusCode::NOT_FOUND);
		response.end();

		// None of these may alter the finished response.
		response.status(StatusCode::OK);
		response.set("X-Late", "1");
		response.send("late body");
		response.json(&serde_json::json!({"late": true})).unwrap();

		assert_eq!(response.status, StatusCode::NOT_FOUND);
		assert!(response.get("x-late").is_none());
		assert!(response.body.is_empty());
	}

	#[test]
	fn test_end_sets_content_length_for_empty_body() {
		let mut response = Response::new();
		response.end();
		assert_eq!(response.get("content-length"), Some("0"));
	}
}
