//! URL-encoded form body parsing.

use async_trait::async_trait;
use hyper::StatusCode;
use std::collections::HashMap;
use velaro_http::{Error, Handler, Next, Payload, Request, Response, Result};

use crate::limit::parse_size;
use crate::DEFAULT_LIMIT;

/// Options for the [`urlencoded`] middleware.
#[derive(Debug, Clone)]
pub struct UrlencodedOptions {
	/// Maximum accepted body size in bytes. Default 100KB.
	pub limit: usize,
}

impl Default for UrlencodedOptions {
	fn default() -> Self {
		Self { limit: DEFAULT_LIMIT }
	}
}

impl UrlencodedOptions {
	/// Creates options with the defaults.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the size limit from a human-readable string.
	///
	/// # Errors
	///
	/// Fails at configuration time when the string is not a valid size.
	pub fn limit(mut self, limit: &str) -> Result<Self> {
		self.limit = parse_size(limit)?;
		Ok(self)
	}

	/// Sets the size limit in bytes.
	pub fn limit_bytes(mut self, limit: usize) -> Self {
		self.limit = limit;
		self
	}
}

/// Middleware that decodes `application/x-www-form-urlencoded` bodies.
/// See [`urlencoded`].
pub struct Urlencoded {
	options: UrlencodedOptions,
}

/// Creates urlencoded body-parsing middleware with default options.
///
/// On success the decoded fields land in `req.payload` as
/// [`Payload::Form`] and the chain continues.
pub fn urlencoded() -> Urlencoded {
	Urlencoded {
		options: UrlencodedOptions::default(),
	}
}

/// Creates urlencoded body-parsing middleware with explicit options.
pub fn urlencoded_with(options: UrlencodedOptions) -> Urlencoded {
	Urlencoded { options }
}

#[async_trait]
impl Handler for Urlencoded {
	async fn handle(&self, req: &mut Request, res: &mut Response, next: &Next) -> Result<()> {
		if req.content_type() != Some("application/x-www-form-urlencoded") || req.body.is_empty() {
			next.proceed();
			return Ok(());
		}

		if req.body.len() > self.options.limit {
			tracing::warn!(
				size = req.body.len(),
				limit = self.options.limit,
				"urlencoded body over limit"
			);
			res.status(StatusCode::PAYLOAD_TOO_LARGE);
			res.end();
			return Ok(());
		}

		let fields: HashMap<String, String> = serde_urlencoded::from_bytes(&req.body)
			.map_err(|e| Error::MalformedBody(e.to_string()))?;

		req.payload = Some(Payload::Form(fields));
		next.proceed();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use hyper::Method;

	fn post(body: &str) -> Request {
		Request::builder()
			.method(Method::POST)
			.uri("/submit")
			.header("content-type", "application/x-www-form-urlencoded")
			.body(body.to_string())
			.build()
			.unwrap()
	}

	#[tokio::test]
	async fn test_parses_fields_and_proceeds() {
		let mut req = post("name=ada&role=engineer");
		let mut res = Response::new();
		let next = Next::new();

		urlencoded().handle(&mut req, &mut res, &next).await.unwrap();

		assert!(next.called());
		let payload = req.payload.unwrap();
		let fields = payload.as_form().unwrap();
		assert_eq!(fields.get("name"), Some(&"ada".to_string()));
		assert_eq!(fields.get("role"), Some(&"engineer".to_string()));
	}

	#[tokio::test]
	async fn test_decodes_percent_encoding() {
		let mut req = post("greeting=hello%20world&plus=a%2Bb");
		let mut res = Response::new();
		let next = Next::new();

		urlencoded().handle(&mut req, &mut res, &next).await.unwrap();

		let payload = req.payload.unwrap();
		let fields = payload.as_form().unwrap();
		assert_eq!(fields.get("greeting"), Some(&"hello world".to_string()));
		assert_eq!(fields.get("plus"), Some(&"a+b".to_string()));
	}

	#[tokio::test]
	async fn test_over_limit_responds_413() {
		let mut req = post("field=oversized-value-here");
		let mut res = Response::new();
		let next = Next::new();

		let parser = urlencoded_with(UrlencodedOptions::new().limit_bytes(4));
		parser.handle(&mut req, &mut res, &next).await.unwrap();

		assert!(!next.called());
		assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
	}

	#[tokio::test]
	async fn test_other_content_types_pass_through() {
		let mut req = Request::builder()
			.method(Method::POST)
			.uri("/submit")
			.header("content-type", "text/plain")
			.body("just text")
			.build()
			.unwrap();
		let mut res = Response::new();
		let next = Next::new();

		urlencoded().handle(&mut req, &mut res, &next).await.unwrap();

		assert!(next.called());
		assert!(req.payload.is_none());
	}
}
