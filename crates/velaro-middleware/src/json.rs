//! JSON body parsing.

use async_trait::async_trait;
use hyper::StatusCode;
use velaro_http::{Error, Handler, Next, Payload, Request, Response, Result};

use crate::limit::parse_size;
use crate::DEFAULT_LIMIT;

/// Options for the [`json`] middleware.
#[derive(Debug, Clone)]
pub struct JsonOptions {
	/// Maximum accepted body size in bytes. Default 100KB.
	pub limit: usize,
	/// Only accept top-level objects and arrays. Default `true`.
	pub strict: bool,
}

impl Default for JsonOptions {
	fn default() -> Self {
		Self {
			limit: DEFAULT_LIMIT,
			strict: true,
		}
	}
}

impl JsonOptions {
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

	/// Toggles strict mode.
	pub fn strict(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}
}

/// Middleware that decodes `application/json` bodies. See [`json`].
pub struct Json {
	options: JsonOptions,
}

/// Creates JSON body-parsing middleware with default options.
///
/// Requests with another content type pass through untouched. A body over
/// the limit gets an immediate `413` and the chain does not continue; a body
/// that fails to decode surfaces a 400-class error to the chain.
///
/// # Examples
///
/// ```
/// use velaro_http::{handler_fn, Request, Response};
/// use velaro_middleware::json;
/// use velaro_routers::Application;
/// use hyper::Method;
///
/// # tokio_test::block_on(async {
/// let app = Application::new();
/// app.with_middleware(json()).unwrap();
/// app.post("/echo", handler_fn(|req, res: &mut Response, _next| {
///     let a = req.payload.as_ref()
///         .and_then(|p| p.as_json())
///         .and_then(|v| v.get("a"))
///         .cloned();
///     Box::pin(async move {
///         res.json(&a)?;
///         Ok(())
///     })
/// })).unwrap();
///
/// let req = Request::builder()
///     .method(Method::POST)
///     .uri("/echo")
///     .header("content-type", "application/json")
///     .body(r#"{"a":1}"#)
///     .build()
///     .unwrap();
/// let res = app.handle(req).await;
/// assert_eq!(res.body, bytes::Bytes::from("1"));
/// # });
/// ```
pub fn json() -> Json {
	Json {
		options: JsonOptions::default(),
	}
}

/// Creates JSON body-parsing middleware with explicit options.
pub fn json_with(options: JsonOptions) -> Json {
	Json { options }
}

#[async_trait]
impl Handler for Json {
	async fn handle(&self, req: &mut Request, res: &mut Response, next: &Next) -> Result<()> {
		if req.content_type() != Some("application/json") || req.body.is_empty() {
			next.proceed();
			return Ok(());
		}

		if req.body.len() > self.options.limit {
			tracing::warn!(
				size = req.body.len(),
				limit = self.options.limit,
				"json body over limit"
			);
			res.status(StatusCode::PAYLOAD_TOO_LARGE);
			res.end();
			return Ok(());
		}

		let value: serde_json::Value = serde_json::from_slice(&req.body)
			.map_err(|e| Error::MalformedBody(e.to_string()))?;

		if self.options.strict && !value.is_object() && !value.is_array() {
			return Err(Error::MalformedBody(
				"strict mode requires a top-level object or array".to_string(),
			));
		}

		req.payload = Some(Payload::Json(value));
		next.proceed();
		Ok(())
	}
}
