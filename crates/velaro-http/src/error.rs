//! Error taxonomy shared across the framework.
//!
//! Registration-time failures (`PatternCompile`, `InvalidMiddleware`,
//! `InvalidSizeLimit`) abort the registering call synchronously. Per-request
//! failures are converted into a terminal HTTP response by the application
//! boundary; the status for each variant comes from [`Error::status_code`].

use hyper::StatusCode;

/// Framework error type.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A route template could not be compiled into a matcher.
	#[error("invalid route pattern `{pattern}`: {reason}")]
	PatternCompile { pattern: String, reason: String },

	/// An argument passed to a registration call is not usable as middleware.
	#[error("invalid middleware: {0}")]
	InvalidMiddleware(String),

	/// A size-limit string such as `"100KB"` could not be parsed.
	#[error("invalid size limit: {0}")]
	InvalidSizeLimit(String),

	/// A handler failed while processing a request.
	#[error("handler error: {0}")]
	Handler(String),

	/// A request body exceeded the configured limit.
	#[error("payload too large: {0} bytes (limit: {1} bytes)")]
	PayloadTooLarge(usize, usize),

	/// A request body could not be decoded.
	#[error("malformed body: {0}")]
	MalformedBody(String),

	/// A value could not be serialized into a response body.
	#[error("serialization error: {0}")]
	Serialization(String),
}

impl Error {
	/// HTTP status this error maps to when it surfaces as a terminal response.
	///
	/// # Examples
	///
	/// ```
	/// use velaro_http::Error;
	/// use hyper::StatusCode;
	///
	/// let err = Error::PayloadTooLarge(2048, 1024);
	/// assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
	///
	/// let err = Error::MalformedBody("unexpected end of input".into());
	/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
	/// ```
	pub fn status_code(&self) -> StatusCode {
		match self {
			Error::PayloadTooLarge(..) => StatusCode::PAYLOAD_TOO_LARGE,
			Error::MalformedBody(_) => StatusCode::BAD_REQUEST,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

/// Framework result alias.
pub type Result<T> = std::result::Result<T, Error>;
