//! Handler and continuation contracts.
//!
//! A [`Handler`] processes one request step in a chain. It receives the
//! request, the response being accumulated, and a [`Next`] continuation token.
//! Calling [`Next::proceed`] hands control to the next handler in the chain
//! once the current one returns; not calling it abandons the chain. Writing a
//! terminal response (see [`Response`]) stops the chain regardless.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{Error, Request, Response, Result};

/// Continuation token handed to every handler invocation.
///
/// The chain executor creates a fresh token per invocation; the cursor that
/// decides which handler runs next lives in the executor, never in the token,
/// so a handler cannot re-enter the chain or skip ahead. Calling
/// [`proceed`](Next::proceed) more than once is a no-op.
#[derive(Debug, Default)]
pub struct Next {
	advance: AtomicBool,
}

impl Next {
	/// Creates a token with the continuation not yet requested.
	pub fn new() -> Self {
		Self {
			advance: AtomicBool::new(false),
		}
	}

	/// Requests that the chain advance to the next handler.
	pub fn proceed(&self) {
		self.advance.store(true, Ordering::Relaxed);
	}

	/// Returns true if [`proceed`](Next::proceed) was called.
	pub fn called(&self) -> bool {
		self.advance.load(Ordering::Relaxed)
	}
}

/// A single step in a request-processing chain.
///
/// ```
/// use velaro_http::{Handler, Next, Request, Response, Result};
/// use async_trait::async_trait;
///
/// struct RequestId;
///
/// #[async_trait]
/// impl Handler for RequestId {
///     async fn handle(&self, _req: &mut Request, res: &mut Response, next: &Next) -> Result<()> {
///         res.set("X-Request-Id", "abc-123");
///         next.proceed();
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
	/// Processes the request. Call `next.proceed()` to pass control on, or
	/// finish the response to terminate the chain.
	///
	/// # Errors
	///
	/// An error aborts the chain and is routed to the nearest error handler,
	/// surfacing as a 500-class terminal response when none claims it.
	async fn handle(&self, req: &mut Request, res: &mut Response, next: &Next) -> Result<()>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, req: &mut Request, res: &mut Response, next: &Next) -> Result<()> {
		(**self).handle(req, res, next).await
	}
}

/// Boxed future returned by closure-based handlers.
pub type HandlerFuture<'a> = BoxFuture<'a, Result<()>>;

/// A [`Handler`] built from an async closure. See [`handler_fn`].
pub struct FnHandler<F> {
	f: F,
}

/// Wraps an async closure as a [`Handler`].
///
/// ```
/// use velaro_http::{handler_fn, Next, Request, Response};
///
/// let hello = handler_fn(|_req: &mut Request, res: &mut Response, _next: &Next| {
///     Box::pin(async move {
///         res.send("hello");
///         Ok(())
///     })
/// });
/// # let _ = hello;
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
	F: for<'a> Fn(&'a mut Request, &'a mut Response, &'a Next) -> HandlerFuture<'a> + Send + Sync,
{
	FnHandler { f }
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
	F: for<'a> Fn(&'a mut Request, &'a mut Response, &'a Next) -> HandlerFuture<'a> + Send + Sync,
{
	async fn handle(&self, req: &mut Request, res: &mut Response, next: &Next) -> Result<()> {
		(self.f)(req, res, next).await
	}
}

/// Error-handling facility attached to a router.
///
/// Claims errors raised by the router's chains (and by routers mounted on
/// it). An error handler that itself fails propagates the new error outward.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
	/// Converts `err` into a terminal response, or returns an error to keep
	/// propagating.
	async fn handle_error(&self, err: Error, req: &mut Request, res: &mut Response) -> Result<()>;
}

/// Boxed future returned by closure-based error handlers.
pub type ErrorHandlerFuture<'a> = BoxFuture<'a, Result<()>>;

/// An [`ErrorHandler`] built from an async closure. See [`error_handler_fn`].
pub struct FnErrorHandler<F> {
	f: F,
}

/// Wraps an async closure as an [`ErrorHandler`].
pub fn error_handler_fn<F>(f: F) -> FnErrorHandler<F>
where
	F: for<'a> Fn(Error, &'a mut Request, &'a mut Response) -> ErrorHandlerFuture<'a>
		+ Send
		+ Sync,
{
	FnErrorHandler { f }
}

#[async_trait]
impl<F> ErrorHandler for FnErrorHandler<F>
where
	F: for<'a> Fn(Error, &'a mut Request, &'a mut Response) -> ErrorHandlerFuture<'a>
		+ Send
		+ Sync,
{
	async fn handle_error(&self, err: Error, req: &mut Request, res: &mut Response) -> Result<()> {
		(self.f)(err, req, res).await
	}
}
