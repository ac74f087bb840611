//! Sequential execution of one entry's handler chain.

use std::sync::Arc;
use velaro_http::{Handler, Next, Request, Response, Result};

/// How a chain run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOutcome {
	/// A handler finished the response.
	Terminated,
	/// Every handler ran and the last one requested continuation; control
	/// returns to the registry walk with the response still open.
	Exhausted,
	/// A handler neither finished the response nor requested continuation;
	/// the rest of the chain never ran.
	Abandoned,
}

/// Runs a handler chain against one request/response pair.
///
/// The cursor lives here, scoped to a single [`run`](ChainExecutor::run)
/// call: concurrent requests get independent executors and cannot observe
/// each other's position. A handler is only ever invoked while the response
/// is unfinished, and handler *n + 1* starts only after handler *n* returned
/// having called [`Next::proceed`]. The executor itself never writes to the
/// response; producing a terminal result on a mismatch or an open chain is
/// the caller's job.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use velaro_http::{handler_fn, Handler, Request, Response};
/// use velaro_routers::{ChainExecutor, ChainOutcome};
/// use hyper::Method;
///
/// # tokio_test::block_on(async {
/// let chain: Vec<Arc<dyn Handler>> = vec![
///     Arc::new(handler_fn(|_req, res: &mut Response, next| {
///         Box::pin(async move {
///             res.set("X-Step", "one");
///             next.proceed();
///             Ok(())
///         })
///     })),
///     Arc::new(handler_fn(|_req, res: &mut Response, _next| {
///         Box::pin(async move {
///             res.send("done");
///             Ok(())
///         })
///     })),
/// ];
///
/// let mut req = Request::builder().method(Method::GET).uri("/").build().unwrap();
/// let mut res = Response::new();
/// let outcome = ChainExecutor::new(&chain).run(&mut req, &mut res).await.unwrap();
///
/// assert_eq!(outcome, ChainOutcome::Terminated);
/// assert_eq!(res.get("x-step"), Some("one"));
/// # });
/// ```
pub struct ChainExecutor<'a> {
	handlers: &'a [Arc<dyn Handler>],
}

impl<'a> ChainExecutor<'a> {
	/// Creates an executor over `handlers`.
	pub fn new(handlers: &'a [Arc<dyn Handler>]) -> Self {
		Self { handlers }
	}

	/// Runs the chain to its first stopping point.
	///
	/// # Errors
	///
	/// Returns the first handler error; remaining handlers do not run.
	pub async fn run(&self, req: &mut Request, res: &mut Response) -> Result<ChainOutcome> {
		let mut cursor = 0;

		while cursor < self.handlers.len() {
			// A finalized response gates every invocation, including the
			// first: a handler must never run after the terminal write.
			if res.is_finished() {
				return Ok(ChainOutcome::Terminated);
			}

			let next = Next::new();
			self.handlers[cursor].handle(req, res, &next).await?;

			if res.is_finished() {
				return Ok(ChainOutcome::Terminated);
			}
			if !next.called() {
				return Ok(ChainOutcome::Abandoned);
			}
			cursor += 1;
		}

		if res.is_finished() {
			Ok(ChainOutcome::Terminated)
		} else {
			Ok(ChainOutcome::Exhausted)
		}
	}
}
