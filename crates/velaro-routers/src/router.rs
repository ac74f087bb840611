//! Route registry and request dispatch.

use async_trait::async_trait;
use hyper::{Method, StatusCode};
use std::sync::Arc;
use velaro_http::{Error, ErrorHandler, Request, Response, Result};

use crate::chain::ChainExecutor;
use crate::handlers::IntoHandlers;
use crate::pattern::{MatchKind, PathPattern, RouteOptions};
use crate::route::{Dispatchable, DispatchOutcome, Entry, EntryHandlers};

/// An ordered registry of routes and middleware layers.
///
/// Each router owns its registry; registration order is the sole matching
/// precedence. The registry is built before serving begins and read-only
/// during dispatch: concurrent requests walk independent snapshots (see
/// [`Application`](crate::Application)) or share `&self`.
///
/// # Examples
///
/// ```
/// use velaro_http::handler_fn;
/// use velaro_routers::Router;
///
/// let router = Router::new()
///     .get("/users/:id", handler_fn(|req, res: &mut velaro_http::Response, _next| {
///         let id = req.param("id").unwrap_or("").to_string();
///         Box::pin(async move {
///             res.send(id);
///             Ok(())
///         })
///     }))
///     .unwrap();
/// # let _ = router;
/// ```
#[derive(Clone, Default)]
pub struct Router {
	registry: Vec<Entry>,
	options: RouteOptions,
	error_handler: Option<Arc<dyn ErrorHandler>>,
}

impl Router {
	/// Creates a router with default [`RouteOptions`].
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a router with explicit matching options.
	pub fn with_options(options: RouteOptions) -> Self {
		Self {
			registry: Vec::new(),
			options,
			error_handler: None,
		}
	}

	/// The options routes on this router are compiled with.
	pub fn route_options(&self) -> &RouteOptions {
		&self.options
	}

	/// Registered entries, in registration order.
	pub fn registry(&self) -> &[Entry] {
		&self.registry
	}

	/// Registers a route for `method` at `path`.
	///
	/// The pattern is compiled here, so a malformed template fails the
	/// registering call, never a request.
	pub fn route<M>(
		mut self,
		method: Method,
		path: &str,
		handlers: impl IntoHandlers<M>,
	) -> Result<Self> {
		let handlers = Self::checked(handlers)?;
		let pattern = PathPattern::compile(path, &self.options, MatchKind::Full)?;
		self.registry.push(Entry::route(Some(method), pattern, handlers));
		Ok(self)
	}

	/// Registers a route matching every HTTP method at `path`.
	pub fn all<M>(mut self, path: &str, handlers: impl IntoHandlers<M>) -> Result<Self> {
		let handlers = Self::checked(handlers)?;
		let pattern = PathPattern::compile(path, &self.options, MatchKind::Full)?;
		self.registry.push(Entry::route(None, pattern, handlers));
		Ok(self)
	}

	/// Registers a GET route.
	pub fn get<M>(self, path: &str, handlers: impl IntoHandlers<M>) -> Result<Self> {
		self.route(Method::GET, path, handlers)
	}

	/// Registers a POST route.
	pub fn post<M>(self, path: &str, handlers: impl IntoHandlers<M>) -> Result<Self> {
		self.route(Method::POST, path, handlers)
	}

	/// Registers a PUT route.
	pub fn put<M>(self, path: &str, handlers: impl IntoHandlers<M>) -> Result<Self> {
		self.route(Method::PUT, path, handlers)
	}

	/// Registers a DELETE route.
	pub fn delete<M>(self, path: &str, handlers: impl IntoHandlers<M>) -> Result<Self> {
		self.route(Method::DELETE, path, handlers)
	}

	/// Registers a PATCH route.
	pub fn patch<M>(self, path: &str, handlers: impl IntoHandlers<M>) -> Result<Self> {
		self.route(Method::PATCH, path, handlers)
	}

	/// Registers a HEAD route.
	pub fn head<M>(self, path: &str, handlers: impl IntoHandlers<M>) -> Result<Self> {
		self.route(Method::HEAD, path, handlers)
	}

	/// Registers an OPTIONS route.
	pub fn options<M>(self, path: &str, handlers: impl IntoHandlers<M>) -> Result<Self> {
		self.route(Method::OPTIONS, path, handlers)
	}

	/// Registers a TRACE route.
	pub fn trace<M>(self, path: &str, handlers: impl IntoHandlers<M>) -> Result<Self> {
		self.route(Method::TRACE, path, handlers)
	}

	/// Registers a CONNECT route.
	pub fn connect<M>(self, path: &str, handlers: impl IntoHandlers<M>) -> Result<Self> {
		self.route(Method::CONNECT, path, handlers)
	}

	/// Registers middleware that runs for every request.
	pub fn with_middleware<M>(mut self, handlers: impl IntoHandlers<M>) -> Result<Self> {
		let handlers = Self::checked(handlers)?;
		let pattern = PathPattern::catch_all(&self.options);
		self.registry.push(Entry::layer(pattern, handlers));
		Ok(self)
	}

	/// Registers middleware that runs for requests under `prefix`.
	///
	/// The prefix is normalized to start with `/`.
	pub fn with_middleware_at<M>(
		mut self,
		prefix: &str,
		handlers: impl IntoHandlers<M>,
	) -> Result<Self> {
		let handlers = Self::checked(handlers)?;
		let prefix = normalize_prefix(prefix);
		let pattern = PathPattern::compile(&prefix, &self.options, MatchKind::Prefix)?;
		self.registry.push(Entry::layer(pattern, handlers));
		Ok(self)
	}

	/// Mounts another router at `prefix`.
	///
	/// The child dispatches against the unmatched remainder of the path; a
	/// miss inside the child falls through to this router's later entries.
	pub fn mount(self, prefix: &str, child: Router) -> Result<Self> {
		self.mount_dispatchable(prefix, Arc::new(child))
	}

	/// Mounts any dispatchable value at `prefix`.
	pub fn mount_dispatchable(
		mut self,
		prefix: &str,
		target: Arc<dyn Dispatchable>,
	) -> Result<Self> {
		let prefix = normalize_prefix(prefix);
		let pattern = PathPattern::compile(&prefix, &self.options, MatchKind::Prefix)?;
		self.registry.push(Entry::mount(pattern, target));
		Ok(self)
	}

	/// Sets the error handler claiming failures from this router's chains
	/// and from routers mounted on it.
	pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
		self.error_handler = Some(Arc::new(handler));
		self
	}

	/// Dispatches `req` and guarantees a terminal response: 404 with an
	/// empty body when nothing matched, the error's status when a failure
	/// escaped every error handler, and a plain end for a route chain that
	/// stopped without writing.
	pub async fn handle(&self, req: &mut Request, res: &mut Response) {
		match self.dispatch(req, res).await {
			Ok(DispatchOutcome::Handled) => {
				if !res.is_finished() {
					res.end();
				}
			}
			Ok(DispatchOutcome::Unhandled) => {
				if !res.is_finished() {
					res.status(StatusCode::NOT_FOUND);
					res.end();
				}
			}
			Err(err) => {
				tracing::warn!(error = %err, method = %req.method, path = %req.path, "request failed");
				if !res.is_finished() {
					res.status(err.status_code());
					let body = serde_json::json!({ "error": err.to_string() });
					if res.json(&body).is_err() {
						res.end();
					}
				}
			}
		}
	}

	/// Routes a chain failure to this router's error handler, or keeps
	/// propagating when none is set.
	async fn claim_error(
		&self,
		err: Error,
		req: &mut Request,
		res: &mut Response,
	) -> Result<DispatchOutcome> {
		match &self.error_handler {
			Some(handler) => {
				handler.handle_error(err, req, res).await?;
				Ok(DispatchOutcome::Handled)
			}
			None => Err(err),
		}
	}

	fn checked<M>(handlers: impl IntoHandlers<M>) -> Result<Vec<Arc<dyn velaro_http::Handler>>> {
		let handlers = handlers.into_handlers();
		if handlers.is_empty() {
			return Err(Error::InvalidMiddleware(
				"registration requires at least one handler".to_string(),
			));
		}
		Ok(handlers)
	}
}

#[async_trait]
impl Dispatchable for Router {
	async fn dispatch(&self, req: &mut Request, res: &mut Response) -> Result<DispatchOutcome> {
		let path = req.path.clone();
		let incoming = req.params.clone();

		for entry in &self.registry {
			// A layer that already finalized the response ends the scan;
			// nothing may run against a finished response.
			if res.is_finished() {
				return Ok(DispatchOutcome::Handled);
			}

			let Some(m) = entry.matches(&req.method, &path) else {
				continue;
			};

			let mut params = if self.options.merge_params {
				let mut merged = incoming.clone();
				merged.extend(&m.params);
				merged
			} else {
				m.params.clone()
			};

			match entry.handlers() {
				EntryHandlers::Chain(handlers) => {
					std::mem::swap(&mut req.params, &mut params);
					let result = ChainExecutor::new(handlers).run(req, res).await;
					match result {
						Ok(_) if entry.is_route() => {
							tracing::debug!(
								method = %req.method,
								path = %path,
								pattern = %entry.pattern(),
								"route matched"
							);
							return Ok(DispatchOutcome::Handled);
						}
						Ok(_) => {} // layers never stop the scan
						Err(err) => return self.claim_error(err, req, res).await,
					}
				}
				EntryHandlers::Mount(target) => {
					let tail = &path[m.tail_start..];
					let tail = if tail.is_empty() { "/" } else { tail };

					// The child matches against its own view of the path and
					// sees this entry's captures as incoming parameters; its
					// own `merge_params` decides whether they survive.
					let saved_path = std::mem::replace(&mut req.path, tail.to_string());
					let saved_params = std::mem::replace(&mut req.params, params);

					let result = target.dispatch(req, res).await;

					req.path = saved_path;
					req.params = saved_params;

					match result {
						Ok(DispatchOutcome::Handled) => return Ok(DispatchOutcome::Handled),
						Ok(DispatchOutcome::Unhandled) => {} // fall through to later entries
						Err(err) => return self.claim_error(err, req, res).await,
					}
				}
			}
		}

		Ok(DispatchOutcome::Unhandled)
	}
}

impl std::fmt::Debug for Router {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("entries", &self.registry.len())
			.field("options", &self.options)
			.finish()
	}
}

/// Normalizes a mount prefix to start with `/`.
fn normalize_prefix(prefix: &str) -> String {
	if prefix.is_empty() {
		"/".to_string()
	} else if prefix.starts_with('/') {
		prefix.to_string()
	} else {
		format!("/{}", prefix)
	}
}
