//! Registry entries.
//!
//! A router's registry is an ordered, append-only list of entries. Each entry
//! is either a *route* (bound to an HTTP method, matched against the whole
//! path, first match wins) or a *layer* (method-less middleware or a mounted
//! sub-router, matched by path prefix, never stops the scan).

use async_trait::async_trait;
use hyper::Method;
use std::sync::Arc;
use velaro_http::{Handler, Request, Response, Result};

use crate::pattern::{MatchKind, PathMatch, PathPattern};

/// Result of one dispatch pass over a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
	/// A route claimed the request (whether or not its chain finished the
	/// response).
	Handled,
	/// No route matched; layers may still have run. The caller decides what
	/// a miss means: the outermost dispatcher turns it into a 404, a mounted
	/// router lets its parent continue scanning.
	Unhandled,
}

/// The dispatch capability of a router or application.
///
/// Mounting registers a value's dispatch function as a method-less layer; an
/// explicit trait keeps the mounted thing an ordinary value rather than a
/// callable with grafted-on methods.
#[async_trait]
pub trait Dispatchable: Send + Sync {
	/// Walks the registry for `req`, writing any terminal result to `res`.
	async fn dispatch(&self, req: &mut Request, res: &mut Response) -> Result<DispatchOutcome>;
}

/// What runs when an entry matches.
#[derive(Clone)]
pub(crate) enum EntryHandlers {
	/// An ordered handler chain.
	Chain(Vec<Arc<dyn Handler>>),
	/// A mounted sub-router, dispatched against the unmatched tail.
	Mount(Arc<dyn Dispatchable>),
}

/// One registered entry.
#[derive(Clone)]
pub struct Entry {
	/// `None` matches any method: layers always, `all`-routes too.
	method: Option<Method>,
	/// `None` plus prefix matching marks a layer; a method plus full
	/// matching marks a route.
	is_route: bool,
	pattern: PathPattern,
	handlers: EntryHandlers,
}

impl Entry {
	/// A route bound to `method` (or to every method for `all`).
	pub(crate) fn route(
		method: Option<Method>,
		pattern: PathPattern,
		handlers: Vec<Arc<dyn Handler>>,
	) -> Self {
		debug_assert_eq!(pattern.kind(), MatchKind::Full);
		Self {
			method,
			is_route: true,
			pattern,
			handlers: EntryHandlers::Chain(handlers),
		}
	}

	/// A middleware layer at a path prefix.
	pub(crate) fn layer(pattern: PathPattern, handlers: Vec<Arc<dyn Handler>>) -> Self {
		debug_assert_eq!(pattern.kind(), MatchKind::Prefix);
		Self {
			method: None,
			is_route: false,
			pattern,
			handlers: EntryHandlers::Chain(handlers),
		}
	}

	/// A mounted sub-router at a path prefix.
	pub(crate) fn mount(pattern: PathPattern, target: Arc<dyn Dispatchable>) -> Self {
		debug_assert_eq!(pattern.kind(), MatchKind::Prefix);
		Self {
			method: None,
			is_route: false,
			pattern,
			handlers: EntryHandlers::Mount(target),
		}
	}

	/// Returns true for routes (stop the scan when matched).
	pub fn is_route(&self) -> bool {
		self.is_route
	}

	/// The method this entry is bound to, if any.
	pub fn method(&self) -> Option<&Method> {
		self.method.as_ref()
	}

	/// The compiled pattern.
	pub fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	pub(crate) fn handlers(&self) -> &EntryHandlers {
		&self.handlers
	}

	/// Matches `method` and `path` against this entry.
	pub(crate) fn matches(&self, method: &Method, path: &str) -> Option<PathMatch> {
		if let Some(bound) = &self.method
			&& bound != method
		{
			return None;
		}
		self.pattern.matches(path)
	}
}

impl std::fmt::Debug for Entry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let kind = match (&self.handlers, self.is_route) {
			(EntryHandlers::Mount(_), _) => "mount",
			(_, true) => "route",
			(_, false) => "layer",
		};
		f.debug_struct("Entry")
			.field("kind", &kind)
			.field("method", &self.method)
			.field("pattern", &self.pattern.template())
			.finish()
	}
}
