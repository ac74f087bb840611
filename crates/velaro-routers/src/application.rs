//! Application composition and mount metadata.

use async_trait::async_trait;
use bytes::Bytes;
use hyper::Method;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use velaro_http::{ErrorHandler, Request, Response, Result};

use crate::handlers::IntoHandlers;
use crate::pattern::RouteOptions;
use crate::route::{Dispatchable, DispatchOutcome};
use crate::router::Router;

/// Mount metadata: where a node is mounted and on whom.
///
/// The parent link is a back-reference only (`Weak`): a child never keeps its
/// parent alive, it just walks the chain when asked for its canonical path.
#[derive(Default)]
struct MountNode {
	mountpath: RwLock<String>,
	parent: RwLock<Option<Weak<MountNode>>>,
}

impl MountNode {
	/// Canonical path from the root: the parent's path plus this node's
	/// mount path. Recomputed on every call so it reflects the current
	/// mount state.
	fn path(&self) -> String {
		let own = self.mountpath.read().clone();
		let parent = self.parent.read().as_ref().and_then(Weak::upgrade);
		match parent {
			Some(parent) => format!("{}{}", parent.path(), own),
			None => own,
		}
	}
}

struct AppInner {
	router: RwLock<Router>,
	node: Arc<MountNode>,
	settings: RwLock<HashMap<String, String>>,
}

/// The public entry point composed of a top-level router.
///
/// An application is cheaply cloneable; clones share the same router and
/// settings. The router is mutated only during setup; each
/// [`handle`](Application::handle) call dispatches against an immutable
/// snapshot, so registration concurrent with traffic can never expose a
/// half-built registry to a request.
///
/// # Examples
///
/// ```
/// use velaro_http::{handler_fn, Request, Response};
/// use velaro_routers::Application;
/// use hyper::Method;
///
/// # tokio_test::block_on(async {
/// let app = Application::new();
/// app.get("/hello/:name", handler_fn(|req, res: &mut Response, _next| {
///     let name = req.param("name").unwrap_or("world").to_string();
///     Box::pin(async move {
///         res.send(format!("hello {}", name));
///         Ok(())
///     })
/// })).unwrap();
///
/// let req = Request::builder().method(Method::GET).uri("/hello/ada").build().unwrap();
/// let res = app.handle(req).await;
/// assert_eq!(res.body, bytes::Bytes::from("hello ada"));
/// # });
/// ```
#[derive(Clone)]
pub struct Application {
	inner: Arc<AppInner>,
}

impl Application {
	/// Creates an application with default routing options.
	pub fn new() -> Self {
		Self::with_options(RouteOptions::default())
	}

	/// Creates an application whose routes compile with `options`.
	pub fn with_options(options: RouteOptions) -> Self {
		Self {
			inner: Arc::new(AppInner {
				router: RwLock::new(Router::with_options(options)),
				node: Arc::new(MountNode::default()),
				settings: RwLock::new(HashMap::new()),
			}),
		}
	}

	/// Registers a route for `method` at `path`.
	pub fn route<M>(
		&self,
		method: Method,
		path: &str,
		handlers: impl IntoHandlers<M>,
	) -> Result<&Self> {
		self.update_router(|router| router.route(method, path, handlers))
	}

	/// Registers a route matching every HTTP method.
	pub fn all<M>(&self, path: &str, handlers: impl IntoHandlers<M>) -> Result<&Self> {
		self.update_router(|router| router.all(path, handlers))
	}

	/// Registers a GET route.
	pub fn get<M>(&self, path: &str, handlers: impl IntoHandlers<M>) -> Result<&Self> {
		self.route(Method::GET, path, handlers)
	}

	/// Registers a POST route.
	pub fn post<M>(&self, path: &str, handlers: impl IntoHandlers<M>) -> Result<&Self> {
		self.route(Method::POST, path, handlers)
	}

	/// Registers a PUT route.
	pub fn put<M>(&self, path: &str, handlers: impl IntoHandlers<M>) -> Result<&Self> {
		self.route(Method::PUT, path, handlers)
	}

	/// Registers a DELETE route.
	pub fn delete<M>(&self, path: &str, handlers: impl IntoHandlers<M>) -> Result<&Self> {
		self.route(Method::DELETE, path, handlers)
	}

	/// Registers a PATCH route.
	pub fn patch<M>(&self, path: &str, handlers: impl IntoHandlers<M>) -> Result<&Self> {
		self.route(Method::PATCH, path, handlers)
	}

	/// Registers a HEAD route.
	pub fn head<M>(&self, path: &str, handlers: impl IntoHandlers<M>) -> Result<&Self> {
		self.route(Method::HEAD, path, handlers)
	}

	/// Registers an OPTIONS route.
	pub fn options<M>(&self, path: &str, handlers: impl IntoHandlers<M>) -> Result<&Self> {
		self.route(Method::OPTIONS, path, handlers)
	}

	/// Registers middleware that runs for every request.
	pub fn with_middleware<M>(&self, handlers: impl IntoHandlers<M>) -> Result<&Self> {
		self.update_router(|router| router.with_middleware(handlers))
	}

	/// Registers middleware under a path prefix (normalized to start with `/`).
	pub fn with_middleware_at<M>(
		&self,
		prefix: &str,
		handlers: impl IntoHandlers<M>,
	) -> Result<&Self> {
		self.update_router(|router| router.with_middleware_at(prefix, handlers))
	}

	/// Sets the error handler for the application's router.
	pub fn error_handler(&self, handler: impl ErrorHandler + 'static) -> &Self {
		let mut guard = self.inner.router.write();
		let router = std::mem::take(&mut *guard);
		*guard = router.error_handler(handler);
		self
	}

	/// Mounts `child` at `prefix`, stamping its mount metadata.
	///
	/// The child keeps working as a standalone value; mounting only adds a
	/// back-reference used by [`path`](Application::path).
	pub fn mount(&self, prefix: &str, child: &Application) -> Result<&Self> {
		let prefix = if prefix.starts_with('/') {
			prefix.to_string()
		} else {
			format!("/{}", prefix)
		};

		*child.inner.node.mountpath.write() = prefix.clone();
		*child.inner.node.parent.write() = Some(Arc::downgrade(&self.inner.node));

		let target: Arc<dyn Dispatchable> = Arc::new(child.clone());
		self.update_router(|router| router.mount_dispatchable(&prefix, target))
	}

	/// Mounts a plain router at `prefix`.
	pub fn mount_router(&self, prefix: &str, router: Router) -> Result<&Self> {
		self.update_router(|r| r.mount(prefix, router))
	}

	/// The path this application is mounted at, or an empty string at the root.
	pub fn mountpath(&self) -> String {
		self.inner.node.mountpath.read().clone()
	}

	/// Canonical path computed over the parent chain.
	///
	/// Mounting application `b` on `a` at `/blog` and `c` on `b` at `/admin`
	/// makes `c.path()` return `/blog/admin`.
	pub fn path(&self) -> String {
		self.inner.node.path()
	}

	/// Handles one request, always producing a terminal response.
	///
	/// This is the single entry point the transport layer calls: a request
	/// that matches nothing yields 404 with an empty body, an error that no
	/// error handler claimed yields the error's status, and a HEAD request
	/// keeps headers but drops the body.
	pub async fn handle(&self, req: Request) -> Response {
		// Snapshot under the read lock, dispatch outside it: registration
		// during live traffic swaps in a new registry without a request ever
		// observing a partially built one.
		let router = self.inner.router.read().clone();

		let mut req = req;
		let head = req.method == Method::HEAD;
		let mut res = Response::new();

		router.handle(&mut req, &mut res).await;

		if head {
			res.body = Bytes::new();
		}
		res
	}

	/// Sets a string setting.
	pub fn set(&self, name: impl Into<String>, value: impl Into<String>) -> &Self {
		self.inner.settings.write().insert(name.into(), value.into());
		self
	}

	/// Returns a setting's value.
	pub fn setting(&self, name: &str) -> Option<String> {
		self.inner.settings.read().get(name).cloned()
	}

	/// Sets a boolean setting to true.
	pub fn enable(&self, name: &str) -> &Self {
		self.set(name, "true")
	}

	/// Sets a boolean setting to false.
	pub fn disable(&self, name: &str) -> &Self {
		self.set(name, "false")
	}

	/// Returns true if the setting is enabled.
	pub fn enabled(&self, name: &str) -> bool {
		self.setting(name).as_deref() == Some("true")
	}

	/// Returns true if the setting is disabled.
	pub fn disabled(&self, name: &str) -> bool {
		!self.enabled(name)
	}

	fn update_router<F>(&self, f: F) -> Result<&Self>
	where
		F: FnOnce(Router) -> Result<Router>,
	{
		let mut guard = self.inner.router.write();
		let router = std::mem::take(&mut *guard);
		match f(router) {
			Ok(router) => {
				*guard = router;
				Ok(self)
			}
			Err(err) => Err(err),
		}
	}
}

impl Default for Application {
	fn default() -> Self {
		Self::new()
	}
}

/// Mounted applications dispatch like routers; a miss falls through to the
/// parent's later entries instead of producing a 404.
#[async_trait]
impl Dispatchable for Application {
	async fn dispatch(&self, req: &mut Request, res: &mut Response) -> Result<DispatchOutcome> {
		let router = self.inner.router.read().clone();
		router.dispatch(req, res).await
	}
}

impl std::fmt::Debug for Application {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Application")
			.field("mountpath", &self.mountpath())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use hyper::StatusCode;
	use velaro_http::handler_fn;

	fn respond(body: &'static str) -> impl velaro_http::Handler {
		handler_fn(move |_req, res: &mut Response, _next| {
			Box::pin(async move {
				res.send(body);
				Ok(())
			})
		})
	}

	fn get(uri: &str) -> Request {
		Request::builder().method(Method::GET).uri(uri).build().unwrap()
	}

	#[tokio::test]
	async fn test_handle_produces_404_for_unknown_path() {
		let app = Application::new();
		app.get("/known", respond("ok")).unwrap();

		let res = app.handle(get("/unknown")).await;
		assert_eq!(res.status, StatusCode::NOT_FOUND);
		assert!(res.body.is_empty());
	}

	#[tokio::test]
	async fn test_mounted_app_handles_prefixed_requests() {
		let app = Application::new();
		let blog = Application::new();
		blog.get("/posts", respond("posts")).unwrap();
		app.mount("/blog", &blog).unwrap();

		let res = app.handle(get("/blog/posts")).await;
		assert_eq!(res.body, Bytes::from("posts"));

		// The mount prefix itself resolves inside the child as "/".
		let root = Application::new();
		let admin = Application::new();
		admin.get("/", respond("admin-home")).unwrap();
		root.mount("/admin", &admin).unwrap();

		let res = root.handle(get("/admin")).await;
		assert_eq!(res.body, Bytes::from("admin-home"));
	}

	#[tokio::test]
	async fn test_mount_miss_falls_through_to_later_entries() {
		let app = Application::new();
		let api = Application::new();
		api.get("/v1", respond("v1")).unwrap();
		app.mount("/api", &api).unwrap();
		app.get("/api/v2", respond("v2-fallback")).unwrap();

		let res = app.handle(get("/api/v2")).await;
		assert_eq!(res.body, Bytes::from("v2-fallback"));
	}

	#[test]
	fn test_nested_mount_paths_compose() {
		let a = Application::new();
		let b = Application::new();
		let c = Application::new();

		a.mount("/blog", &b).unwrap();
		b.mount("/admin", &c).unwrap();

		assert_eq!(a.path(), "");
		assert_eq!(b.path(), "/blog");
		assert_eq!(c.path(), "/blog/admin");
		assert_eq!(c.mountpath(), "/admin");
	}

	#[test]
	fn test_path_reflects_current_mount_state() {
		let a = Application::new();
		let b = Application::new();
		assert_eq!(b.path(), "");

		a.mount("/first", &b).unwrap();
		assert_eq!(b.path(), "/first");

		// Remounting elsewhere updates the computed path; nothing is cached.
		let other = Application::new();
		other.mount("/second", &b).unwrap();
		assert_eq!(b.path(), "/second");
	}

	#[tokio::test]
	async fn test_head_request_drops_body_keeps_headers() {
		let app = Application::new();
		app.head("/doc", respond("ignored")).unwrap();

		let req = Request::builder().method(Method::HEAD).uri("/doc").build().unwrap();
		let res = app.handle(req).await;

		assert!(res.body.is_empty());
		assert_eq!(res.get("content-type"), Some("text/html; charset=utf-8"));
	}

	#[test]
	fn test_settings_surface() {
		let app = Application::new();
		app.set("env", "production").enable("trust proxy");

		assert_eq!(app.setting("env"), Some("production".to_string()));
		assert!(app.enabled("trust proxy"));

		app.disable("trust proxy");
		assert!(app.disabled("trust proxy"));
		assert!(app.disabled("never set"));
	}

	#[tokio::test]
	async fn test_merge_params_exposes_parent_captures() {
		let child = Application::with_options(RouteOptions {
			merge_params: true,
			..RouteOptions::default()
		});
		child
			.get(
				"/posts/:pid",
				handler_fn(|req, res: &mut Response, _next| {
					let uid = req.param("uid").unwrap_or("missing").to_string();
					let pid = req.param("pid").unwrap_or("missing").to_string();
					Box::pin(async move {
						res.send(format!("{}:{}", uid, pid));
						Ok(())
					})
				}),
			)
			.unwrap();

		let app = Application::new();
		app.with_middleware_at(
			"/users/:uid",
			handler_fn(|_req, _res, next| {
				Box::pin(async move {
					next.proceed();
					Ok(())
				})
			}),
		)
		.unwrap();
		app.mount("/users/:uid", &child).unwrap();

		let res = app.handle(get("/users/42/posts/7")).await;
		assert_eq!(res.body, Bytes::from("42:7"));
	}

	#[tokio::test]
	async fn test_merge_params_disabled_hides_parent_captures() {
		let child = Application::new();
		child
			.get(
				"/posts/:pid",
				handler_fn(|req, res: &mut Response, _next| {
					let uid = req.param("uid").map(str::to_string);
					Box::pin(async move {
						res.send(uid.unwrap_or_else(|| "hidden".to_string()));
						Ok(())
					})
				}),
			)
			.unwrap();

		let app = Application::new();
		app.mount("/users/:uid", &child).unwrap();

		let res = app.handle(get("/users/42/posts/7")).await;
		assert_eq!(res.body, Bytes::from("hidden"));
	}
}
