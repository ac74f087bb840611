//! # Velaro
//!
//! An Express-inspired routing and middleware framework for Rust.
//!
//! Velaro provides the request-routing core of a web framework: declarative
//! path templates compiled into stateless matchers, an ordered registry of
//! routes and middleware layers, and a chain executor with explicit
//! continuation control. It deliberately stops at the transport boundary;
//! an HTTP server hands an abstract request to
//! [`Application::handle`](routers::Application::handle) and writes back the
//! terminal response it returns.
//!
//! ## A small application
//!
//! ```
//! use velaro::{Application, handler_fn, json, Request, Response};
//! use hyper::Method;
//!
//! # tokio_test::block_on(async {
//! let app = Application::new();
//! app.with_middleware(json()).unwrap();
//! app.get("/users/:id", handler_fn(|req, res: &mut Response, _next| {
//!     let id = req.param("id").unwrap_or("").to_string();
//!     Box::pin(async move {
//!         res.json(&serde_json::json!({ "id": id }))?;
//!         Ok(())
//!     })
//! })).unwrap();
//!
//! let req = Request::builder().method(Method::GET).uri("/users/42").build().unwrap();
//! let res = app.handle(req).await;
//! assert_eq!(res.body, bytes::Bytes::from(r#"{"id":"42"}"#));
//! # });
//! ```
//!
//! ## Crates
//!
//! - [`http`]: request/response types, the [`Handler`] contract and the
//!   error taxonomy.
//! - [`routers`]: pattern compiler, registries, chain executor,
//!   [`Router`] and [`Application`].
//! - [`middleware`]: body-parsing middleware (`json`, `urlencoded`,
//!   `form_data`).

pub use velaro_http as http;
pub use velaro_middleware as middleware;
pub use velaro_routers as routers;

pub use velaro_http::{
	Error, ErrorHandler, Extensions, Handler, MultipartForm, Next, PathParams, Payload, Request,
	Response, Result, UploadedFile, error_handler_fn, handler_fn,
};
pub use velaro_middleware::{
	FormDataOptions, JsonOptions, UrlencodedOptions, form_data, form_data_with, json, json_with,
	parse_size, urlencoded, urlencoded_with,
};
pub use velaro_routers::{
	Application, ChainExecutor, ChainOutcome, DispatchOutcome, Dispatchable, Entry, MatchKind,
	PathMatch, PathPattern, RouteOptions, Router,
};
