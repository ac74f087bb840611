//! Full-stack tests against the facade crate: routing, body parsing and
//! mounting working together the way an application wires them up.

use bytes::Bytes;
use hyper::{Method, StatusCode};
use velaro::{
	Application, JsonOptions, Request, Response, Router, handler_fn, json, json_with, urlencoded,
};

fn request(method: Method, uri: &str) -> Request {
	Request::builder().method(method).uri(uri).build().unwrap()
}

#[tokio::test]
async fn test_json_api_round_trip() {
	let app = Application::new();
	app.with_middleware(json()).unwrap();
	app.post(
		"/users",
		handler_fn(|req, res: &mut Response, _next| {
			let name = req
				.payload
				.as_ref()
				.and_then(|p| p.as_json())
				.and_then(|v| v.get("name"))
				.and_then(|v| v.as_str())
				.unwrap_or("anonymous")
				.to_string();
			Box::pin(async move {
				res.status(StatusCode::CREATED);
				res.json(&serde_json::json!({ "created": name }))?;
				Ok(())
			})
		}),
	)
	.unwrap();

	let req = Request::builder()
		.method(Method::POST)
		.uri("/users")
		.header("content-type", "application/json")
		.body(r#"{"name":"ada"}"#)
		.build()
		.unwrap();

	let res = app.handle(req).await;
	assert_eq!(res.status, StatusCode::CREATED);
	assert_eq!(res.body, Bytes::from(r#"{"created":"ada"}"#));
}

#[tokio::test]
async fn test_payload_too_large_short_circuits_the_route() {
	let app = Application::new();
	app.with_middleware(json_with(JsonOptions::new().limit_bytes(8))).unwrap();
	app.post(
		"/users",
		handler_fn(|_req, res: &mut Response, _next| {
			Box::pin(async move {
				res.send("should never run");
				Ok(())
			})
		}),
	)
	.unwrap();

	let req = Request::builder()
		.method(Method::POST)
		.uri("/users")
		.header("content-type", "application/json")
		.body(r#"{"name":"far too long for the limit"}"#)
		.build()
		.unwrap();

	let res = app.handle(req).await;
	assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
	assert!(res.body.is_empty());
}

#[tokio::test]
async fn test_malformed_json_yields_400() {
	let app = Application::new();
	app.with_middleware(json()).unwrap();
	app.post("/users", handler_fn(|_req, res: &mut Response, _next| {
		Box::pin(async move {
			res.send("unreachable");
			Ok(())
		})
	}))
	.unwrap();

	let req = Request::builder()
		.method(Method::POST)
		.uri("/users")
		.header("content-type", "application/json")
		.body(r#"{"name": "#)
		.build()
		.unwrap();

	let res = app.handle(req).await;
	assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_form_submission_through_mounted_router() {
	let forms = Router::new()
		.post(
			"/contact",
			handler_fn(|req, res: &mut Response, _next| {
				let email = req
					.payload
					.as_ref()
					.and_then(|p| p.as_form())
					.and_then(|fields| fields.get("email"))
					.cloned()
					.unwrap_or_default();
				Box::pin(async move {
					res.send(format!("thanks {}", email));
					Ok(())
				})
			}),
		)
		.unwrap();

	let app = Application::new();
	app.with_middleware(urlencoded()).unwrap();
	app.mount_router("/forms", forms).unwrap();

	let req = Request::builder()
		.method(Method::POST)
		.uri("/forms/contact")
		.header("content-type", "application/x-www-form-urlencoded")
		.body("email=ada%40example.com")
		.build()
		.unwrap();

	let res = app.handle(req).await;
	assert_eq!(res.body, Bytes::from("thanks ada@example.com"));
}

#[tokio::test]
async fn test_fluent_router_registration_reads_like_a_table() {
	let router = Router::new()
		.get("/health", handler_fn(|_req, res: &mut Response, _next| {
			Box::pin(async move {
				res.send("ok");
				Ok(())
			})
		}))
		.unwrap()
		.post("/jobs", handler_fn(|_req, res: &mut Response, _next| {
			Box::pin(async move {
				res.status(StatusCode::ACCEPTED);
				res.end();
				Ok(())
			})
		}))
		.unwrap()
		.delete("/jobs/:id", handler_fn(|req, res: &mut Response, _next| {
			let id = req.param("id").unwrap_or("").to_string();
			Box::pin(async move {
				res.send(format!("deleted {}", id));
				Ok(())
			})
		}))
		.unwrap();

	let app = Application::new();
	app.mount_router("/", router).unwrap();

	assert_eq!(app.handle(request(Method::GET, "/health")).await.body, Bytes::from("ok"));
	assert_eq!(
		app.handle(request(Method::POST, "/jobs")).await.status,
		StatusCode::ACCEPTED
	);
	assert_eq!(
		app.handle(request(Method::DELETE, "/jobs/9")).await.body,
		Bytes::from("deleted 9")
	);
	assert_eq!(
		app.handle(request(Method::PUT, "/jobs")).await.status,
		StatusCode::NOT_FOUND
	);
}

#[tokio::test]
async fn test_middleware_shapes_request_before_route_runs() {
	#[derive(Clone)]
	struct Tenant(String);

	let app = Application::new();
	app.with_middleware(handler_fn(|req, _res, next| {
		let tenant = req.header("x-tenant").unwrap_or("public").to_string();
		req.extensions.insert(Tenant(tenant));
		Box::pin(async move {
			next.proceed();
			Ok(())
		})
	}))
	.unwrap();
	app.get(
		"/dashboard",
		handler_fn(|req, res: &mut Response, _next| {
			let tenant = req
				.extensions
				.get::<Tenant>()
				.map(|t| t.0.clone())
				.unwrap_or_default();
			Box::pin(async move {
				res.send(tenant);
				Ok(())
			})
		}),
	)
	.unwrap();

	let req = Request::builder()
		.method(Method::GET)
		.uri("/dashboard")
		.header("x-tenant", "acme")
		.build()
		.unwrap();

	assert_eq!(app.handle(req).await.body, Bytes::from("acme"));
}
