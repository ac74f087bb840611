//! HTTP primitives for the Velaro framework.
//!
//! This crate defines the request/response pair that flows through a handler
//! chain, the [`Handler`] contract with its explicit [`Next`] continuation,
//! and the framework-wide [`Error`] taxonomy. Routing and dispatch live in
//! `velaro-routers`; body parsing lives in `velaro-middleware`.

pub mod error;
pub mod extensions;
pub mod handler;
pub mod params;
pub mod payload;
pub mod request;
pub mod response;

pub use error::{Error, Result};
pub use extensions::Extensions;
pub use handler::{
	ErrorHandler, ErrorHandlerFuture, FnErrorHandler, FnHandler, Handler, HandlerFuture, Next,
	error_handler_fn, handler_fn,
};
pub use params::PathParams;
pub use payload::{MultipartForm, Payload, UploadedFile};
pub use request::{Request, RequestBuilder};
pub use response::Response;
