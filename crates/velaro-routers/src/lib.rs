//! Routing and dispatch for the Velaro framework.
//!
//! The pieces, leaf-first:
//!
//! - [`PathPattern`] compiles a path template (`/users/:id`) into a stateless
//!   matcher that extracts named parameters.
//! - [`Entry`] is one registered (method, pattern, handler chain) tuple; a
//!   [`Router`] owns an ordered registry of them.
//! - [`ChainExecutor`] runs one entry's handler chain, advancing on the
//!   explicit [`Next`](velaro_http::Next) continuation.
//! - [`Application`] composes a top-level router, tracks mount metadata for
//!   nested applications, and is the entry point a transport layer calls.

pub mod application;
pub mod chain;
pub mod handlers;
pub mod pattern;
pub mod route;
pub mod router;

pub use application::Application;
pub use chain::{ChainExecutor, ChainOutcome};
pub use handlers::IntoHandlers;
pub use pattern::{MatchKind, PathMatch, PathPattern, RouteOptions};
pub use route::{Dispatchable, DispatchOutcome, Entry};
pub use router::Router;
