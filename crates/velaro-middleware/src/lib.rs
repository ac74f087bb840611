//! Body-parsing middleware for the Velaro framework.
//!
//! Each parser is an ordinary [`Handler`](velaro_http::Handler): it inspects
//! the request's `Content-Type`, decodes the buffered body into
//! [`req.payload`](velaro_http::Request::payload), and calls the continuation.
//! A request with a different content type passes through untouched; a body
//! over the configured limit is answered with `413` on the spot; a body that
//! fails to decode surfaces a 400-class error to the chain.

pub mod form_data;
pub mod json;
pub mod limit;
pub mod urlencoded;

pub use form_data::{FormData, FormDataOptions, form_data, form_data_with};
pub use json::{Json, JsonOptions, json, json_with};
pub use limit::parse_size;
pub use urlencoded::{Urlencoded, UrlencodedOptions, urlencoded, urlencoded_with};

/// Default body size limit: 100KB.
pub const DEFAULT_LIMIT: usize = 100 * 1024;
