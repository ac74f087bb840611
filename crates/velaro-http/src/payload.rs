//! Decoded request bodies.
//!
//! Body-parsing middleware buffers the raw payload, decodes it according to
//! the declared `Content-Type`, and stores the result on the request for
//! handlers further down the chain.

use bytes::Bytes;
use std::collections::HashMap;

/// A decoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
	/// `application/json` body.
	Json(serde_json::Value),
	/// `application/x-www-form-urlencoded` body.
	Form(HashMap<String, String>),
	/// `multipart/form-data` body.
	Multipart(MultipartForm),
}

impl Payload {
	/// Returns the JSON value if this payload was decoded from JSON.
	pub fn as_json(&self) -> Option<&serde_json::Value> {
		match self {
			Payload::Json(value) => Some(value),
			_ => None,
		}
	}

	/// Returns the form fields if this payload was decoded from a urlencoded body.
	pub fn as_form(&self) -> Option<&HashMap<String, String>> {
		match self {
			Payload::Form(fields) => Some(fields),
			_ => None,
		}
	}

	/// Returns the multipart form if this payload was decoded from multipart data.
	pub fn as_multipart(&self) -> Option<&MultipartForm> {
		match self {
			Payload::Multipart(form) => Some(form),
			_ => None,
		}
	}
}

/// Fields and files decoded from a `multipart/form-data` body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
	/// Plain form fields, keyed by field name.
	pub fields: HashMap<String, String>,
	/// Uploaded files, keyed by field name.
	pub files: HashMap<String, UploadedFile>,
}

/// A single file from a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
	/// Filename as sent by the client. Not safe for filesystem use as-is.
	pub filename: String,
	/// `Content-Type` of the part, when the client sent one.
	pub content_type: Option<String>,
	/// Raw file content.
	pub content: Bytes,
}
