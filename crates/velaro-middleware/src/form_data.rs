//! Multipart form-data body parsing.

use async_trait::async_trait;
use bytes::Bytes;
use hyper::StatusCode;
use once_cell::sync::Lazy;
use regex::Regex;
use velaro_http::{
	Error, Handler, MultipartForm, Next, Payload, Request, Response, Result, UploadedFile,
};

use crate::limit::parse_size;
use crate::DEFAULT_LIMIT;

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r#"(?i)content-disposition:\s*form-data;[^\r\n]*\bname="([^"]+)""#)
		.unwrap_or_else(|_| unreachable!("valid literal regex"))
});

static FILENAME_RE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r#"(?i)\bfilename="([^"]*)""#).unwrap_or_else(|_| unreachable!("valid literal regex"))
});

static CONTENT_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"(?i)content-type:\s*([^\r\n]+)").unwrap_or_else(|_| unreachable!("valid literal regex"))
});

/// Options for the [`form_data`] middleware.
#[derive(Debug, Clone)]
pub struct FormDataOptions {
	/// Maximum accepted body size in bytes. Default 100KB.
	pub limit: usize,
}

impl Default for FormDataOptions {
	fn default() -> Self {
		Self { limit: DEFAULT_LIMIT }
	}
}

impl FormDataOptions {
	/// Creates options with the defaults.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the size limit from a human-readable string.
	///
	/// # Errors
	///
	/// Fails at configuration time when the string is not a valid size.
	pub fn limit(mut self, limit: &str) -> Result<Self> {
		self.limit = parse_size(limit)?;
		Ok(self)
	}

	/// Sets the size limit in bytes.
	pub fn limit_bytes(mut self, limit: usize) -> Self {
		self.limit = limit;
		self
	}
}

/// Middleware that decodes `multipart/form-data` bodies. See [`form_data`].
pub struct FormData {
	options: FormDataOptions,
}

/// Creates multipart body-parsing middleware with default options.
///
/// Plain fields land in `req.payload` as [`Payload::Multipart`] fields;
/// parts carrying a `filename` land in its files, keyed by field name.
pub fn form_data() -> FormData {
	FormData {
		options: FormDataOptions::default(),
	}
}

/// Creates multipart body-parsing middleware with explicit options.
pub fn form_data_with(options: FormDataOptions) -> FormData {
	FormData { options }
}

#[async_trait]
impl Handler for FormData {
	async fn handle(&self, req: &mut Request, res: &mut Response, next: &Next) -> Result<()> {
		if req.content_type() != Some("multipart/form-data") || req.body.is_empty() {
			next.proceed();
			return Ok(());
		}

		if req.body.len() > self.options.limit {
			tracing::warn!(
				size = req.body.len(),
				limit = self.options.limit,
				"multipart body over limit"
			);
			res.status(StatusCode::PAYLOAD_TOO_LARGE);
			res.end();
			return Ok(());
		}

		let boundary = req
			.header(hyper::header::CONTENT_TYPE.as_str())
			.and_then(extract_boundary)
			.ok_or_else(|| Error::MalformedBody("missing multipart boundary".to_string()))?;

		let form = parse_multipart(&req.body, &boundary);
		req.payload = Some(Payload::Multipart(form));
		next.proceed();
		Ok(())
	}
}

/// Pulls the boundary parameter out of a `Content-Type` header value.
fn extract_boundary(content_type: &str) -> Option<String> {
	content_type
		.split(';')
		.map(str::trim)
		.find_map(|part| part.strip_prefix("boundary="))
		.map(|boundary| boundary.trim().trim_matches('"').to_string())
		.filter(|boundary| !boundary.is_empty())
}

/// Decodes the parts of a multipart body.
///
/// Parts without a parsable `Content-Disposition` name are skipped rather
/// than failing the whole body.
fn parse_multipart(body: &[u8], boundary: &str) -> MultipartForm {
	let delimiter = format!("--{}", boundary);
	let mut form = MultipartForm::default();

	// The first split chunk is the preamble, the last follows the closing
	// `--boundary--` marker; both carry no part data.
	for part in split_on(body, delimiter.as_bytes()) {
		let part = strip_crlf(part);
		if part.is_empty() || part == b"--" {
			continue;
		}

		let Some(split_at) = find(part, b"\r\n\r\n") else {
			continue;
		};
		let head = String::from_utf8_lossy(&part[..split_at]);
		let content = strip_trailing_crlf(&part[split_at + 4..]);

		let Some(name) = NAME_RE.captures(&head).map(|c| c[1].to_string()) else {
			continue;
		};

		match FILENAME_RE.captures(&head) {
			Some(caps) => {
				let content_type = CONTENT_TYPE_RE
					.captures(&head)
					.map(|c| c[1].trim().to_string());
				form.files.insert(
					name,
					UploadedFile {
						filename: caps[1].to_string(),
						content_type,
						content: Bytes::copy_from_slice(content),
					},
				);
			}
			None => {
				form.fields
					.insert(name, String::from_utf8_lossy(content).to_string());
			}
		}
	}

	form
}

fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
	let mut parts = Vec::new();
	let mut start = 0;
	while let Some(pos) = find(&haystack[start..], needle) {
		parts.push(&haystack[start..start + pos]);
		start += pos + needle.len();
	}
	parts.push(&haystack[start..]);
	parts
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	if needle.is_empty() || haystack.len() < needle.len() {
		return None;
	}
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}

fn strip_crlf(part: &[u8]) -> &[u8] {
	part.strip_prefix(b"\r\n").unwrap_or(part)
}

fn strip_trailing_crlf(content: &[u8]) -> &[u8] {
	content.strip_suffix(b"\r\n").unwrap_or(content)
}
