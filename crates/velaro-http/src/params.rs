//! Path parameters captured during route matching.

/// Named path parameters in template order.
///
/// Parameters keep the order in which they appear in the route template, so
/// `/users/:user_id/posts/:post_id` yields `user_id` before `post_id` when
/// iterating.
///
/// # Examples
///
/// ```
/// use velaro_http::PathParams;
///
/// let mut params = PathParams::new();
/// params.insert("user_id", "42");
/// params.insert("post_id", "7");
///
/// assert_eq!(params.get("user_id"), Some("42"));
/// assert_eq!(
///     params.iter().map(|(name, _)| name).collect::<Vec<_>>(),
///     vec!["user_id", "post_id"],
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
	items: Vec<(String, String)>,
}

impl PathParams {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self { items: Vec::new() }
	}

	/// Inserts a parameter, replacing the value if the name already exists.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();
		match self.items.iter_mut().find(|(n, _)| *n == name) {
			Some((_, v)) => *v = value,
			None => self.items.push((name, value)),
		}
	}

	/// Returns the value captured for `name`, if any.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.items
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, v)| v.as_str())
	}

	/// Iterates over `(name, value)` pairs in template order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.items.iter().map(|(n, v)| (n.as_str(), v.as_str()))
	}

	/// Merges `other` into `self`; values from `other` win on name collision.
	pub fn extend(&mut self, other: &PathParams) {
		for (name, value) in other.iter() {
			self.insert(name, value);
		}
	}

	/// Number of captured parameters.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Returns true if nothing was captured.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}
