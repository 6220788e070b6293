//! Access rules scoping what a consumer key may call.

// self
use crate::{_prelude::*, http::Method};

/// `(verb, path pattern)` pair granted to a consumer key, e.g. `GET /cloud/project/*`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessRule {
	/// Verb the rule grants.
	pub method: Method,
	/// Path pattern, `*` acting as a wildcard.
	pub path: String,
}
impl AccessRule {
	/// Creates a rule for `method` on `path`.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into() }
	}

	/// Shorthand for a `GET` rule.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a `POST` rule.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Shorthand for a `PUT` rule.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// Shorthand for a `DELETE` rule.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Every verb on every path.
	pub fn full_access() -> Vec<Self> {
		Method::ALL.into_iter().map(|method| Self::new(method, "/*")).collect()
	}

	/// `GET` on every path.
	pub fn read_only() -> Vec<Self> {
		vec![Self::get("/*")]
	}
}
impl Display for AccessRule {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} {}", self.method, self.path)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn presets_cover_expected_verbs() {
		let full = AccessRule::full_access();

		assert_eq!(full.len(), 4);
		assert!(full.iter().all(|rule| rule.path == "/*"));
		assert_eq!(AccessRule::read_only(), vec![AccessRule::get("/*")]);
	}

	#[test]
	fn serializes_as_method_and_path() {
		let rule = AccessRule::delete("/cloud/project/*/volume/*");

		assert_eq!(
			serde_json::to_string(&rule).expect("Rule should serialize."),
			r#"{"method":"DELETE","path":"/cloud/project/*/volume/*"}"#
		);
		assert_eq!(rule.to_string(), "DELETE /cloud/project/*/volume/*");
	}
}
