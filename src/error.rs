//! Client-level error types shared across signing, transport, and credential calls.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem detected before any I/O.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Provider answered with a non-success status.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider answered with a success status but an unexpected body.
	#[error(transparent)]
	MalformedResponse(#[from] MalformedResponseError),
}
impl Error {
	/// HTTP status attached to the failure, if the provider answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api(e) => Some(e.status),
			Self::MalformedResponse(e) => Some(e.status()),
			Self::Config(_) | Self::Transport(_) => None,
		}
	}

	/// Provider machine-readable error code, when the failure came from the provider.
	pub fn api_code(&self) -> Option<&str> {
		match self {
			Self::Api(e) => e.code.as_deref(),
			_ => None,
		}
	}

	/// Stable lowercase label for the failure class, used as a metric label.
	pub const fn category(&self) -> &'static str {
		match self {
			Self::Config(_) => "config",
			Self::Api(_) => "api",
			Self::Transport(_) => "transport",
			Self::MalformedResponse(_) => "malformed_response",
		}
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Application key is empty.
	#[error("Application key is required.")]
	MissingApplicationKey,
	/// Application secret is empty.
	#[error("Application secret is required.")]
	MissingApplicationSecret,
	/// A required environment variable is absent or blank.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// Literal endpoint URL cannot be parsed.
	#[error("Endpoint `{endpoint}` is not a valid URL.")]
	InvalidEndpoint {
		/// Endpoint string as supplied.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Symbolic endpoint name is not part of the registry.
	#[error("Endpoint `{name}` is not a known region.")]
	UnknownRegion {
		/// Region name as supplied.
		name: String,
	},
	/// Request path cannot be joined onto the base URL.
	#[error("Request path `{path}` does not form a valid URL.")]
	InvalidPath {
		/// Path as supplied.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body cannot be serialized to JSON.
	#[error("Request body cannot be serialized.")]
	BodySerialize(#[from] serde_json::Error),
}

/// Structured failure returned by the provider for a non-success status.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Provider rejected the request with HTTP {status}: {message}.")]
pub struct ApiError {
	/// HTTP status of the response.
	pub status: u16,
	/// Provider machine-readable error code (`errorCode`).
	pub code: Option<String>,
	/// HTTP code echoed by the provider inside the payload (`httpCode`).
	pub http_code: Option<String>,
	/// Human-readable message from the provider, or the raw body when it is not JSON.
	pub message: String,
	/// Provider query identifier (`X-Ovh-QueryID`), useful for support tickets.
	pub query_id: Option<String>,
}
impl ApiError {
	/// Builds an error from a raw response, preferring the provider's JSON payload.
	pub fn from_response(status: u16, body: &[u8], query_id: Option<String>) -> Self {
		#[derive(Deserialize)]
		#[serde(rename_all = "camelCase")]
		struct Payload {
			error_code: Option<String>,
			http_code: Option<String>,
			message: Option<String>,
		}

		match serde_json::from_slice::<Payload>(body) {
			Ok(payload) => Self {
				status,
				code: payload.error_code,
				http_code: payload.http_code,
				message: payload.message.unwrap_or_else(|| format!("HTTP {status}")),
				query_id,
			},
			Err(_) => {
				let text = String::from_utf8_lossy(body).trim().to_owned();

				Self {
					status,
					code: None,
					http_code: None,
					message: if text.is_empty() { format!("HTTP {status}") } else { text },
					query_id,
				}
			},
		}
	}
}

/// Success responses whose body does not match the expected shape.
#[derive(Debug, ThisError)]
pub enum MalformedResponseError {
	/// Body could not be decoded into the requested type.
	#[error("Provider returned a body that does not match the expected shape.")]
	Json {
		/// Structured parsing failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status of the response.
		status: u16,
	},
	/// Server time endpoint did not return an integer.
	#[error("Server time endpoint returned `{body}`, which is not a unix timestamp.")]
	ServerTime {
		/// Trimmed body text.
		body: String,
		/// HTTP status of the response.
		status: u16,
	},
}
impl MalformedResponseError {
	/// HTTP status of the offending response.
	pub fn status(&self) -> u16 {
		match self {
			Self::Json { status, .. } | Self::ServerTime { status, .. } => *status,
		}
	}
}

/// Transport-level failures reported by an [`ApiHttpClient`](crate::http::ApiHttpClient).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn api_error_reads_provider_payload() {
		let body = br#"{"errorCode":"INVALID_CREDENTIAL","httpCode":"401 Unauthorized","message":"Invalid credentials"}"#;
		let err = ApiError::from_response(401, body, Some("EU.ext-1.abc".into()));

		assert_eq!(err.status, 401);
		assert_eq!(err.code.as_deref(), Some("INVALID_CREDENTIAL"));
		assert_eq!(err.http_code.as_deref(), Some("401 Unauthorized"));
		assert_eq!(err.message, "Invalid credentials");
		assert_eq!(err.query_id.as_deref(), Some("EU.ext-1.abc"));
		assert_eq!(
			err.to_string(),
			"Provider rejected the request with HTTP 401: Invalid credentials."
		);
	}

	#[test]
	fn api_error_falls_back_to_raw_body() {
		let err = ApiError::from_response(502, b"Bad Gateway\n", None);

		assert_eq!(err.code, None);
		assert_eq!(err.message, "Bad Gateway");

		let err = ApiError::from_response(503, b"", None);

		assert_eq!(err.message, "HTTP 503");
	}

	#[test]
	fn accessors_expose_status_and_code() {
		let err = Error::from(ApiError::from_response(
			403,
			br#"{"errorCode":"NOT_GRANTED_CALL","message":"This call has not been granted"}"#,
			None,
		));

		assert_eq!(err.status(), Some(403));
		assert_eq!(err.api_code(), Some("NOT_GRANTED_CALL"));

		let err = Error::from(ConfigError::MissingApplicationKey);

		assert_eq!(err.status(), None);
		assert_eq!(err.api_code(), None);
	}

	#[test]
	fn categories_label_each_failure_class() {
		let api = Error::from(ApiError::from_response(500, b"", None));
		let config = Error::from(ConfigError::MissingApplicationSecret);
		let transport = Error::from(TransportError::network(std::io::Error::other("reset")));

		assert_eq!(api.category(), "api");
		assert_eq!(config.category(), "config");
		assert_eq!(transport.category(), "transport");
		assert_eq!(transport.status(), None);
	}

	#[test]
	fn network_errors_keep_the_transport_source() {
		let err = TransportError::network(std::io::Error::other("connection reset"));

		assert_eq!(
			err.source().map(ToString::to_string).as_deref(),
			Some("connection reset")
		);
	}
}
