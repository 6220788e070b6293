//! Transport primitives for signed provider calls.
//!
//! [`ApiHttpClient`] is the client's only dependency on an HTTP stack. The signing client hands
//! it a fully assembled [`ApiRequest`] (URL, headers, serialized body) and expects an
//! [`ApiResponse`] back for every HTTP status; only network-level failures travel through the
//! error channel. Timeouts and cancellation belong to the implementation.

// self
use crate::_prelude::*;

/// Header carrying the application key.
pub const HEADER_APPLICATION: &str = "X-Ovh-Application";
/// Header carrying the consumer key.
pub const HEADER_CONSUMER: &str = "X-Ovh-Consumer";
/// Header carrying the clock-adjusted unix timestamp.
pub const HEADER_TIMESTAMP: &str = "X-Ovh-Timestamp";
/// Header carrying the request signature.
pub const HEADER_SIGNATURE: &str = "X-Ovh-Signature";
/// Response header carrying the provider query identifier.
pub const HEADER_QUERY_ID: &str = "X-Ovh-QueryID";
/// Content type sent with every provider call.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Boxed future returned by [`ApiHttpClient::execute`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<ApiResponse, E>> + 'a + Send>>;

/// HTTP verbs accepted by the provider API and its access rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Every supported verb.
	pub const ALL: [Method; 4] = [Method::Get, Method::Post, Method::Put, Method::Delete];

	/// Returns the uppercase wire name used in requests and signatures.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => Self::GET,
			Method::Post => Self::POST,
			Method::Put => Self::PUT,
			Method::Delete => Self::DELETE,
		}
	}
}

/// Fully assembled outbound request.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute URL, query string included.
	pub url: Url,
	/// Header name/value pairs in insertion order.
	pub headers: Vec<(&'static str, String)>,
	/// Serialized body; `None` sends no payload.
	pub body: Option<String>,
}
impl ApiRequest {
	/// Looks up a header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Raw provider response handed back by the transport.
#[derive(Clone, Debug, Default)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Value of the `X-Ovh-QueryID` header, if present.
	pub query_id: Option<String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns true for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns true when the body is empty or whitespace only.
	pub fn is_empty(&self) -> bool {
		self.body.iter().all(u8::is_ascii_whitespace)
	}
}

/// Abstraction over HTTP transports capable of executing provider calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by many
/// clients, and the returned future must be `Send` so callers can spawn client futures.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes `request` and resolves with the response for any HTTP status.
	fn execute(&self, request: ApiRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl std::ops::Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: ApiRequest) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let ApiRequest { method, url, headers, body } = request;
			let mut builder = client.request(method.into(), url);

			for (name, value) in headers {
				builder = builder.header(name, value);
			}
			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let query_id = response
				.headers()
				.get(HEADER_QUERY_ID)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, query_id, body })
		})
	}
}
