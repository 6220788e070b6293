//! Signing client: endpoint resolution, clock compensation, credential flow, and signed calls.
//!
//! [`SigningClient`] owns the immutable application identity, a [`CredentialSlot`] holding the
//! optional consumer key, and the measured [`ClockOffset`]. Every public operation performs at
//! most one outbound call, never retries, and leaves deadlines to the transport.
//!
//! Signed calls follow the same recipe:
//!
//! 1. snapshot the consumer key once,
//! 2. join base URL, path, and (for `GET`) query pairs,
//! 3. serialize the body compactly,
//! 4. stamp the provider-adjusted timestamp,
//! 5. sign when a consumer key is present,
//! 6. map non-2xx responses to [`ApiError`] and decode the rest.

// self
use crate::{
	_prelude::*,
	auth::{
		ApplicationSecret, ConsumerKey, Credential, CredentialDetails, CredentialRequest,
		CredentialResponse, CredentialSlot, PendingCredential,
	},
	clock::{self, Clock, ClockOffset, SystemClock},
	config::ClientConfig,
	error::{ApiError, ConfigError, MalformedResponseError, TransportError},
	http::{
		ApiHttpClient, ApiRequest, ApiResponse, CONTENT_TYPE_JSON, HEADER_APPLICATION,
		HEADER_CONSUMER, HEADER_SIGNATURE, HEADER_TIMESTAMP, Method,
	},
	obs::{self, CallKind},
	signature,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Path of the unauthenticated server time endpoint.
pub const PATH_SERVER_TIME: &str = "/auth/time";
/// Path of the credential-request endpoint.
pub const PATH_CREDENTIAL: &str = "/auth/credential";
/// Path describing the credential that signed the call.
pub const PATH_CURRENT_CREDENTIAL: &str = "/auth/currentCredential";
/// Path expiring the credential that signed the call.
pub const PATH_LOGOUT: &str = "/auth/logout";

#[cfg(feature = "reqwest")]
/// Signing client specialized for the crate's default reqwest transport.
pub type ReqwestSigningClient = SigningClient<ReqwestHttpClient>;

/// Request assembled and signed but not yet sent.
#[derive(Clone, Debug)]
pub struct SignedRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute URL, query string included; exactly what was signed.
	pub url: Url,
	/// Compact JSON body; `None` when the call carries no payload.
	pub body: Option<String>,
	/// Provider-adjusted unix timestamp.
	pub timestamp: i64,
	/// `$1$` signature, present only when a consumer key is.
	pub signature: Option<String>,
	/// Application key header value.
	pub application_key: String,
	/// Consumer key header value.
	pub consumer_key: Option<ConsumerKey>,
}
impl SignedRequest {
	/// Converts into the transport request, attaching the identity headers.
	pub fn into_api_request(self) -> ApiRequest {
		let mut headers = vec![
			("Content-Type", CONTENT_TYPE_JSON.to_owned()),
			(HEADER_APPLICATION, self.application_key),
			(HEADER_TIMESTAMP, self.timestamp.to_string()),
		];

		if let Some(consumer_key) = self.consumer_key {
			headers.push((HEADER_CONSUMER, consumer_key.expose().to_owned()));
		}
		if let Some(signature) = self.signature {
			headers.push((HEADER_SIGNATURE, signature));
		}

		ApiRequest { method: self.method, url: self.url, headers, body: self.body }
	}
}

/// Issues signed calls against a single provider endpoint.
///
/// Clones share the credential slot and the clock offset, so a key adopted or a clock
/// synchronized through one clone is visible to all of them.
pub struct SigningClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP transport used for every outbound call.
	pub http_client: Arc<C>,
	base_url: String,
	application_key: String,
	application_secret: ApplicationSecret,
	credential: CredentialSlot,
	offset: Arc<ClockOffset>,
	clock: Arc<dyn Clock>,
}
impl<C> SigningClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	///
	/// Fails with [`ConfigError`] before any I/O when the application key or secret is blank.
	pub fn with_http_client(config: ClientConfig, http_client: impl Into<Arc<C>>) -> Result<Self> {
		config.validate()?;

		let ClientConfig { endpoint, application_key, application_secret, consumer_key } = config;

		Ok(Self {
			http_client: http_client.into(),
			base_url: endpoint.base_url().trim_end_matches('/').to_owned(),
			application_key,
			application_secret,
			credential: CredentialSlot::new(consumer_key),
			offset: Default::default(),
			clock: Arc::new(SystemClock),
		})
	}

	/// Replaces the local clock source.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Base URL every path is joined onto.
	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Application key sent with every call.
	pub fn application_key(&self) -> &str {
		&self.application_key
	}

	/// Shared slot holding the consumer key.
	pub fn credential_slot(&self) -> &CredentialSlot {
		&self.credential
	}

	/// Returns true when a consumer key is set; says nothing about whether it is validated.
	pub fn has_consumer_key(&self) -> bool {
		self.credential.is_set()
	}

	/// Returns a copy of the current consumer key.
	pub fn consumer_key(&self) -> Option<ConsumerKey> {
		self.credential.snapshot()
	}

	/// Replaces the consumer key used for subsequent calls.
	pub fn set_consumer_key(&self, consumer_key: impl Into<ConsumerKey>) {
		self.credential.store(consumer_key.into());
	}

	/// Installs a credential the caller validated and persisted after [`Self::request_credential`].
	pub fn adopt_credential(&self, credential: &Credential) {
		self.credential.store(credential.consumer_key.clone());
	}

	/// Removes the consumer key, returning the client to unauthenticated calls.
	pub fn clear_consumer_key(&self) -> Option<ConsumerKey> {
		self.credential.take()
	}

	/// Seconds the local clock runs ahead of the provider.
	pub fn time_delta(&self) -> i64 {
		self.offset.get()
	}

	/// Provider-adjusted unix timestamp used for the next signed call.
	pub fn timestamp(&self) -> i64 {
		self.offset.provider_time(self.clock.now_unix())
	}

	/// Fetches the provider's unix time with an unauthenticated `GET /auth/time`.
	pub async fn server_time(&self) -> Result<i64> {
		obs::observe(CallKind::TimeSync, "server_time", &self.base_url, self.fetch_server_time())
			.await
	}

	/// Measures and stores the clock offset, returning `local - provider` in seconds.
	///
	/// Each call overwrites the previous measurement.
	pub async fn sync_time(&self) -> Result<i64> {
		obs::observe(CallKind::TimeSync, "sync_time", &self.base_url, async {
			let provider = self.fetch_server_time().await?;
			let local = self.clock.now_unix();

			Ok(self.offset.measure(local, provider))
		})
		.await
	}

	/// Requests a new consumer key for `request.access_rules`.
	///
	/// The call carries only the application key. The returned key is stored immediately but the
	/// provider rejects it until the user approves it at
	/// [`PendingCredential::validation_url`].
	pub async fn request_credential(&self, request: &CredentialRequest) -> Result<PendingCredential> {
		obs::observe(CallKind::CredentialRequest, "request_credential", &self.base_url, async {
			let url = self.url_for(PATH_CREDENTIAL, &[])?;
			let body = serde_json::to_string(request).map_err(ConfigError::from)?;
			let api_request = ApiRequest {
				method: Method::Post,
				url,
				headers: vec![
					("Content-Type", CONTENT_TYPE_JSON.to_owned()),
					(HEADER_APPLICATION, self.application_key.clone()),
				],
				body: Some(body),
			};
			let response = self.dispatch(api_request).await?;
			let payload: CredentialResponse = decode(&response)?;
			let pending = PendingCredential::from_response(payload, request);

			self.credential.store(pending.consumer_key.clone());

			Ok(pending)
		})
		.await
	}

	/// Describes the stored credential with a signed `GET /auth/currentCredential`.
	pub async fn current_credential(&self) -> Result<CredentialDetails> {
		self.get(PATH_CURRENT_CREDENTIAL).await
	}

	/// Expires the stored credential with a signed `POST /auth/logout` and clears it locally.
	///
	/// Only the key that signed the logout is cleared; a key stored while the call was in flight
	/// stays in place.
	pub async fn logout(&self) -> Result<()> {
		let consumer_key = self.credential.snapshot();
		let _: serde_json::Value =
			self.send(Method::Post, PATH_LOGOUT, &[], None, consumer_key.as_ref()).await?;

		if let Some(consumer_key) = consumer_key {
			self.credential.clear_if(&consumer_key);
		}

		Ok(())
	}

	/// Signed `GET`.
	pub async fn get<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.get_with_query(path, &[]).await
	}

	/// Signed `GET` with query pairs appended to the URL before signing.
	pub async fn get_with_query<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let consumer_key = self.credential.snapshot();

		self.send(Method::Get, path, query, None, consumer_key.as_ref()).await
	}

	/// Signed `POST` with a JSON body.
	pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.request(Method::Post, path, Some(body)).await
	}

	/// Signed `PUT` with a JSON body.
	pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.request(Method::Put, path, Some(body)).await
	}

	/// Signed `DELETE`.
	pub async fn delete<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.request::<T, ()>(Method::Delete, path, None).await
	}

	/// Signed call with the stored consumer key.
	///
	/// Empty success bodies decode from JSON `null`, so `()`, `Option<_>`, and
	/// [`serde_json::Value`] resolve to an empty result.
	pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		let consumer_key = self.credential.snapshot();
		let body = serialize_body(body)?;

		self.send(method, path, &[], body, consumer_key.as_ref()).await
	}

	/// Signed call with a caller-owned credential, leaving the stored key untouched.
	pub async fn request_with_credential<T, B>(
		&self,
		credential: &Credential,
		method: Method,
		path: &str,
		body: Option<&B>,
	) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		let body = serialize_body(body)?;

		self.send(method, path, &[], body, Some(&credential.consumer_key)).await
	}

	/// Builds the signed request a call would send, without sending it.
	pub fn prepare(
		&self,
		method: Method,
		path: &str,
		query: &[(&str, &str)],
		body: Option<String>,
		consumer_key: Option<&ConsumerKey>,
	) -> Result<SignedRequest> {
		let query: &[(&str, &str)] = if matches!(method, Method::Get) { query } else { &[] };
		let url = self.url_for(path, query)?;
		let timestamp = self.timestamp();
		let signature = consumer_key.map(|consumer_key| {
			signature::sign(
				self.application_secret.expose(),
				consumer_key.expose(),
				method,
				url.as_str(),
				body.as_deref().unwrap_or_default(),
				timestamp,
			)
		});

		Ok(SignedRequest {
			method,
			url,
			body,
			timestamp,
			signature,
			application_key: self.application_key.clone(),
			consumer_key: consumer_key.cloned(),
		})
	}

	async fn send<T>(
		&self,
		method: Method,
		path: &str,
		query: &[(&str, &str)],
		body: Option<String>,
		consumer_key: Option<&ConsumerKey>,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		obs::observe(CallKind::Signed, method.as_str(), &self.base_url, async {
			let signed = self.prepare(method, path, query, body, consumer_key)?;
			let response = self.dispatch(signed.into_api_request()).await?;

			decode(&response)
		})
		.await
	}

	async fn fetch_server_time(&self) -> Result<i64> {
		let request = ApiRequest {
			method: Method::Get,
			url: self.url_for(PATH_SERVER_TIME, &[])?,
			headers: Vec::new(),
			body: None,
		};
		let response = self.dispatch(request).await?;

		Ok(clock::parse_server_time(response.status, &response.body)?)
	}

	/// Sends `request` and turns non-2xx responses into [`ApiError`].
	async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
		let response = self.http_client.execute(request).await.map_err(TransportError::network)?;

		if !response.is_success() {
			return Err(
				ApiError::from_response(response.status, &response.body, response.query_id).into()
			);
		}

		Ok(response)
	}

	fn url_for(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
		let raw = if path.starts_with('/') {
			format!("{}{path}", self.base_url)
		} else {
			format!("{}/{path}", self.base_url)
		};
		let mut url = Url::parse(&raw)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })?;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query);
		}

		Ok(url)
	}
}
#[cfg(feature = "reqwest")]
impl SigningClient<ReqwestHttpClient> {
	/// Creates a client with its own reqwest transport.
	pub fn new(config: ClientConfig) -> Result<Self> {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}

	/// Creates a client from `OVH_*` environment variables.
	pub fn from_env() -> Result<Self> {
		Self::new(ClientConfig::from_env()?)
	}
}
impl<C> Clone for SigningClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			base_url: self.base_url.clone(),
			application_key: self.application_key.clone(),
			application_secret: self.application_secret.clone(),
			credential: self.credential.clone(),
			offset: self.offset.clone(),
			clock: self.clock.clone(),
		}
	}
}
impl<C> Debug for SigningClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SigningClient")
			.field("base_url", &self.base_url)
			.field("application_key", &self.application_key)
			.field("consumer_key_set", &self.credential.is_set())
			.field("time_delta", &self.offset.get())
			.finish()
	}
}

fn serialize_body<B>(body: Option<&B>) -> Result<Option<String>>
where
	B: ?Sized + Serialize,
{
	body.map(serde_json::to_string).transpose().map_err(|e| ConfigError::from(e).into())
}

fn decode<T>(response: &ApiResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let body: &[u8] = if response.is_empty() { b"null" } else { &response.body };
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| MalformedResponseError::Json { source, status: response.status }.into())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		clock::FixedClock,
		endpoint::{Endpoint, Region},
	};

	struct UnreachableHttpClient;
	impl ApiHttpClient for UnreachableHttpClient {
		type TransportError = std::io::Error;

		fn execute(
			&self,
			_request: ApiRequest,
		) -> crate::http::HttpFuture<'_, Self::TransportError> {
			Box::pin(async { Err(std::io::Error::other("unreachable")) })
		}
	}

	fn client(consumer_key: Option<&str>) -> SigningClient<UnreachableHttpClient> {
		let mut config = ClientConfig::new("app-key", "app-secret");

		if let Some(consumer_key) = consumer_key {
			config = config.with_consumer_key(consumer_key);
		}

		SigningClient::<UnreachableHttpClient>::with_http_client(config, UnreachableHttpClient)
			.expect("Test configuration should be valid.")
			.with_clock(Arc::new(FixedClock::at(1_700_000_000)))
	}

	#[test]
	fn construction_requires_application_identity() {
		let err = SigningClient::<UnreachableHttpClient>::with_http_client(
			ClientConfig::new("", "secret"),
			UnreachableHttpClient,
		)
		.expect_err("Blank application key should fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingApplicationKey)));

		let err = SigningClient::<UnreachableHttpClient>::with_http_client(
			ClientConfig::new("app", ""),
			UnreachableHttpClient,
		)
		.expect_err("Blank application secret should fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingApplicationSecret)));
	}

	#[test]
	fn consumer_key_lifecycle() {
		let client = client(None);

		assert!(!client.has_consumer_key());

		client.set_consumer_key("ck-1");

		assert!(client.has_consumer_key());

		client.adopt_credential(&Credential::new("ck-2"));

		assert_eq!(client.consumer_key().as_ref().map(ConsumerKey::expose), Some("ck-2"));
		assert_eq!(client.clear_consumer_key().as_ref().map(ConsumerKey::expose), Some("ck-2"));
		assert!(!client.has_consumer_key());
	}

	#[test]
	fn clones_share_credential_and_offset() {
		let client = client(None);
		let clone = client.clone();

		client.set_consumer_key("shared");
		client.offset.set(5);

		assert!(clone.has_consumer_key());
		assert_eq!(clone.time_delta(), 5);
	}

	#[test]
	fn unauthenticated_requests_carry_no_signature() {
		let client = client(None);
		let request = client
			.prepare(Method::Get, "/me", &[], None, None)
			.expect("Request should prepare.")
			.into_api_request();

		assert_eq!(request.header(HEADER_APPLICATION), Some("app-key"));
		assert_eq!(request.header(HEADER_TIMESTAMP), Some("1700000000"));
		assert_eq!(request.header(HEADER_CONSUMER), None);
		assert_eq!(request.header(HEADER_SIGNATURE), None);
	}

	#[test]
	fn signed_requests_bind_url_body_and_timestamp() {
		let client = client(Some("ck"));
		let key = client.consumer_key();
		let signed = client
			.prepare(Method::Post, "/cloud/project", &[], Some("{\"a\":1}".into()), key.as_ref())
			.expect("Request should prepare.");

		assert_eq!(signed.url.as_str(), "https://eu.api.ovh.com/1.0/cloud/project");
		assert_eq!(
			signed.signature.as_deref(),
			Some(
				signature::sign(
					"app-secret",
					"ck",
					Method::Post,
					"https://eu.api.ovh.com/1.0/cloud/project",
					"{\"a\":1}",
					1_700_000_000,
				)
				.as_str()
			)
		);

		let request = signed.into_api_request();

		assert_eq!(request.header(HEADER_CONSUMER), Some("ck"));
		assert_eq!(request.body.as_deref(), Some("{\"a\":1}"));
	}

	#[test]
	fn query_pairs_only_apply_to_get() {
		let client = client(Some("ck"));
		let get = client
			.prepare(Method::Get, "/cloud/project", &[("region", "GRA 11")], None, None)
			.expect("GET should prepare.");
		let delete = client
			.prepare(Method::Delete, "/cloud/project", &[("region", "GRA11")], None, None)
			.expect("DELETE should prepare.");

		assert_eq!(get.url.as_str(), "https://eu.api.ovh.com/1.0/cloud/project?region=GRA+11");
		assert_eq!(delete.url.query(), None);
	}

	#[test]
	fn paths_join_without_doubled_slashes() {
		let config = ClientConfig::new("app", "secret")
			.with_endpoint(Endpoint::Custom("http://127.0.0.1:9000/".into()));
		let client = SigningClient::<UnreachableHttpClient>::with_http_client(
			config,
			UnreachableHttpClient,
		)
		.expect("Configuration should be valid.");

		assert_eq!(client.base_url(), "http://127.0.0.1:9000");
		assert_eq!(
			client.url_for("me", &[]).expect("Relative path should join.").as_str(),
			"http://127.0.0.1:9000/me"
		);

		let client = SigningClient::<UnreachableHttpClient>::with_http_client(
			ClientConfig::new("app", "secret").with_endpoint(Region::OvhCa),
			UnreachableHttpClient,
		)
		.expect("Configuration should be valid.");

		assert_eq!(client.base_url(), "https://ca.api.ovh.com/1.0");
	}

	#[tokio::test]
	async fn transport_failures_surface_as_transport_errors() {
		let err = client(Some("ck"))
			.get::<serde_json::Value>("/me")
			.await
			.expect_err("Unreachable transport should fail.");

		assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
	}

	#[test]
	fn empty_bodies_decode_as_null() {
		let response = ApiResponse { status: 204, query_id: None, body: Vec::new() };

		decode::<()>(&response).expect("Unit should decode from an empty body.");

		assert_eq!(
			decode::<serde_json::Value>(&response).expect("Value should decode."),
			serde_json::Value::Null
		);
		assert_eq!(decode::<Option<u32>>(&response).expect("Option should decode."), None);
	}

	#[test]
	fn mismatched_bodies_report_the_json_path() {
		#[derive(Debug, Deserialize)]
		struct Project {
			#[allow(dead_code)]
			name: String,
		}

		let response = ApiResponse { status: 200, query_id: None, body: br#"{"name":7}"#.to_vec() };
		let err = decode::<Project>(&response).expect_err("Wrong field type should fail.");

		match err {
			Error::MalformedResponse(MalformedResponseError::Json { source, status }) => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "name");
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}
}
