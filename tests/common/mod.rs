//! Helpers shared by the reqwest-backed integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::MockServer;
// self
use ovh_signer::{
	client::ReqwestSigningClient,
	clock::FixedClock,
	config::ClientConfig,
	endpoint::Endpoint,
	http::{Method, ReqwestHttpClient},
	signature,
};

/// Application key shared by integration tests.
pub const APP_KEY: &str = "test-app-key";
/// Application secret shared by integration tests.
pub const APP_SECRET: &str = "test-app-secret";
/// Local clock value every test client starts at.
pub const NOW: i64 = 1_700_000_000;
/// API version prefix mounted on the mock server.
pub const API_PREFIX: &str = "/1.0";

/// Base URL of the mock API, versioned like the real endpoints.
pub fn base_url(server: &MockServer) -> String {
	server.url(API_PREFIX)
}

/// Absolute URL of `path` on the mock API.
pub fn api_url(server: &MockServer, path: &str) -> String {
	format!("{}{path}", base_url(server))
}

/// Versioned path as seen by the mock server.
pub fn api_path(path: &str) -> String {
	format!("{API_PREFIX}{path}")
}

/// Builds a reqwest transport for talking to `httpmock` servers.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = ovh_signer::reqwest::Client::builder()
		.build()
		.expect("Failed to build Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

/// Constructs a client pointed at `server` with a clock frozen at [`NOW`].
pub fn build_client(
	server: &MockServer,
	consumer_key: Option<&str>,
) -> (ReqwestSigningClient, Arc<FixedClock>) {
	build_client_for(&base_url(server), consumer_key)
}

/// Constructs a client pointed at an arbitrary base URL with a clock frozen at [`NOW`].
pub fn build_client_for(
	base_url: &str,
	consumer_key: Option<&str>,
) -> (ReqwestSigningClient, Arc<FixedClock>) {
	let endpoint = Endpoint::parse(base_url).expect("Mock server URL should parse.");
	let mut config = ClientConfig::new(APP_KEY, APP_SECRET).with_endpoint(endpoint);

	if let Some(consumer_key) = consumer_key {
		config = config.with_consumer_key(consumer_key);
	}

	let clock = Arc::new(FixedClock::at(NOW));
	let client = ReqwestSigningClient::with_http_client(config, test_reqwest_http_client())
		.expect("Test configuration should be valid.")
		.with_clock(clock.clone());

	(client, clock)
}

/// Signature the provider expects for the given call.
pub fn expected_signature(
	consumer_key: &str,
	method: Method,
	url: &str,
	body: &str,
	timestamp: i64,
) -> String {
	signature::sign(APP_SECRET, consumer_key, method, url, body, timestamp)
}
