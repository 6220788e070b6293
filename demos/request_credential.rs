//! Walks through the two-phase consumer-key flow against a mock provider: request a key, send
//! the user to the validation URL, then adopt the credential once the caller knows it was
//! approved.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use ovh_signer::{
	auth::{AccessRule, CredentialRequest},
	client::ReqwestSigningClient,
	config::ClientConfig,
	endpoint::Endpoint,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let credential_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/1.0/auth/credential");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"validationUrl": "https://eu.api.ovh.com/auth/?credentialToken=demo",
				"consumerKey": "demo-consumer",
				"state": "pendingValidation"
			}));
		})
		.await;
	let me_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/1.0/me").header("X-Ovh-Consumer", "demo-consumer");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"nichandle":"demo-ovh","firstname":"Demo"}"#);
		})
		.await;
	let config = ClientConfig::new("demo-app", "demo-secret")
		.with_endpoint(Endpoint::parse(&server.url("/1.0"))?);
	let client = ReqwestSigningClient::new(config)?;
	let request = CredentialRequest::new(AccessRule::read_only())
		.with_redirection("https://dashboard.example.com/auth/callback");
	let pending = client.request_credential(&request).await?;

	println!("Send your user to {}.", pending.validation_url);
	println!("Consumer key state: {}.", pending.state);

	// Pretend the user approved the key and the dashboard persisted it.
	let credential = pending.into_credential();

	client.adopt_credential(&credential);

	let me: Value = client.get("/me").await?;

	println!("Signed in as {}.", me["nichandle"]);

	credential_mock.assert_async().await;
	me_mock.assert_async().await;

	Ok(())
}
