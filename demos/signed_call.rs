//! Synchronizes the clock with a mock provider, then issues signed CRUD calls and inspects the
//! typed error returned for a rejected one.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use ovh_signer::{
	client::ReqwestSigningClient, config::ClientConfig, endpoint::Endpoint, error::Error,
	http::Method,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let time_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/1.0/auth/time");
			then.status(200).body("1700000000");
		})
		.await;
	let create_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/1.0/cloud/project/demo/sshkey");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id":"key-1","name":"laptop"}"#);
		})
		.await;
	let delete_mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/1.0/cloud/project/demo/sshkey/key-404");
			then.status(404).header("content-type", "application/json").body(
				r#"{"errorCode":"RESOURCE_NOT_FOUND","httpCode":"404 Not Found","message":"The requested object (key-404) does not exist"}"#,
			);
		})
		.await;
	let config = ClientConfig::new("demo-app", "demo-secret")
		.with_endpoint(Endpoint::parse(&server.url("/1.0"))?)
		.with_consumer_key("demo-consumer");
	let client = ReqwestSigningClient::new(config)?;
	let delta = client.sync_time().await?;

	println!("Local clock is {delta}s ahead of the provider.");

	let body = json!({ "name": "laptop", "publicKey": "ssh-ed25519 AAAA demo@laptop" });
	let signed = client.prepare(
		Method::Post,
		"/cloud/project/demo/sshkey",
		&[],
		Some(serde_json::to_string(&body)?),
		client.consumer_key().as_ref(),
	)?;

	println!("Signature for the upcoming call: {:?}.", signed.signature);

	let created: Value = client.post("/cloud/project/demo/sshkey", &body).await?;

	println!("Created SSH key {}.", created["id"]);

	match client.delete::<()>("/cloud/project/demo/sshkey/key-404").await {
		Err(Error::Api(api)) => println!("Provider refused ({}): {}.", api.status, api.message),
		other => println!("Unexpected outcome: {other:?}."),
	}

	time_mock.assert_async().await;
	create_mock.assert_async().await;
	delete_mock.assert_async().await;

	Ok(())
}
