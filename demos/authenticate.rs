//! Demonstrates an identifier-plus-password sign-in against a mocked org using the default
//! reqwest transport and the in-memory transaction store.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::{Value, json};
use url::Url;
// self
use idx_flow::{
	config::IdxConfig,
	flows::{AuthenticationOptions, IdxClient, IdxStatus, IntrospectOptions},
	http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
	reqwest::Client,
	store::{MemoryStore, TransactionStore},
};

const STATE_HANDLE: &str = "02.demo-state-handle";

fn identify(base: &str) -> Value {
	json!({
		"version": "1.0.0",
		"stateHandle": STATE_HANDLE,
		"remediation": { "type": "array", "value": [{
			"rel": ["create-form"],
			"name": "identify",
			"href": format!("{base}/idp/idx/identify"),
			"method": "POST",
			"accepts": "application/json; okta-version=1.0.0",
			"value": [
				{ "name": "identifier", "label": "Username", "required": true },
				{
					"name": "credentials",
					"type": "object",
					"required": true,
					"form": { "value": [{ "name": "passcode", "label": "Password", "secret": true }] }
				},
				{ "name": "stateHandle", "required": true, "value": STATE_HANDLE, "mutable": false }
			]
		}] }
	})
}

fn success(base: &str) -> Value {
	json!({
		"version": "1.0.0",
		"stateHandle": STATE_HANDLE,
		"successWithInteractionCode": {
			"rel": ["create-form"],
			"name": "issue",
			"href": format!("{base}/oauth2/default/v1/token"),
			"method": "POST",
			"value": [{ "name": "interaction_code", "required": true, "value": "demo-code" }]
		}
	})
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let base = server.base_url();
	let introspect_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/introspect");
			then.status(200).json_body(identify(&base));
		})
		.await;
	let identify_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/identify").json_body(json!({
				"identifier": "demo@example.com",
				"credentials": { "passcode": "demo-password" },
				"stateHandle": STATE_HANDLE
			}));
			then.status(200).json_body(success(&base));
		})
		.await;
	let store = Arc::new(MemoryStore::default());
	let config = IdxConfig::builder(Url::parse(&format!("{base}/oauth2/default"))?).build()?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let client = <IdxClient<ReqwestHttpClient, ReqwestTransportErrorMapper>>::with_http_client(
		store.clone() as Arc<dyn TransactionStore>,
		config,
		http_client,
		Arc::new(ReqwestTransportErrorMapper),
	);
	let options = AuthenticationOptions::new()
		.username("demo@example.com")
		.password("demo-password")
		.introspect(IntrospectOptions::new().interaction_handle("demo-interaction-handle"));
	let transaction = client.authenticate(options).await?;

	introspect_mock.assert_async().await;
	identify_mock.assert_async().await;

	match transaction.status {
		IdxStatus::Success => println!(
			"Signed in; interaction code {:?} ready for the token exchange.",
			transaction.interaction_code
		),
		status => println!("Flow stopped with status {status}: {:?}", transaction.next_step),
	}

	println!("Stored exchange cleared: {}", store.snapshot().is_none());

	Ok(())
}
