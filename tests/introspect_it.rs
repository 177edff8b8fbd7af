#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use idx_flow::{
	_preludet::*,
	error::{ConfigError, TransportError},
	flows::IntrospectOptions,
	store::TransactionStore,
};

const ION: &str = "application/ion+json; okta-version=1.0.0";

#[tokio::test]
async fn introspect_posts_interaction_handle_with_versioned_media_type() {
	let server = MockServer::start_async().await;
	let base = server.base_url();
	let (client, store) = build_reqwest_test_client(&base);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/idp/idx/introspect")
				.header("content-type", ION)
				.header("accept", ION)
				.json_body(json!({ "interactionHandle": "ih-123" }));
			then.status(200)
				.header("content-type", ION)
				.json_body(fixtures::identify_document_at(&base).0);
		})
		.await;
	let response = client
		.introspect(&IntrospectOptions::new().interaction_handle("ih-123"))
		.await
		.expect("Introspection should succeed.");

	mock.assert_async().await;

	assert!(response.request_did_succeed);
	assert_eq!(response.remediation_names(), vec!["identify", "redirect-idp"]);
	assert!(response.action("cancel").is_some());
	assert!(store.snapshot().is_none(), "Introspection alone should not persist the document.");
}

#[tokio::test]
async fn stored_document_short_circuits_the_network() {
	let server = MockServer::start_async().await;
	let base = server.base_url();
	let (client, store) = build_reqwest_test_client(&base);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/introspect");
			then.status(500);
		})
		.await;

	store
		.save(fixtures::challenge_password_document_at(&base))
		.await
		.expect("Seeding the store should succeed.");

	let response = client
		.introspect(&IntrospectOptions::new().state_handle(fixtures::STATE_HANDLE))
		.await
		.expect("Stored document should be decomposed.");

	mock.assert_calls_async(0).await;

	assert_eq!(response.remediation_names(), vec!["challenge-authenticator"]);
}

#[tokio::test]
async fn state_handle_is_sent_as_state_token() {
	let server = MockServer::start_async().await;
	let base = server.base_url();
	let (client, _) = build_reqwest_test_client(&base);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/idp/idx/introspect")
				.json_body(json!({ "stateToken": fixtures::STATE_HANDLE }));
			then.status(200).json_body(fixtures::select_authenticator_document_at(&base).0);
		})
		.await;
	let response = client
		.introspect(
			&IntrospectOptions::new()
				.interaction_handle("ignored")
				.state_handle(fixtures::STATE_HANDLE),
		)
		.await
		.expect("Introspection should succeed.");

	mock.assert_async().await;

	assert_eq!(response.remediation_names(), vec!["select-authenticator-authenticate"]);
}

#[tokio::test]
async fn document_shaped_rejection_is_returned_as_data() {
	let server = MockServer::start_async().await;
	let (client, _) = build_reqwest_test_client(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/introspect");
			then.status(401).json_body(fixtures::expired_session_document().0);
		})
		.await;
	let response = client
		.introspect(&IntrospectOptions::new())
		.await
		.expect("Document-shaped rejections should not be errors.");

	mock.assert_async().await;

	assert!(!response.request_did_succeed);
	assert!(response.remediations.is_empty());
	assert_eq!(response.messages()[0].message, "The session has expired.");
}

#[tokio::test]
async fn plain_error_body_is_a_transport_error() {
	let server = MockServer::start_async().await;
	let (client, _) = build_reqwest_test_client(&server.base_url());
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/introspect");
			then.status(503).body("upstream unavailable");
		})
		.await;
	let err = client
		.introspect(&IntrospectOptions::new())
		.await
		.expect_err("Plain error bodies should fail.");

	assert!(matches!(
		err,
		Error::Transport(TransportError::HttpStatus { status: 503, ref body })
			if body == "upstream unavailable"
	));
}

#[tokio::test]
async fn invalid_version_fails_before_any_request() {
	let server = MockServer::start_async().await;
	let (client, _) = build_reqwest_test_client(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/introspect");
			then.status(200);
		})
		.await;
	let err = client
		.introspect(&IntrospectOptions::new().version("1.0.0; evil"))
		.await
		.expect_err("Malformed versions should be rejected.");

	mock.assert_calls_async(0).await;

	assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
}
