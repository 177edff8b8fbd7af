#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use idx_flow::{
	_preludet::*,
	auth::Secret,
	error::ConfigError,
	flows::{AuthenticationOptions, IdxStatus, IntrospectOptions, RunOptions},
	remediator::{IDENTIFY, RemediationFlow, RemediationValues},
	store::TransactionStore,
};

async fn mock_introspect(server: &MockServer) {
	let base = server.base_url();

	server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/introspect");
			then.status(200).json_body(fixtures::identify_document_at(&base).0);
		})
		.await;
}

fn password_login() -> AuthenticationOptions {
	AuthenticationOptions::new()
		.username("alice@example.com")
		.password("correct horse")
		.introspect(IntrospectOptions::new().interaction_handle("ih-123"))
}

#[tokio::test]
async fn password_login_reaches_success_and_clears_store() {
	let server = MockServer::start_async().await;
	let base = server.base_url();
	let (client, store) = build_reqwest_test_client(&base);

	mock_introspect(&server).await;

	let identify = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/identify").json_body(json!({
				"identifier": "alice@example.com",
				"stateHandle": fixtures::STATE_HANDLE
			}));
			then.status(200).json_body(fixtures::select_authenticator_document_at(&base).0);
		})
		.await;
	let select = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/challenge").json_body(json!({
				"authenticator": { "id": "aut-pwd" },
				"stateHandle": fixtures::STATE_HANDLE
			}));
			then.status(200).json_body(fixtures::challenge_password_document_at(&base).0);
		})
		.await;
	let answer = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/challenge/answer").json_body(json!({
				"credentials": { "passcode": "correct horse" },
				"stateHandle": fixtures::STATE_HANDLE
			}));
			then.status(200).json_body(fixtures::success_document_at(&base).0);
		})
		.await;
	let transaction =
		client.authenticate(password_login()).await.expect("Password login should succeed.");

	identify.assert_async().await;
	select.assert_async().await;
	answer.assert_async().await;

	assert_eq!(transaction.status, IdxStatus::Success);
	assert_eq!(
		transaction.interaction_code.as_ref().map(Secret::expose),
		Some(fixtures::INTERACTION_CODE)
	);
	assert!(store.snapshot().is_none(), "Success should clear the stored exchange.");
}

#[tokio::test]
async fn missing_password_stops_on_challenge() {
	let server = MockServer::start_async().await;
	let base = server.base_url();
	let (client, store) = build_reqwest_test_client(&base);

	mock_introspect(&server).await;

	let identify = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/identify");
			then.status(200).json_body(fixtures::challenge_password_document_at(&base).0);
		})
		.await;
	let transaction = client
		.authenticate(AuthenticationOptions::new().username("alice@example.com"))
		.await
		.expect("Pending steps are not errors.");
	let next_step = transaction.next_step.as_ref().expect("A pending step should be described.");

	identify.assert_async().await;

	assert_eq!(transaction.status, IdxStatus::Pending);
	assert_eq!(next_step.name, "challenge-authenticator");
	assert_eq!(next_step.kind.as_deref(), Some("password"));
	assert_eq!(transaction.missing_inputs, vec!["password".to_owned()]);
	assert_eq!(
		store.snapshot(),
		Some(fixtures::challenge_password_document_at(&base)),
		"Pending exchanges stay resumable."
	);
}

#[tokio::test]
async fn rejected_password_surfaces_server_message() {
	let server = MockServer::start_async().await;
	let base = server.base_url();
	let (client, _) = build_reqwest_test_client(&base);

	mock_introspect(&server).await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/identify");
			then.status(200).json_body(fixtures::challenge_password_document_at(&base).0);
		})
		.await;

	let answer = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/challenge/answer");
			then.status(401).json_body(fixtures::invalid_password_document_at(&base).0);
		})
		.await;
	let transaction = client
		.authenticate(
			AuthenticationOptions::new().username("alice@example.com").password("wrong horse"),
		)
		.await
		.expect("Document-shaped rejections are data.");

	answer.assert_calls_async(1).await;

	assert_eq!(transaction.status, IdxStatus::Pending);
	assert!(!transaction.response.request_did_succeed);
	assert_eq!(transaction.missing_inputs, vec!["password".to_owned()]);
	assert!(transaction.messages.iter().any(|m| m.message == "Password is incorrect"));
}

#[tokio::test]
async fn redirect_idp_never_proceeds() {
	let server = MockServer::start_async().await;
	let base = server.base_url();
	let (client, _) = build_reqwest_test_client(&base);

	mock_introspect(&server).await;

	let transaction = client
		.authenticate(AuthenticationOptions::new().step("redirect-idp"))
		.await
		.expect("Redirect steps are pending, not errors.");
	let next_step = transaction.next_step.expect("The redirect should be described.");

	assert_eq!(transaction.status, IdxStatus::Pending);
	assert_eq!(next_step.name, "redirect-idp");
	assert_eq!(next_step.kind.as_deref(), Some("GOOGLE"));
	assert!(next_step.href.as_deref().is_some_and(|href| href.contains("idp=0oa-google")));
	assert!(next_step.inputs.is_empty());
}

#[tokio::test]
async fn expired_session_is_a_failure() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/introspect");
			then.status(403).json_body(fixtures::expired_session_document().0);
		})
		.await;

	let transaction =
		client.authenticate(password_login()).await.expect("Rejections are transactions.");

	assert_eq!(transaction.status, IdxStatus::Failure);
	assert_eq!(transaction.messages[0].message, "The session has expired.");
	assert!(store.snapshot().is_none());
}

#[tokio::test]
async fn unregistered_steps_end_the_run() {
	let server = MockServer::start_async().await;
	let base = server.base_url();
	let (client, _) = build_reqwest_test_client(&base);

	mock_introspect(&server).await;

	let transaction = client
		.run(RunOptions::new(RemediationFlow::new()))
		.await
		.expect("An empty registry is not an error.");

	assert_eq!(transaction.status, IdxStatus::Terminal);
	assert_eq!(transaction.available_steps, vec!["identify", "redirect-idp"]);
}

#[tokio::test]
async fn forced_step_must_be_registered() {
	let server = MockServer::start_async().await;
	let base = server.base_url();
	let (client, _) = build_reqwest_test_client(&base);

	mock_introspect(&server).await;

	let err = client
		.run(RunOptions::new(RemediationFlow::new().register(&IDENTIFY)).step("redirect-idp"))
		.await
		.expect_err("Forcing an unregistered step should fail.");

	assert!(matches!(
		err,
		Error::Config(ConfigError::UnknownRemediation { ref step }) if step == "redirect-idp"
	));
}

#[tokio::test]
async fn cancel_invokes_top_level_action_and_clears_store() {
	let server = MockServer::start_async().await;
	let base = server.base_url();
	let (client, store) = build_reqwest_test_client(&base);

	mock_introspect(&server).await;

	let cancel = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/idp/idx/cancel")
				.json_body(json!({ "stateHandle": fixtures::STATE_HANDLE }));
			then.status(200).json_body(fixtures::expired_session_document().0);
		})
		.await;
	let values = RemediationValues::new();
	let pending = client
		.run(RunOptions::new(RemediationFlow::new().register(&IDENTIFY)).values(values))
		.await
		.expect("Identify without a username should be pending.");

	assert_eq!(pending.status, IdxStatus::Pending);
	assert!(store.snapshot().is_some());

	let canceled = client.cancel(&pending.response).await.expect("Cancel should succeed.");

	cancel.assert_async().await;

	assert_eq!(canceled.status, IdxStatus::Canceled);
	assert!(store.load().await.expect("Loading should succeed.").is_none());
}

#[tokio::test]
async fn proceed_submits_one_step_directly() {
	let server = MockServer::start_async().await;
	let base = server.base_url();
	let (client, store) = build_reqwest_test_client(&base);

	mock_introspect(&server).await;

	let identify = server
		.mock_async(|when, then| {
			when.method(POST).path("/idp/idx/identify").json_body(json!({
				"identifier": "bob@example.com",
				"rememberMe": true,
				"stateHandle": fixtures::STATE_HANDLE
			}));
			then.status(200).json_body(fixtures::select_authenticator_document_at(&base).0);
		})
		.await;
	let response = client
		.introspect(&IntrospectOptions::new())
		.await
		.expect("Introspection should succeed.");
	let data = json!({ "identifier": "bob@example.com", "rememberMe": true, "unknown": 1 });
	let data = data.as_object().cloned().unwrap_or_default();
	let next = client.proceed(&response, "identify", &data).await.expect("Proceed should succeed.");

	identify.assert_async().await;

	assert_eq!(next.remediation_names(), vec!["select-authenticator-authenticate"]);
	assert_eq!(store.snapshot(), Some(next.raw.clone()));
}
