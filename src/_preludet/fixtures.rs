//! Realistic exchange documents for an identifier-first password login.
//!
//! Every builder has an `_at` variant taking the org base URL so integration tests can point
//! action targets at a mock server.

// self
use crate::{_prelude::*, document::IdxDocument};

/// Org base URL used when a test does not need live action targets.
pub const BASE: &str = "https://acme.okta.com";
/// Resume token carried by every fixture.
pub const STATE_HANDLE: &str = "02.id.fixture-state-handle";
/// Interaction code returned by [`success_document`].
pub const INTERACTION_CODE: &str = "fixture-interaction-code";
/// Media type announced by fixture actions.
pub const ION_JSON: &str = "application/json; okta-version=1.0.0";
/// Media type produced by fixture actions.
pub const ION_RESPONSE: &str = "application/ion+json; okta-version=1.0.0";

fn state_handle_field() -> Value {
	json!({
		"name": "stateHandle",
		"required": true,
		"value": STATE_HANDLE,
		"visible": false,
		"mutable": false
	})
}

fn cancel(base: &str) -> Value {
	json!({
		"rel": ["create-form"],
		"name": "cancel",
		"href": format!("{base}/idp/idx/cancel"),
		"method": "POST",
		"produces": ION_RESPONSE,
		"value": [state_handle_field()],
		"accepts": ION_JSON
	})
}

fn app() -> Value {
	json!({
		"type": "object",
		"value": { "name": "oidc_client", "label": "Acme Portal", "id": "0oa-app" }
	})
}

fn authenticators() -> Value {
	json!({
		"type": "array",
		"value": [
			{
				"type": "email",
				"key": "okta_email",
				"id": "aut-email",
				"displayName": "Email",
				"methods": [{ "type": "email" }]
			},
			{
				"type": "password",
				"key": "okta_password",
				"id": "aut-pwd",
				"displayName": "Password",
				"methods": [{ "type": "password" }]
			}
		]
	})
}

/// `identify` plus a social `redirect-idp` option.
pub fn identify_document() -> IdxDocument {
	identify_document_at(BASE)
}

/// [`identify_document`] with actions targeting `base`.
pub fn identify_document_at(base: &str) -> IdxDocument {
	IdxDocument(json!({
		"version": "1.0.0",
		"stateHandle": STATE_HANDLE,
		"expiresAt": "2026-10-19T12:00:00.000Z",
		"intent": "LOGIN",
		"remediation": {
			"type": "array",
			"value": [
				{
					"rel": ["create-form"],
					"name": "identify",
					"href": format!("{base}/idp/idx/identify"),
					"method": "POST",
					"produces": ION_RESPONSE,
					"value": [
						{ "name": "identifier", "label": "Username", "required": true },
						{ "name": "rememberMe", "type": "boolean", "label": "Remember this device" },
						state_handle_field()
					],
					"accepts": ION_JSON
				},
				{
					"name": "redirect-idp",
					"type": "GOOGLE",
					"idp": { "id": "0oa-google", "name": "Google IdP" },
					"href": format!("{base}/oauth2/default/v1/authorize?client_id=0oa-app&idp=0oa-google"),
					"method": "GET"
				}
			]
		},
		"cancel": cancel(base),
		"app": app()
	}))
}

/// `select-authenticator-authenticate` offering email and password.
pub fn select_authenticator_document() -> IdxDocument {
	select_authenticator_document_at(BASE)
}

/// [`select_authenticator_document`] with actions targeting `base`.
pub fn select_authenticator_document_at(base: &str) -> IdxDocument {
	IdxDocument(json!({
		"version": "1.0.0",
		"stateHandle": STATE_HANDLE,
		"intent": "LOGIN",
		"remediation": {
			"type": "array",
			"value": [{
				"rel": ["create-form"],
				"name": "select-authenticator-authenticate",
				"href": format!("{base}/idp/idx/challenge"),
				"method": "POST",
				"produces": ION_RESPONSE,
				"value": [
					{
						"name": "authenticator",
						"type": "object",
						"options": [
							{
								"label": "Email",
								"value": { "form": { "value": [
									{ "name": "id", "required": true, "value": "aut-email", "mutable": false },
									{ "name": "methodType", "required": false, "value": "email", "mutable": false }
								] } },
								"relatesTo": "$.authenticators.value[0]"
							},
							{
								"label": "Password",
								"value": { "form": { "value": [
									{ "name": "id", "required": true, "value": "aut-pwd", "mutable": false },
									{ "name": "methodType", "required": false, "value": "password", "mutable": false }
								] } },
								"relatesTo": "$.authenticators.value[1]"
							}
						]
					},
					state_handle_field()
				],
				"accepts": ION_JSON
			}]
		},
		"authenticators": authenticators(),
		"user": { "type": "object", "value": { "id": "00u-alice" } },
		"cancel": cancel(base),
		"app": app()
	}))
}

/// `challenge-authenticator` for the password authenticator.
pub fn challenge_password_document() -> IdxDocument {
	challenge_password_document_at(BASE)
}

/// [`challenge_password_document`] with actions targeting `base`.
pub fn challenge_password_document_at(base: &str) -> IdxDocument {
	IdxDocument(json!({
		"version": "1.0.0",
		"stateHandle": STATE_HANDLE,
		"intent": "LOGIN",
		"remediation": {
			"type": "array",
			"value": [{
				"rel": ["create-form"],
				"name": "challenge-authenticator",
				"relatesTo": ["$.currentAuthenticatorEnrollment"],
				"href": format!("{base}/idp/idx/challenge/answer"),
				"method": "POST",
				"produces": ION_RESPONSE,
				"value": [
					{
						"name": "credentials",
						"type": "object",
						"form": { "value": [
							{ "name": "passcode", "label": "Password", "secret": true }
						] },
						"required": true
					},
					state_handle_field()
				],
				"accepts": ION_JSON
			}]
		},
		"currentAuthenticatorEnrollment": {
			"type": "object",
			"value": {
				"type": "password",
				"key": "okta_password",
				"id": "aut-pwd",
				"displayName": "Password",
				"methods": [{ "type": "password" }],
				"recover": {
					"rel": ["create-form"],
					"name": "recover",
					"href": format!("{base}/idp/idx/recover"),
					"method": "POST",
					"produces": ION_RESPONSE,
					"value": [state_handle_field()],
					"accepts": ION_JSON
				}
			}
		},
		"authenticators": authenticators(),
		"user": { "type": "object", "value": { "id": "00u-alice" } },
		"cancel": cancel(base),
		"app": app()
	}))
}

/// [`challenge_password_document_at`] echoed back with an incorrect-password message, as the
/// server does when it rejects the answer.
pub fn invalid_password_document_at(base: &str) -> IdxDocument {
	let IdxDocument(mut value) = challenge_password_document_at(base);

	value["messages"] = json!({
		"type": "array",
		"value": [{
			"message": "Password is incorrect",
			"i18n": { "key": "incorrectPassword" },
			"class": "ERROR"
		}]
	});

	IdxDocument(value)
}

/// Rejection carrying messages but no remediation, e.g. an expired session.
pub fn expired_session_document() -> IdxDocument {
	IdxDocument(json!({
		"version": "1.0.0",
		"messages": {
			"type": "array",
			"value": [{
				"message": "The session has expired.",
				"i18n": { "key": "idx.session.expired" },
				"class": "ERROR"
			}]
		}
	}))
}

/// Terminal success carrying an interaction code.
pub fn success_document() -> IdxDocument {
	success_document_at(BASE)
}

/// [`success_document`] with the token endpoint under `base`.
pub fn success_document_at(base: &str) -> IdxDocument {
	IdxDocument(json!({
		"version": "1.0.0",
		"stateHandle": STATE_HANDLE,
		"intent": "LOGIN",
		"user": { "type": "object", "value": { "id": "00u-alice" } },
		"successWithInteractionCode": {
			"rel": ["create-form"],
			"name": "issue",
			"href": format!("{base}/oauth2/default/v1/token"),
			"method": "POST",
			"value": [
				{ "name": "grant_type", "required": true, "value": "interaction_code" },
				{ "name": "interaction_code", "required": true, "value": INTERACTION_CODE },
				{ "name": "client_id", "required": true, "value": "0oa-app" },
				{ "name": "code_verifier", "required": true }
			],
			"accepts": "application/x-www-form-urlencoded"
		},
		"app": app()
	}))
}
