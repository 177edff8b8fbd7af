//! Credential steps: `challenge-authenticator`, `enroll-authenticator`, and
//! `reenroll-authenticator`.

// self
use crate::{
	_prelude::*,
	document::{IdxField, Input},
	remediator::{
		FieldRule, RemediationStep, RemediationValues, Remediator, identify::nested_input,
		is_truthy,
	},
};

const CREDENTIALS: &str = "credentials";
const CHALLENGE_FIELDS: &[FieldRule] =
	&[FieldRule::custom(CREDENTIALS, map_passcode, passcode_input)];
const REENROLL_FIELDS: &[FieldRule] =
	&[FieldRule::custom(CREDENTIALS, map_new_password, new_password_input)];

/// How a caller answers the related authenticator.
struct CredentialKind {
	input: &'static str,
	aliases: &'static [&'static str],
}

const PASSWORD: CredentialKind = CredentialKind { input: "password", aliases: &["password"] };
const VERIFICATION_CODE: CredentialKind =
	CredentialKind { input: "verificationCode", aliases: &["verificationCode", "otp"] };

fn credential_kind(remediator: &Remediator) -> &'static CredentialKind {
	match authenticator_type(remediator) {
		Some("password") => &PASSWORD,
		_ => &VERIFICATION_CODE,
	}
}

fn authenticator_type(remediator: &Remediator) -> Option<&str> {
	remediator.authenticator()?.get("type")?.as_str()
}

/// Answers the challenge or enrollment of the related authenticator.
///
/// Passwords come from `password`; every other authenticator reads `verificationCode` or
/// `otp`. A prebuilt `credentials` object is passed through untouched.
#[derive(Debug)]
pub struct EnrollOrChallengeAuthenticator {
	name: &'static str,
}
impl RemediationStep for EnrollOrChallengeAuthenticator {
	fn name(&self) -> &'static str {
		self.name
	}

	fn fields(&self) -> &'static [FieldRule] {
		CHALLENGE_FIELDS
	}

	fn can_remediate(&self, remediator: &Remediator) -> bool {
		remediator.has_data(CREDENTIALS)
	}

	fn values_after_proceed(
		&self,
		_remediator: &Remediator,
		values: RemediationValues,
	) -> RemediationValues {
		values.without([CREDENTIALS])
	}
}

/// Challenge step.
pub static CHALLENGE_AUTHENTICATOR: EnrollOrChallengeAuthenticator =
	EnrollOrChallengeAuthenticator { name: "challenge-authenticator" };
/// Enrollment step.
pub static ENROLL_AUTHENTICATOR: EnrollOrChallengeAuthenticator =
	EnrollOrChallengeAuthenticator { name: "enroll-authenticator" };

fn map_passcode(remediator: &Remediator, _: &IdxField) -> Option<Value> {
	let values = remediator.values();

	if let Some(credentials) = values.get(CREDENTIALS).filter(|v| is_truthy(v)) {
		return Some(credentials.clone());
	}

	credential_kind(remediator)
		.aliases
		.iter()
		.filter_map(|alias| values.get(alias))
		.find(|v| is_truthy(v))
		.map(|passcode| json!({ "passcode": passcode }))
}

fn passcode_input(remediator: &Remediator, field: &IdxField) -> Vec<Input> {
	vec![nested_input(field, credential_kind(remediator).input)]
}

/// Replaces an expired credential, typically a password.
#[derive(Debug)]
pub struct ReEnrollAuthenticator;
impl RemediationStep for ReEnrollAuthenticator {
	fn name(&self) -> &'static str {
		"reenroll-authenticator"
	}

	fn fields(&self) -> &'static [FieldRule] {
		REENROLL_FIELDS
	}
}

/// Shared [`ReEnrollAuthenticator`] instance for registries.
pub static REENROLL_AUTHENTICATOR: ReEnrollAuthenticator = ReEnrollAuthenticator;

fn map_new_password(remediator: &Remediator, _: &IdxField) -> Option<Value> {
	remediator
		.values()
		.get("newPassword")
		.filter(|v| is_truthy(v))
		.map(|password| json!({ "passcode": password }))
}

fn new_password_input(remediator: &Remediator, field: &IdxField) -> Vec<Input> {
	let name = match authenticator_type(remediator) {
		Some("password") => "newPassword",
		_ => "verificationCode",
	};

	vec![nested_input(field, name)]
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::fixtures,
		document::{Remediation, decompose},
		remediator::keys::{AUTHENTICATORS, STATE_HANDLE},
	};

	fn challenge() -> Remediation {
		decompose(&fixtures::challenge_password_document())
			.expect("Challenge fixture should decompose.")
			.remediations
			.remove(0)
	}

	fn email_challenge() -> Remediation {
		Remediation {
			relates_to: Some(json!({
				"type": "object",
				"value": { "type": "email", "key": "okta_email", "id": "aut-email" }
			})),
			..challenge()
		}
	}

	fn seeded() -> RemediationValues {
		RemediationValues::new().with(STATE_HANDLE, fixtures::STATE_HANDLE)
	}

	#[test]
	fn password_challenge_reads_password_alias() {
		let ready = Remediator::new(
			&CHALLENGE_AUTHENTICATOR,
			challenge(),
			&seeded().with("password", "correct horse"),
		);
		let pending = Remediator::new(
			&CHALLENGE_AUTHENTICATOR,
			challenge(),
			&seeded().with("verificationCode", "123456"),
		);

		assert!(ready.can_remediate());
		assert_eq!(ready.data(CREDENTIALS), Some(json!({ "passcode": "correct horse" })));
		assert!(!pending.can_remediate());
		assert_eq!(
			pending.missing_inputs().expect("Missing inputs should build."),
			vec!["password".to_owned()]
		);
	}

	#[test]
	fn code_challenge_accepts_otp_alias() {
		let remediator = Remediator::new(
			&CHALLENGE_AUTHENTICATOR,
			email_challenge(),
			&seeded().with("otp", "654321"),
		);
		let step = remediator.next_step().expect("Next step should build.");

		assert!(remediator.can_remediate());
		assert_eq!(remediator.data(CREDENTIALS), Some(json!({ "passcode": "654321" })));
		assert_eq!(step.kind.as_deref(), Some("email"));
		assert_eq!(step.inputs[0].name, "verificationCode");
	}

	#[test]
	fn proceed_drops_password_and_credentials() {
		let values = seeded()
			.with("password", "correct horse")
			.with(CREDENTIALS, json!({ "passcode": "stale" }))
			.with(AUTHENTICATORS, json!(["okta_email"]));
		let reduced = Remediator::new(&CHALLENGE_AUTHENTICATOR, challenge(), &values)
			.values_after_proceed()
			.expect("Reduction should succeed.");

		assert_eq!(reduced.get("password"), None);
		assert_eq!(reduced.get(CREDENTIALS), None);
		assert_eq!(reduced.authenticators().len(), 1);
	}

	#[test]
	fn reenroll_maps_new_password() {
		let remediation = Remediation { name: "reenroll-authenticator".into(), ..challenge() };
		let pending = Remediator::new(&REENROLL_AUTHENTICATOR, remediation.clone(), &seeded());
		let ready = Remediator::new(
			&REENROLL_AUTHENTICATOR,
			remediation,
			&seeded().with("newPassword", "battery staple"),
		);

		assert!(!pending.can_remediate());
		assert_eq!(
			pending.missing_inputs().expect("Missing inputs should build."),
			vec!["newPassword".to_owned()]
		);
		assert!(ready.can_remediate());
		assert_eq!(ready.data(CREDENTIALS), Some(json!({ "passcode": "battery staple" })));
	}
}
