//! `identify`: username, optional password, remember-me.

// self
use crate::{
	_prelude::*,
	document::{IdxField, Input},
	remediator::{FieldRule, RemediationStep, Remediator, is_truthy},
};

const FIELDS: &[FieldRule] = &[
	FieldRule::aliased("identifier", &["username"]),
	FieldRule::custom("credentials", map_credentials, credentials_input),
	FieldRule::aliased("rememberMe", &["rememberMe"]),
];

/// Identifies the user, optionally with a password in the same request.
#[derive(Debug)]
pub struct Identify;
impl RemediationStep for Identify {
	fn name(&self) -> &'static str {
		"identify"
	}

	fn fields(&self) -> &'static [FieldRule] {
		FIELDS
	}
}

/// Shared [`Identify`] instance for registries.
pub static IDENTIFY: Identify = Identify;

fn map_credentials(remediator: &Remediator, _: &IdxField) -> Option<Value> {
	let values = remediator.values();

	if let Some(credentials) = values.get("credentials").filter(|v| is_truthy(v)) {
		return Some(credentials.clone());
	}

	values.get("password").filter(|v| is_truthy(v)).map(|password| json!({ "passcode": password }))
}

fn credentials_input(_: &Remediator, field: &IdxField) -> Vec<Input> {
	vec![nested_input(field, "password")]
}

/// Input built from the first field of a composite field's form, renamed to `name`.
pub(crate) fn nested_input(field: &IdxField, name: &str) -> Input {
	let mut input = match field.form.as_ref().and_then(|f| f.value.first()) {
		Some(nested) => Input::from_field(nested, name),
		None => Input { name: name.to_owned(), secret: true, ..Default::default() },
	};

	input.kind.get_or_insert_with(|| "string".into());
	input.required = field.required;

	input
}
