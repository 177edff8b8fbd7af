//! `select-authenticator-*`: pick one of the offered authenticators.

// self
use crate::{
	_prelude::*,
	auth::{Authenticator, keys::OKTA_PASSWORD},
	document::{IdxField, IdxOption, Input, InputOption, Remediation},
	remediator::{FieldRule, RemediationStep, RemediationValues, Remediator, is_truthy},
};

const FIELD: &str = "authenticator";
const FIELDS: &[FieldRule] = &[FieldRule::custom(FIELD, map_authenticator, authenticator_input)];

/// Selects an authenticator from the candidates the caller supplied.
///
/// A candidate picks an option when its id or key matches the option's related authenticator,
/// or when its key equals that authenticator's type. Once proceeded, the selected authenticator
/// leaves the candidate list so the same choice is not replayed.
#[derive(Debug)]
pub struct SelectAuthenticator {
	name: &'static str,
	preselect_password: bool,
}
impl RemediationStep for SelectAuthenticator {
	fn name(&self) -> &'static str {
		self.name
	}

	fn fields(&self) -> &'static [FieldRule] {
		FIELDS
	}

	fn prepare(&self, remediation: &Remediation, values: RemediationValues) -> RemediationValues {
		let wants_password = self.preselect_password
			&& values.get("password").is_some_and(is_truthy)
			&& offered_options(remediation).iter().any(|o| related_key(o) == Some(OKTA_PASSWORD));

		if !wants_password
			|| values.authenticators().iter().any(|a| a.key.as_deref() == Some(OKTA_PASSWORD))
		{
			return values;
		}

		let mut authenticators = values.authenticators().to_vec();

		authenticators.push(Authenticator::from_key(OKTA_PASSWORD));

		values.with_authenticators(authenticators)
	}

	fn can_remediate(&self, remediator: &Remediator) -> bool {
		let values = remediator.values();

		if values.authenticators().is_empty() {
			return false;
		}
		if values.authenticator().is_some_and(|a| a.id.is_some()) {
			return true;
		}

		matched_option(remediator).is_some()
	}

	fn values_after_proceed(
		&self,
		remediator: &Remediator,
		values: RemediationValues,
	) -> RemediationValues {
		let Some(selected) = selected_authenticator(remediator) else { return values };
		let remaining = values
			.authenticators()
			.iter()
			.filter(|candidate| !candidate.selects(&selected))
			.cloned()
			.collect::<Vec<_>>();

		values.with_authenticators(remaining)
	}
}

/// Authentication-time selection; a supplied password pre-selects the password authenticator.
pub static SELECT_AUTHENTICATOR_AUTHENTICATE: SelectAuthenticator =
	SelectAuthenticator { name: "select-authenticator-authenticate", preselect_password: true };
/// Enrollment-time selection.
pub static SELECT_AUTHENTICATOR_ENROLL: SelectAuthenticator =
	SelectAuthenticator { name: "select-authenticator-enroll", preselect_password: false };

fn offered_options(remediation: &Remediation) -> &[IdxOption] {
	remediation.field(FIELD).map(|f| f.options.as_slice()).unwrap_or_default()
}

fn related_key(option: &IdxOption) -> Option<&str> {
	option.relates_to.as_ref()?.get("key")?.as_str()
}

/// First candidate, in preference order, that picks an offered option.
fn matched_option(remediator: &Remediator) -> Option<(&Authenticator, &IdxOption)> {
	let options = offered_options(remediator.remediation());

	remediator.values().authenticators().iter().find_map(|candidate| {
		options
			.iter()
			.find(|o| o.relates_to.as_ref().is_some_and(|related| candidate.selects(related)))
			.map(|o| (candidate, o))
	})
}

fn selected_authenticator(remediator: &Remediator) -> Option<Value> {
	if let Some(authenticator) = remediator.values().authenticator().filter(|a| a.id.is_some()) {
		return Some(authenticator.to_value());
	}

	matched_option(remediator).and_then(|(_, option)| option.relates_to.clone())
}

fn map_authenticator(remediator: &Remediator, _: &IdxField) -> Option<Value> {
	if let Some(authenticator) = remediator.values().authenticator().filter(|a| a.id.is_some()) {
		return Some(authenticator.to_value());
	}

	let (candidate, option) = matched_option(remediator)?;
	let mut selection = Map::new();

	selection.insert("id".into(), option.form_value("id")?.clone());

	if let Some(method_type) = candidate.method_type() {
		selection.insert("methodType".into(), Value::String(method_type.to_owned()));
	}

	Some(Value::Object(selection))
}

fn authenticator_input(_: &Remediator, field: &IdxField) -> Vec<Input> {
	let options = field
		.options
		.iter()
		.map(|o| InputOption {
			label: o.label.clone(),
			value: related_key(o).map(|k| Value::String(k.to_owned())).unwrap_or_default(),
		})
		.collect();

	vec![Input {
		name: FIELD.into(),
		kind: Some("string".into()),
		required: field.required,
		options,
		..Default::default()
	}]
}
