//! Splits one document into remediations, contextual data, and top-level actions.

// self
use crate::{
	_prelude::*,
	auth::Secret,
	document::{
		IdxAction, IdxContext, IdxDocument, JsonPathResolver, ReferenceResolver, Remediation,
		expand_relates_to,
	},
	error::DocumentError,
};

const SKIP_FIELDS: [&str; 2] = ["remediation", "context"];

/// Output of [`decompose`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decomposed {
	/// Offered steps in document order, references resolved and actions bound.
	pub remediations: Vec<Remediation>,
	/// Non-actionable data.
	pub context: IdxContext,
	/// Top-level actions keyed by name (`<field>-<subfield>` for nested ones).
	pub actions: BTreeMap<String, IdxAction>,
}

/// Decomposes a document with the default [`JsonPathResolver`].
pub fn decompose(document: &IdxDocument) -> Result<Decomposed, DocumentError> {
	decompose_with(document, &JsonPathResolver)
}

/// Decomposes a document, resolving cross-references through `resolver`.
///
/// Pure: the same document always yields the same output.
pub fn decompose_with(
	document: &IdxDocument,
	resolver: &dyn ReferenceResolver,
) -> Result<Decomposed, DocumentError> {
	let root = document.as_value();

	if !root.is_object() {
		return Err(DocumentError::NotAnIdxDocument);
	}

	let state_handle = document.state_handle();
	let remediations = document
		.raw_remediations()
		.iter()
		.enumerate()
		.map(|(index, raw)| {
			let mut raw = raw.clone();

			expand_relates_to(root, &mut raw, resolver);

			let mut remediation: Remediation = serde_path_to_error::deserialize(raw)
				.map_err(|source| DocumentError::MalformedRemediation { index, source })?;

			remediation.action = IdxAction::bind(&remediation, state_handle.clone());

			Ok(remediation)
		})
		.collect::<Result<Vec<_>, DocumentError>>()?;
	let (context, actions) = classify_fields(root, state_handle)?;

	Ok(Decomposed { remediations, context, actions })
}

fn classify_fields(
	root: &Value,
	state_handle: Option<Secret>,
) -> Result<(IdxContext, BTreeMap<String, IdxAction>), DocumentError> {
	let mut context = IdxContext::new();
	let mut actions = BTreeMap::new();
	let Some(fields) = root.as_object() else { return Ok((context, actions)) };

	for (field, value) in fields.iter().filter(|(k, _)| !SKIP_FIELDS.contains(&k.as_str())) {
		let Some(object) = value.as_object() else {
			context.insert(field.clone(), value.clone());

			continue;
		};

		if object.contains_key("rel") {
			let name = object.get("name").and_then(Value::as_str).unwrap_or(field).to_owned();

			match bind_action(field, value, state_handle.clone())? {
				Some(action) => {
					actions.insert(name, action);
				},
				None => {
					context.insert(field.clone(), value.clone());
				},
			}

			continue;
		}

		let mut info = object.clone();
		let field_value = info.remove("value");

		match field_value {
			Some(Value::Object(sub_fields))
				if object.get("type").and_then(Value::as_str) == Some("object") =>
			{
				let mut kept = Map::new();

				for (sub_field, sub_value) in sub_fields {
					let key = format!("{field}-{sub_field}");
					let action = if sub_value.get("rel").is_some() {
						bind_action(&key, &sub_value, state_handle.clone())?
					} else {
						None
					};

					match action {
						Some(action) => {
							actions.insert(key, action);
						},
						None => {
							kept.insert(sub_field, sub_value);
						},
					}
				}

				info.insert("value".into(), Value::Object(kept));
			},
			Some(raw) => {
				info.insert("value".into(), raw);
			},
			None => (),
		}

		context.insert(field.clone(), Value::Object(info));
	}

	Ok((context, actions))
}

fn bind_action(
	field: &str,
	value: &Value,
	state_handle: Option<Secret>,
) -> Result<Option<IdxAction>, DocumentError> {
	let descriptor: Remediation = serde_path_to_error::deserialize(value.clone())
		.map_err(|source| DocumentError::MalformedAction { field: field.to_owned(), source })?;

	Ok(IdxAction::bind(&descriptor, state_handle))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::fixtures;

	#[test]
	fn classification_splits_context_and_actions() {
		let decomposed =
			decompose(&fixtures::identify_document()).expect("Identify fixture should decompose.");

		assert_eq!(
			decomposed.remediations.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
			vec!["identify", "redirect-idp"]
		);
		assert!(decomposed.actions.contains_key("cancel"));
		assert!(decomposed.context.contains_key("version"));
		assert!(decomposed.context.contains_key("app"));
		assert!(!decomposed.context.contains_key("remediation"));
		assert!(!decomposed.context.contains_key("cancel"));
	}

	#[test]
	fn nested_actions_are_keyed_by_field_and_subfield() {
		let decomposed = decompose(&fixtures::challenge_password_document())
			.expect("Challenge fixture should decompose.");
		let enrollment = &decomposed.context["currentAuthenticatorEnrollment"];

		assert!(decomposed.actions.contains_key("currentAuthenticatorEnrollment-recover"));
		assert_eq!(enrollment["type"], json!("object"));
		assert_eq!(enrollment["value"]["key"], json!("okta_password"));
		assert!(enrollment["value"].get("recover").is_none());
	}

	#[test]
	fn remediations_resolve_references_and_bind_actions() {
		let decomposed = decompose(&fixtures::challenge_password_document())
			.expect("Challenge fixture should decompose.");
		let challenge = &decomposed.remediations[0];
		let action = challenge.action.as_ref().expect("Challenge remediation should bind.");

		assert_eq!(
			challenge.authenticator().and_then(|a| a.get("key")),
			Some(&json!("okta_password"))
		);
		assert_eq!(action.state_handle.as_ref().map(|s| s.expose()), Some(fixtures::STATE_HANDLE));
		assert!(action.href.ends_with("/idp/idx/challenge/answer"));
	}

	#[test]
	fn decomposition_is_pure() {
		let document = fixtures::select_authenticator_document();
		let first = decompose(&document).expect("Select fixture should decompose.");
		let second = decompose(&document).expect("Select fixture should decompose.");

		assert_eq!(first, second);
	}

	#[test]
	fn malformed_remediations_report_their_index() {
		let document = IdxDocument(json!({
			"version": "1.0.0",
			"remediation": { "type": "array", "value": [
				{ "name": "identify", "value": [] },
				{ "name": 42 }
			] }
		}));
		let err = decompose(&document).expect_err("Numeric names should be rejected.");

		match err {
			DocumentError::MalformedRemediation { index, source } => {
				assert_eq!(index, 1);
				assert_eq!(source.path().to_string(), "name");
			},
			other => panic!("Unexpected document error: {other:?}."),
		}
	}

	#[test]
	fn non_objects_are_rejected() {
		assert!(matches!(
			decompose(&IdxDocument(json!(["not", "a", "document"]))),
			Err(DocumentError::NotAnIdxDocument)
		));
	}
}
