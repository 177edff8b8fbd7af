//! Exchange documents and the typed descriptors read out of them.
//!
//! A server response is kept as an [`IdxDocument`], a thin wrapper over the raw JSON tree.
//! [`decompose`] splits it into [`Remediation`] descriptors, contextual data, and bound
//! [`IdxAction`]s. Cross-references (`relatesTo`) are resolved against the root document
//! through a [`ReferenceResolver`] before any remediation is interpreted.

pub mod action;
pub mod decompose;
pub mod relates_to;

pub use action::*;
pub use decompose::*;
pub use relates_to::*;

// self
use crate::{_prelude::*, auth::Secret};

/// Non-actionable contextual data lifted out of a document.
pub type IdxContext = Map<String, Value>;

/// One raw server response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdxDocument(pub Value);
impl IdxDocument {
	/// Parses a response body.
	pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
		serde_json::from_slice(body).map(Self)
	}

	/// Returns `true` when `value` looks like an exchange document: an object carrying a
	/// non-empty string `version`.
	pub fn is_idx_document(value: &Value) -> bool {
		value.get("version").and_then(Value::as_str).is_some_and(|v| !v.is_empty())
	}

	/// Returns the raw JSON tree.
	pub fn as_value(&self) -> &Value {
		&self.0
	}

	/// Protocol version the server answered with.
	pub fn version(&self) -> Option<&str> {
		self.0.get("version").and_then(Value::as_str)
	}

	/// Resume token the server expects on the next request.
	pub fn state_handle(&self) -> Option<Secret> {
		self.0.get("stateHandle").and_then(Value::as_str).map(Secret::new)
	}

	/// Top-level messages, usually describing why the last request was rejected.
	pub fn messages(&self) -> Vec<IdxMessage> {
		self.0
			.get("messages")
			.and_then(|m| m.get("value"))
			.and_then(|v| serde_json::from_value(v.clone()).ok())
			.unwrap_or_default()
	}

	/// Returns `true` once the exchange produced an interaction code.
	pub fn is_success(&self) -> bool {
		self.0.get("successWithInteractionCode").is_some()
	}

	/// Interaction code carried by a successful exchange.
	pub fn interaction_code(&self) -> Option<Secret> {
		self.0
			.get("successWithInteractionCode")?
			.get("value")?
			.as_array()?
			.iter()
			.find(|field| field.get("name").and_then(Value::as_str) == Some("interaction_code"))?
			.get("value")?
			.as_str()
			.map(Secret::new)
	}

	/// Raw remediation entries, before any resolution.
	pub fn raw_remediations(&self) -> &[Value] {
		self.0
			.get("remediation")
			.and_then(|r| r.get("value"))
			.and_then(Value::as_array)
			.map(Vec::as_slice)
			.unwrap_or_default()
	}
}
impl From<Value> for IdxDocument {
	fn from(value: Value) -> Self {
		Self(value)
	}
}

/// One named step offered by the server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remediation {
	/// Step name, unique within one document.
	pub name: String,
	/// Ordered input slots.
	#[serde(default)]
	pub value: Vec<IdxField>,
	/// Resolved cross-reference (usually an authenticator).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub relates_to: Option<Value>,
	/// Invocation target.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub href: Option<String>,
	/// HTTP method, `POST` when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub method: Option<String>,
	/// Request media type.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub accepts: Option<String>,
	/// Response media type.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub produces: Option<String>,
	/// Relation markers such as `create-form`.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub rel: Vec<String>,
	/// Identity provider descriptor for redirect steps.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub idp: Option<Value>,
	/// Provider type for redirect steps.
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Bound action, attached during decomposition.
	#[serde(skip)]
	pub action: Option<IdxAction>,
}
impl Remediation {
	/// Looks up a field descriptor by name.
	pub fn field(&self, name: &str) -> Option<&IdxField> {
		self.value.iter().find(|f| f.name == name)
	}

	/// Resolved authenticator attached through `relatesTo`.
	///
	/// Authenticator references resolve to `{type: "object", value: {...}}` wrappers; the
	/// inner value is returned when present.
	pub fn authenticator(&self) -> Option<&Value> {
		let related = self.relates_to.as_ref().filter(|v| v.is_object())?;

		match related.get("value") {
			Some(inner) if inner.is_object() => Some(inner),
			_ => Some(related),
		}
	}

	/// Messages attached to the fields of the first value's form.
	pub fn messages(&self) -> Vec<IdxMessage> {
		let Some(form) = self.value.first().and_then(|f| f.form.as_ref()) else {
			return Vec::new();
		};

		form.value
			.iter()
			.filter_map(|f| f.messages.as_ref())
			.flat_map(|m| m.value.iter().cloned())
			.collect()
	}
}

/// One input slot within a remediation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdxField {
	/// Field name.
	pub name: String,
	/// Declared type (`string`, `boolean`, `object`, ...).
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Display label.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// Whether the server requires the field.
	#[serde(default)]
	pub required: bool,
	/// Whether the field carries secret material.
	#[serde(default)]
	pub secret: bool,
	/// Server-provided value or nested field list.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	/// Visibility hint.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub visible: Option<bool>,
	/// `false` when the server-provided value must be sent as-is.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mutable: Option<bool>,
	/// Nested form for composite fields.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub form: Option<IdxForm>,
	/// Selectable options.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub options: Vec<IdxOption>,
	/// Validation or info messages.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub messages: Option<IdxMessages>,
	/// Resolved cross-reference.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub relates_to: Option<Value>,
}
impl IdxField {
	/// Returns `true` for composite (`object`) fields.
	pub fn is_composite(&self) -> bool {
		self.kind.as_deref() == Some("object")
	}
}

/// Nested form of a composite field or option.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdxForm {
	/// Nested fields.
	#[serde(default)]
	pub value: Vec<IdxField>,
}

/// One selectable option.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdxOption {
	/// Display label.
	#[serde(default)]
	pub label: String,
	/// Literal value or `{form: {value: [...]}}`.
	#[serde(default)]
	pub value: Value,
	/// Resolved cross-reference, usually the offered authenticator.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub relates_to: Option<Value>,
}
impl IdxOption {
	/// Returns the server value of a nested form field, e.g. the option's authenticator `id`.
	pub fn form_value(&self, name: &str) -> Option<&Value> {
		self.value
			.get("form")?
			.get("value")?
			.as_array()?
			.iter()
			.find(|f| f.get("name").and_then(Value::as_str) == Some(name))?
			.get("value")
	}
}

/// Message collection wrapper.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdxMessages {
	/// Messages in server order.
	#[serde(default)]
	pub value: Vec<IdxMessage>,
}

/// One server message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdxMessage {
	/// Human-readable text.
	#[serde(default)]
	pub message: String,
	/// Severity such as `ERROR` or `INFO`.
	#[serde(default)]
	pub class: String,
	/// Localization key and parameters.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub i18n: Option<Value>,
}

/// Caller-facing description of one value a step needs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Input {
	/// Externally visible name, i.e. the value-bag key the caller should fill.
	pub name: String,
	/// Declared type.
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Display label.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// Whether the value is required.
	#[serde(default)]
	pub required: bool,
	/// Whether the value is secret.
	#[serde(default)]
	pub secret: bool,
	/// Choices, for selection inputs.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub options: Vec<InputOption>,
}
impl Input {
	/// Copies a field descriptor's payload under another name.
	pub fn from_field(field: &IdxField, name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind: field.kind.clone(),
			label: field.label.clone(),
			required: field.required,
			secret: field.secret,
			options: Vec::new(),
		}
	}
}

/// One choice of a selection input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputOption {
	/// Display label.
	pub label: String,
	/// Value to put in the bag to pick this choice.
	pub value: Value,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn well_formed_documents_require_version() {
		assert!(IdxDocument::is_idx_document(&json!({ "version": "1.0.0" })));
		assert!(!IdxDocument::is_idx_document(&json!({ "version": "" })));
		assert!(!IdxDocument::is_idx_document(&json!({ "error": "invalid_request" })));
		assert!(!IdxDocument::is_idx_document(&json!("1.0.0")));
	}

	#[test]
	fn interaction_code_is_read_from_success_block() {
		let doc = IdxDocument(json!({
			"version": "1.0.0",
			"successWithInteractionCode": {
				"name": "issue",
				"value": [
					{ "name": "grant_type", "value": "interaction_code" },
					{ "name": "interaction_code", "value": "code-123" }
				]
			}
		}));

		assert!(doc.is_success());
		assert_eq!(doc.interaction_code().map(|c| c.expose().to_owned()), Some("code-123".into()));
	}

	#[test]
	fn remediation_messages_come_from_first_form() {
		let remediation: Remediation = serde_json::from_value(json!({
			"name": "challenge-authenticator",
			"value": [{
				"name": "credentials",
				"type": "object",
				"required": true,
				"form": { "value": [{
					"name": "passcode",
					"secret": true,
					"messages": { "value": [
						{ "message": "Password is incorrect", "class": "ERROR" }
					] }
				}] }
			}]
		}))
		.expect("Remediation fixture should deserialize.");
		let messages = remediation.messages();

		assert_eq!(messages.len(), 1);
		assert_eq!(messages[0].message, "Password is incorrect");
		assert_eq!(messages[0].class, "ERROR");
	}

	#[test]
	fn authenticator_unwraps_object_wrapper() {
		let remediation = Remediation {
			name: "challenge-authenticator".into(),
			relates_to: Some(json!({
				"type": "object",
				"value": { "key": "okta_password", "id": "aut-pwd" }
			})),
			..Default::default()
		};

		assert_eq!(
			remediation.authenticator(),
			Some(&json!({ "key": "okta_password", "id": "aut-pwd" }))
		);
	}

	#[test]
	fn option_form_value_finds_nested_field() {
		let option: IdxOption = serde_json::from_value(json!({
			"label": "Email",
			"value": { "form": { "value": [
				{ "name": "id", "value": "aut-email", "mutable": false },
				{ "name": "methodType", "value": "email" }
			] } }
		}))
		.expect("Option fixture should deserialize.");

		assert_eq!(option.form_value("id"), Some(&json!("aut-email")));
		assert_eq!(option.form_value("missing"), None);
	}
}
