//! Bound actions: an HTTP target plus the resume token it must be invoked with.

// self
use crate::{
	_prelude::*,
	auth::Secret,
	document::{IdxField, Remediation},
};

const DEFAULT_METHOD: &str = "POST";

/// Callable descriptor bound to one HTTP action and the exchange's resume token.
///
/// Invocation goes through [`IdxClient::proceed`](crate::flows::IdxClient::proceed) or the
/// orchestrator; the payload is assembled by [`IdxAction::payload`].
#[derive(Clone, Debug, PartialEq)]
pub struct IdxAction {
	/// Action name (remediation name or top-level action name).
	pub name: String,
	/// Invocation target.
	pub href: String,
	/// HTTP method.
	pub method: String,
	/// Request media type.
	pub accepts: Option<String>,
	/// Response media type.
	pub produces: Option<String>,
	/// Every field name the action declares.
	pub fields: Vec<String>,
	/// Field names the server marks required.
	pub required: Vec<String>,
	/// Server-provided values the caller may override.
	pub defaults: Map<String, Value>,
	/// Server-provided values sent verbatim.
	pub immutable: Map<String, Value>,
	/// Resume token bound at construction.
	pub state_handle: Option<Secret>,
}
impl IdxAction {
	/// Binds a descriptor to a resume token. Returns `None` when the descriptor has no target.
	pub fn bind(descriptor: &Remediation, state_handle: Option<Secret>) -> Option<Self> {
		let href = descriptor.href.clone()?;
		let mut defaults = Map::new();
		let mut immutable = Map::new();

		for field in &descriptor.value {
			let Some(value) = default_value(field) else { continue };

			if field.mutable == Some(false) {
				immutable.insert(field.name.clone(), value.clone());
			} else {
				defaults.insert(field.name.clone(), value.clone());
			}
		}

		Some(Self {
			name: descriptor.name.clone(),
			href,
			method: descriptor.method.clone().unwrap_or_else(|| DEFAULT_METHOD.into()),
			accepts: descriptor.accepts.clone(),
			produces: descriptor.produces.clone(),
			fields: descriptor.value.iter().map(|f| f.name.clone()).collect(),
			required: descriptor
				.value
				.iter()
				.filter(|f| f.required)
				.map(|f| f.name.clone())
				.collect(),
			defaults,
			immutable,
			state_handle,
		})
	}

	/// Builds the request body.
	///
	/// Layering, later entries winning: server defaults, caller data restricted to declared
	/// fields (all caller data when the action declares none), immutable server values, and
	/// finally the bound `stateHandle`.
	pub fn payload(&self, data: &Map<String, Value>) -> Map<String, Value> {
		let mut body = self.defaults.clone();

		for (name, value) in data {
			if self.fields.is_empty() || self.fields.iter().any(|f| f == name) {
				body.insert(name.clone(), value.clone());
			}
		}
		for (name, value) in &self.immutable {
			body.insert(name.clone(), value.clone());
		}
		if let Some(handle) = &self.state_handle {
			body.insert("stateHandle".into(), Value::String(handle.expose().to_owned()));
		}

		body
	}
}

// Nested field lists describe sub-forms, not values.
fn default_value(field: &IdxField) -> Option<&Value> {
	field.value.as_ref().filter(|v| !v.is_array() && !v.is_null())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn identify() -> Remediation {
		serde_json::from_value(json!({
			"name": "identify",
			"href": "https://acme.okta.com/idp/idx/identify",
			"method": "POST",
			"accepts": "application/json; okta-version=1.0.0",
			"value": [
				{ "name": "identifier", "label": "Username", "required": true },
				{ "name": "rememberMe", "type": "boolean", "value": false },
				{
					"name": "stateHandle",
					"required": true,
					"value": "02stale",
					"visible": false,
					"mutable": false
				}
			]
		}))
		.expect("Remediation fixture should deserialize.")
	}

	#[test]
	fn bind_requires_href() {
		let mut remediation = identify();

		remediation.href = None;

		assert!(IdxAction::bind(&remediation, None).is_none());
	}

	#[test]
	fn payload_layers_defaults_data_and_state_handle() {
		let action = IdxAction::bind(&identify(), Some(Secret::new("02fresh")))
			.expect("Identify should bind.");
		let mut data = Map::new();

		data.insert("identifier".into(), json!("alice@example.com"));
		data.insert("password".into(), json!("not-declared"));

		let body = action.payload(&data);

		assert_eq!(action.required, vec!["identifier".to_owned(), "stateHandle".to_owned()]);
		assert_eq!(
			Value::Object(body),
			json!({
				"identifier": "alice@example.com",
				"rememberMe": false,
				"stateHandle": "02fresh"
			})
		);
	}
}
