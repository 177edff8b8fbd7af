//! Caller-supplied candidate values threaded through a flow.

// self
use crate::{_prelude::*, auth::Authenticator};

/// Keys stored outside the generic entry map.
pub mod keys {
	/// Candidate authenticator list.
	pub const AUTHENTICATORS: &str = "authenticators";
	/// Singular authenticator candidate.
	pub const AUTHENTICATOR: &str = "authenticator";
	/// Authenticators carrying metadata beyond their identity.
	pub const AUTHENTICATORS_DATA: &str = "authenticatorsData";
	/// Resume token seeded from the current document.
	pub const STATE_HANDLE: &str = "stateHandle";
}

/// Immutable value bag.
///
/// Every transformation returns a fresh bag; a bag handed to a remediator is never changed
/// behind the caller's back.
#[derive(Clone, Default, PartialEq)]
pub struct RemediationValues {
	entries: BTreeMap<String, Value>,
	authenticators: Vec<Authenticator>,
	authenticator: Option<Authenticator>,
	authenticators_data: Vec<Authenticator>,
}
impl RemediationValues {
	/// Creates an empty bag.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a bag with `key` set to `value`.
	///
	/// The authenticator keys are routed to their typed slots; unparsable authenticator values
	/// are ignored.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		let key = key.into();
		let value = value.into();

		match key.as_str() {
			keys::AUTHENTICATOR => self.authenticator = Authenticator::from_value(&value),
			keys::AUTHENTICATORS => {
				self.authenticators = value
					.as_array()
					.map(|items| items.iter().filter_map(Authenticator::from_value).collect())
					.unwrap_or_default();
			},
			keys::AUTHENTICATORS_DATA => {
				self.authenticators_data = value
					.as_array()
					.map(|items| items.iter().filter_map(Authenticator::from_value).collect())
					.unwrap_or_default();
			},
			_ => {
				self.entries.insert(key, value);
			},
		}

		self
	}

	/// Returns a bag with the singular authenticator candidate set.
	pub fn with_authenticator(mut self, authenticator: impl Into<Authenticator>) -> Self {
		self.authenticator = Some(authenticator.into());

		self
	}

	/// Returns a bag with the candidate authenticator list replaced.
	pub fn with_authenticators<I, A>(mut self, authenticators: I) -> Self
	where
		I: IntoIterator<Item = A>,
		A: Into<Authenticator>,
	{
		self.authenticators = authenticators.into_iter().map(Into::into).collect();

		self
	}

	/// Returns a bag with the metadata side channel replaced.
	pub fn with_authenticators_data(mut self, data: Vec<Authenticator>) -> Self {
		self.authenticators_data = data;

		self
	}

	/// Returns a bag without the given keys.
	pub fn without<'a, I>(&self, names: I) -> Self
	where
		I: IntoIterator<Item = &'a str>,
	{
		let mut next = self.clone();

		for key in names {
			match key {
				keys::AUTHENTICATOR => next.authenticator = None,
				keys::AUTHENTICATORS => next.authenticators.clear(),
				keys::AUTHENTICATORS_DATA => next.authenticators_data.clear(),
				_ => {
					next.entries.remove(key);
				},
			}
		}

		next
	}

	/// Returns a generic entry.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.entries.get(key)
	}

	/// Returns the value stored under `key`, rendering the authenticator slots as JSON.
	pub fn lookup(&self, key: &str) -> Option<Value> {
		match key {
			keys::AUTHENTICATOR => self.authenticator.as_ref().map(Authenticator::to_value),
			keys::AUTHENTICATORS if !self.authenticators.is_empty() =>
				Some(render(&self.authenticators)),
			keys::AUTHENTICATORS_DATA if !self.authenticators_data.is_empty() =>
				Some(render(&self.authenticators_data)),
			keys::AUTHENTICATORS | keys::AUTHENTICATORS_DATA => None,
			_ => self.entries.get(key).cloned(),
		}
	}

	/// Returns `true` when `key` was supplied, regardless of its value.
	pub fn contains_key(&self, key: &str) -> bool {
		match key {
			keys::AUTHENTICATOR => self.authenticator.is_some(),
			keys::AUTHENTICATORS => !self.authenticators.is_empty(),
			keys::AUTHENTICATORS_DATA => !self.authenticators_data.is_empty(),
			_ => self.entries.contains_key(key),
		}
	}

	/// Candidate authenticators in preference order.
	pub fn authenticators(&self) -> &[Authenticator] {
		&self.authenticators
	}

	/// Singular authenticator candidate.
	pub fn authenticator(&self) -> Option<&Authenticator> {
		self.authenticator.as_ref()
	}

	/// Authenticators carrying metadata beyond their identity.
	pub fn authenticators_data(&self) -> &[Authenticator] {
		&self.authenticators_data
	}

	/// Generic entry names, sorted.
	pub fn entry_keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}
}
// Values may hold passwords and passcodes; only keys are printed.
impl Debug for RemediationValues {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RemediationValues")
			.field("entries", &self.entries.keys().collect::<Vec<_>>())
			.field("authenticators", &self.authenticators.len())
			.field("authenticator", &self.authenticator.is_some())
			.field("authenticators_data", &self.authenticators_data.len())
			.finish()
	}
}

fn render(authenticators: &[Authenticator]) -> Value {
	Value::Array(authenticators.iter().map(Authenticator::to_value).collect())
}

/// JavaScript-style truthiness used by readiness checks.
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn without_returns_fresh_bag() {
		let values = RemediationValues::new()
			.with("username", "alice@example.com")
			.with("password", "hunter2")
			.with_authenticator("okta_email");
		let reduced = values.without(["password", keys::AUTHENTICATOR]);

		assert_eq!(values.get("password"), Some(&json!("hunter2")));
		assert!(values.authenticator().is_some());
		assert_eq!(reduced.get("password"), None);
		assert_eq!(reduced.get("username"), Some(&json!("alice@example.com")));
		assert!(reduced.authenticator().is_none());
	}

	#[test]
	fn authenticator_keys_route_to_typed_slots() {
		let values = RemediationValues::new()
			.with(
				keys::AUTHENTICATORS,
				json!(["password", { "key": "okta_email", "id": "aut-email" }]),
			)
			.with(keys::AUTHENTICATOR, json!({ "id": "aut-pwd" }));

		assert_eq!(values.authenticators().len(), 2);
		assert_eq!(values.authenticator().and_then(|a| a.id.as_deref()), Some("aut-pwd"));
		assert_eq!(
			values.lookup(keys::AUTHENTICATORS).and_then(|v| v.as_array().map(Vec::len)),
			Some(2)
		);
		assert!(!values.contains_key("password"));
	}

	#[test]
	fn debug_output_hides_values() {
		let rendered = format!("{:?}", RemediationValues::new().with("password", "hunter2"));

		assert!(rendered.contains("password"));
		assert!(!rendered.contains("hunter2"));
	}

	#[test]
	fn truthiness_matches_javascript() {
		assert!(!is_truthy(&json!(null)));
		assert!(!is_truthy(&json!("")));
		assert!(!is_truthy(&json!(0)));
		assert!(!is_truthy(&json!(false)));
		assert!(is_truthy(&json!("x")));
		assert!(is_truthy(&json!(1)));
		assert!(is_truthy(&json!([])));
		assert!(is_truthy(&json!({})));
	}
}
