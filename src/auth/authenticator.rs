//! Authenticator selectors supplied by callers and offered by exchange documents.
//!
//! A caller may name an authenticator by key alone (`"okta_password"`) or by a richer object
//! carrying an `id`, `methodType`, or enrollment answers. Both shapes normalize into
//! [`Authenticator`]; anything beyond `key` and `id` lives in [`Authenticator::meta`].

// self
use crate::_prelude::*;

/// Well-known authenticator keys.
pub mod keys {
	/// Password authenticator.
	pub const OKTA_PASSWORD: &str = "okta_password";
	/// Email authenticator.
	pub const OKTA_EMAIL: &str = "okta_email";
	/// Okta Verify authenticator.
	pub const OKTA_VERIFY: &str = "okta_verify";
	/// Phone (SMS/voice) authenticator.
	pub const PHONE_NUMBER: &str = "phone_number";
	/// Security question authenticator.
	pub const SECURITY_QUESTION: &str = "security_question";
	/// Google Authenticator.
	pub const GOOGLE_OTP: &str = "google_otp";
}

/// Caller-side authenticator selector.
///
/// Equality for selection purposes is [`Authenticator::matches`], not `PartialEq`: two
/// selectors match when both carry an `id` and the ids agree, otherwise when their keys agree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Authenticator {
	/// Authenticator key such as `okta_password`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
	/// Server-assigned authenticator id.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Additional metadata such as `methodType` or enrollment answers.
	#[serde(flatten)]
	pub meta: Map<String, Value>,
}
impl Authenticator {
	/// Builds a key-only selector.
	pub fn from_key(key: impl Into<String>) -> Self {
		Self { key: Some(key.into()), ..Default::default() }
	}

	/// Builds a selector carrying a server-assigned id.
	pub fn from_id(id: impl Into<String>) -> Self {
		Self { id: Some(id.into()), ..Default::default() }
	}

	/// Attaches an extra metadata field.
	pub fn with_meta(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.meta.insert(name.into(), value.into());

		self
	}

	/// Normalizes a JSON value into a selector.
	///
	/// Strings become key-only selectors; objects are read field by field. Any other shape
	/// yields `None`.
	pub fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::String(key) => Some(Self::from_key(key.as_str())),
			Value::Object(object) => {
				let mut meta = object.clone();
				let key = meta.remove("key").and_then(|v| v.as_str().map(str::to_owned));
				let id = meta.remove("id").and_then(|v| v.as_str().map(str::to_owned));

				Some(Self { key, id, meta })
			},
			_ => None,
		}
	}

	/// Returns the `methodType` metadata, if any.
	pub fn method_type(&self) -> Option<&str> {
		self.meta.get("methodType").and_then(Value::as_str)
	}

	/// Returns `true` when the selector carries more than a bare key.
	pub fn has_metadata(&self) -> bool {
		let present = usize::from(self.key.is_some()) + usize::from(self.id.is_some());

		present + self.meta.len() > 1
	}

	/// Selection equality: ids decide when both sides carry one, keys otherwise.
	pub fn matches(&self, other: &Self) -> bool {
		match (&self.id, &other.id) {
			(Some(a), Some(b)) => a == b,
			_ => matches!((&self.key, &other.key), (Some(a), Some(b)) if a == b),
		}
	}

	/// Returns `true` when this selector picks the authenticator a document offers.
	///
	/// Offered authenticators carry `key`, `id`, and `type`; a caller-side key also matches the
	/// offered `type`, so a plain `"password"` picks the password authenticator.
	pub fn selects(&self, offered: &Value) -> bool {
		let Some(candidate) = Self::from_value(offered) else { return false };

		if self.matches(&candidate) {
			return true;
		}

		match (&self.key, offered.get("type").and_then(Value::as_str)) {
			(Some(key), Some(kind)) => key == kind,
			_ => false,
		}
	}

	/// Serializes the selector back into JSON.
	pub fn to_value(&self) -> Value {
		let mut object = self.meta.clone();

		if let Some(key) = &self.key {
			object.insert("key".into(), Value::String(key.clone()));
		}
		if let Some(id) = &self.id {
			object.insert("id".into(), Value::String(id.clone()));
		}

		Value::Object(object)
	}
}
impl From<&str> for Authenticator {
	fn from(key: &str) -> Self {
		Self::from_key(key)
	}
}
impl From<String> for Authenticator {
	fn from(key: String) -> Self {
		Self::from_key(key)
	}
}
