//! Engine configuration: issuer, protocol version, and the endpoints derived from them.
//!
//! [`IdxConfig`] is immutable once built. Use [`IdxConfig::builder`] to assemble one; the
//! builder rejects plain-HTTP issuers (loopback hosts excepted) and malformed protocol
//! versions before any request is made.

/// Builder API for assembling engine configuration.
pub mod builder;

pub use builder::*;

// self
use crate::_prelude::*;

/// Protocol version pinned on introspection requests when the caller does not override it.
pub const IDX_API_VERSION: &str = "1.0.0";

/// Immutable engine configuration consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdxConfig {
	/// Authorization server issuer, e.g. `https://example.okta.com/oauth2/default`.
	pub issuer: Url,
	/// Default protocol version for introspection requests.
	pub version: String,
}
impl IdxConfig {
	/// Creates a new builder for the provided issuer.
	pub fn builder(issuer: Url) -> IdxConfigBuilder {
		IdxConfigBuilder::new(issuer)
	}

	/// Returns the org domain: the issuer with any `/oauth2...` suffix removed.
	pub fn oauth_domain(&self) -> &str {
		let issuer = self.issuer.as_str();

		match issuer.find("/oauth2") {
			Some(idx) => &issuer[..idx],
			None => issuer.trim_end_matches('/'),
		}
	}

	/// Returns the introspection endpoint for this org.
	pub fn introspect_url(&self) -> String {
		format!("{}/idp/idx/introspect", self.oauth_domain())
	}
}

/// Returns the versioned document media type used on `content-type` and `accept` headers.
pub fn ion_media_type(version: &str) -> String {
	format!("application/ion+json; okta-version={version}")
}

/// Validates a protocol version string.
///
/// The version must be non-empty and contain only ASCII alphanumerics, `.`, `_`, or `-`.
pub fn validate_version(version: &str) -> Result<(), IdxConfigError> {
	let well_formed = !version.is_empty()
		&& version.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

	if well_formed {
		Ok(())
	} else {
		Err(IdxConfigError::InvalidVersion { version: version.to_owned() })
	}
}
