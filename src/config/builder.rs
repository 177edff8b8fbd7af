// self
use crate::{
	_prelude::*,
	config::{IDX_API_VERSION, IdxConfig, validate_version},
};

/// Errors raised while constructing or validating engine configuration.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum IdxConfigError {
	/// Issuer must use HTTPS unless it points at a loopback host.
	#[error("The issuer must use HTTPS: {url}.")]
	InsecureIssuer {
		/// Issuer URL that failed validation.
		url: String,
	},
	/// Issuer must be a base URL carrying a host.
	#[error("The issuer has no host: {url}.")]
	MissingHost {
		/// Issuer URL that failed validation.
		url: String,
	},
	/// Protocol version is empty or contains characters outside `[0-9A-Za-z._-]`.
	#[error("Invalid protocol version `{version}`; a semver-like version is required.")]
	InvalidVersion {
		/// Rejected version string.
		version: String,
	},
}

/// Builder for [`IdxConfig`] values.
#[derive(Debug)]
pub struct IdxConfigBuilder {
	/// Authorization server issuer.
	pub issuer: Url,
	/// Protocol version pinned on introspection requests.
	pub version: String,
}
impl IdxConfigBuilder {
	/// Creates a new builder seeded with the provided issuer and the default version.
	pub fn new(issuer: Url) -> Self {
		Self { issuer, version: IDX_API_VERSION.into() }
	}

	/// Overrides the protocol version.
	pub fn version(mut self, version: impl Into<String>) -> Self {
		self.version = version.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<IdxConfig, IdxConfigError> {
		let config = IdxConfig { issuer: self.issuer, version: self.version };

		config.validate()?;

		Ok(config)
	}
}

impl IdxConfig {
	fn validate(&self) -> Result<(), IdxConfigError> {
		validate_issuer(&self.issuer)?;
		validate_version(&self.version)
	}
}

fn validate_issuer(url: &Url) -> Result<(), IdxConfigError> {
	let Some(host) = url.host_str() else {
		return Err(IdxConfigError::MissingHost { url: url.to_string() });
	};

	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(host) => Ok(()),
		_ => Err(IdxConfigError::InsecureIssuer { url: url.to_string() }),
	}
}

fn is_loopback(host: &str) -> bool {
	matches!(host, "localhost" | "127.0.0.1" | "[::1]")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse issuer fixture.")
	}

	#[test]
	fn builder_rejects_plain_http_for_remote_hosts() {
		let err = IdxConfig::builder(url("http://acme.okta.com/oauth2/default"))
			.build()
			.expect_err("Plain HTTP issuers should be rejected.");

		assert!(matches!(err, IdxConfigError::InsecureIssuer { .. }));
	}

	#[test]
	fn builder_accepts_loopback_http() {
		let config = IdxConfig::builder(url("http://127.0.0.1:8080/oauth2/default"))
			.build()
			.expect("Loopback issuers should be accepted.");

		assert_eq!(config.version, IDX_API_VERSION);
	}

	#[test]
	fn builder_rejects_invalid_versions() {
		let err = IdxConfig::builder(url("https://acme.okta.com"))
			.version("1.0.0 ")
			.build()
			.expect_err("Versions with whitespace should be rejected.");

		assert_eq!(err, IdxConfigError::InvalidVersion { version: "1.0.0 ".into() });
	}
}
