//! Engine-level error types shared across flows, documents, and stores.

// self
use crate::_prelude::*;

/// Engine-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical engine error exposed by public APIs.
///
/// A pending remediation is never an error: it surfaces as
/// [`IdxStatus::Pending`](crate::flows::IdxStatus::Pending). Likewise a server rejection whose
/// body is a well-formed exchange document is decomposed into transaction state instead of
/// being raised here.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or integration defect.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure not shaped like an exchange document.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Successful response whose body is not an exchange document.
	#[error(transparent)]
	Document(#[from] DocumentError),
}

/// Configuration and integration failures raised by the engine.
///
/// These are meant to be caught during development; they are never retried.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestBody {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// Engine configuration failed validation.
	#[error(transparent)]
	Invalid(#[from] crate::config::IdxConfigError),

	/// The flow references a step with no registered remediator.
	#[error("No remediator is registered for step `{step}`.")]
	UnknownRemediation {
		/// Offending step name.
		step: String,
	},
	/// A remediator declares a field it cannot turn into an input.
	#[error("Missing custom input builder for field `{field}` in remediator `{step}`.")]
	MissingInputBuilder {
		/// Field declared by the remediator's alias table.
		field: String,
		/// Step owning the remediator.
		step: String,
	},
	/// The document offers the step but no invocable action is bound to it.
	#[error("Step `{step}` has no action to invoke.")]
	MissingAction {
		/// Step or action name.
		step: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, non-document HTTP errors).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the IDX endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the IDX endpoint.")]
	Io(#[from] std::io::Error),
	/// Server answered with an error status and a body that is not an exchange document.
	#[error("IDX endpoint returned HTTP {status}: {body}.")]
	HttpStatus {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// Transport reported a failure without a structured cause.
	#[error("HTTP client error occurred while calling the IDX endpoint: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Builds an [`TransportError::HttpStatus`] keeping at most a short preview of the body.
	pub fn http_status(status: u16, body: &[u8]) -> Self {
		let text = String::from_utf8_lossy(body);
		let body = match text.char_indices().nth(Self::BODY_PREVIEW_LIMIT) {
			Some((idx, _)) => format!("{}...", &text[..idx]),
			None => text.into_owned(),
		};

		Self::HttpStatus { status, body }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures raised while reading an exchange document.
#[derive(Debug, ThisError)]
pub enum DocumentError {
	/// Body is not valid JSON.
	#[error("Response body is not valid JSON.")]
	Json(#[from] serde_json::Error),
	/// JSON is valid but lacks the exchange document shape.
	#[error("Response body is not an IDX document.")]
	NotAnIdxDocument,
	/// A remediation could not be read into its typed descriptor.
	#[error("Remediation #{index} is malformed.")]
	MalformedRemediation {
		/// Position inside `remediation.value`.
		index: usize,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A top-level action could not be read into its typed descriptor.
	#[error("Action `{field}` is malformed.")]
	MalformedAction {
		/// Top-level field holding the action.
		field: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
