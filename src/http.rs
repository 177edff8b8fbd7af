//! Transport primitives for exchange requests.
//!
//! The engine depends on an HTTP stack only through [`IdxHttpClient`], which hands out
//! short-lived [`AsyncHttpClient`] handles, and [`TransportErrorMapper`], which turns
//! transport failures into engine errors. Handles must return every response, including
//! error statuses, so the engine can recognize a rejection whose body is still an exchange
//! document.

// std
use std::ops::Deref;
// crates.io
pub use oauth2;
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")] use reqwest::redirect::Policy;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Abstraction over HTTP transports capable of executing exchange requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by many
/// clients, and the handles they return must own whatever state the request needs so the
/// request futures remain `Send` while in flight.
pub trait IdxHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for one request.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle for the next request.
	///
	/// `with_credentials` asks for a handle that sends ambient credentials, such as the
	/// session cookies the server set on earlier responses.
	fn handle(&self, with_credentials: bool) -> Self::Handle;
}

/// Maps transport-specific failures into engine errors.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into an engine error.
	fn map_transport_error(&self, error: HttpClientError<E>) -> Error;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Exchange requests should not follow redirects: every step answers with its next document
/// directly, and a redirect would replay the submitted credentials elsewhere. Configure any
/// custom [`ReqwestClient`] to disable redirect following.
///
/// Credentialed requests go through the client set with
/// [`ReqwestHttpClient::with_credentialed_client`], typically one holding a cookie store.
/// Without one, every request uses the primary client.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient {
	client: ReqwestClient,
	credentialed: Option<ReqwestClient>,
}
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, credentialed: None }
	}

	/// Builds a transport that never follows redirects and keeps a cookie store for
	/// credentialed requests.
	pub fn with_cookie_store() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;
		let credentialed =
			ReqwestClient::builder().redirect(Policy::none()).cookie_store(true).build()?;

		Ok(Self::with_client(client).with_credentialed_client(credentialed))
	}

	/// Uses `client` for requests made with credentials.
	pub fn with_credentialed_client(mut self, client: ReqwestClient) -> Self {
		self.credentialed = Some(client);

		self
	}

	/// Client serving requests with or without credentials.
	pub fn client_for(&self, with_credentials: bool) -> &ReqwestClient {
		match &self.credentialed {
			Some(credentialed) if with_credentials => credentialed,
			_ => &self.client,
		}
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl IdxHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self, with_credentials: bool) -> Self::Handle {
		ReqwestHandle(self.client_for(with_credentials).clone())
	}
}

/// Handle returned by [`ReqwestHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, err: HttpClientError<ReqwestError>) -> Error {
		match err {
			HttpClientError::Reqwest(inner) if inner.is_builder() =>
				ConfigError::from(*inner).into(),
			HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Other { message }.into(),
			_ => TransportError::Other { message: "unrecognized transport failure".into() }.into(),
		}
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	#[test]
	fn mapper_classifies_io_and_other_failures() {
		let mapper = ReqwestTransportErrorMapper;
		let io = mapper.map_transport_error(HttpClientError::Io(std::io::Error::other("reset")));
		let other = mapper.map_transport_error(HttpClientError::Other("tls handshake".into()));

		assert!(matches!(io, Error::Transport(TransportError::Io(_))));
		assert!(matches!(
			other,
			Error::Transport(TransportError::Other { message }) if message == "tls handshake"
		));
	}

	#[test]
	fn credentialed_client_is_used_only_when_requested() {
		let plain = ReqwestHttpClient::with_client(ReqwestClient::new());
		let cookies =
			ReqwestHttpClient::with_cookie_store().expect("Cookie-store transport should build.");

		assert!(std::ptr::eq(plain.client_for(true), plain.client_for(false)));
		assert!(!std::ptr::eq(cookies.client_for(true), cookies.client_for(false)));
		assert!(std::ptr::eq(cookies.client_for(false), cookies.as_ref()));
	}
}
