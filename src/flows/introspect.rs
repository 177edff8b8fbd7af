//! Transaction bootstrap: resume the stored document or ask the server for the current one.

// self
use crate::{
	_prelude::*,
	auth::Secret,
	config::{ion_media_type, validate_version},
	error::ConfigError,
	flows::{
		IdxClient, IdxResponse,
		common::{self, JsonRequest},
	},
	http::{IdxHttpClient, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Inputs for [`IdxClient::introspect`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntrospectOptions {
	/// Ask the transport to send credentials (cookies) with exchange requests.
	pub with_credentials: bool,
	/// Handle returned by the interaction endpoint.
	pub interaction_handle: Option<Secret>,
	/// Resume token of an exchange started elsewhere; wins over `interaction_handle`.
	pub state_handle: Option<Secret>,
	/// Protocol version override.
	pub version: Option<String>,
}
impl IntrospectOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the credentialed-request flag.
	pub fn with_credentials(mut self, with_credentials: bool) -> Self {
		self.with_credentials = with_credentials;

		self
	}

	/// Sets the interaction handle.
	pub fn interaction_handle(mut self, handle: impl Into<Secret>) -> Self {
		self.interaction_handle = Some(handle.into());

		self
	}

	/// Sets the resume token.
	pub fn state_handle(mut self, handle: impl Into<Secret>) -> Self {
		self.state_handle = Some(handle.into());

		self
	}

	/// Overrides the protocol version.
	pub fn version(mut self, version: impl Into<String>) -> Self {
		self.version = Some(version.into());

		self
	}

	fn body(&self) -> Value {
		match (&self.state_handle, &self.interaction_handle) {
			(Some(state), _) => json!({ "stateToken": state.expose() }),
			(None, Some(interaction)) => json!({ "interactionHandle": interaction.expose() }),
			(None, None) => json!({}),
		}
	}
}

impl<C, M> IdxClient<C, M>
where
	C: ?Sized + IdxHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns the current document of the exchange.
	///
	/// A stored document is decomposed without touching the network. Otherwise one
	/// introspection request is made; a rejection whose body is still a document is returned
	/// as data with `request_did_succeed = false`.
	pub async fn introspect(&self, options: &IntrospectOptions) -> Result<IdxResponse> {
		const KIND: FlowKind = FlowKind::Introspect;

		let span = FlowSpan::new(KIND, "introspect");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _guard = self.flow_guard.lock().await;

				self.load_or_introspect(options).await
			})
			.await;

		if result.is_err() {
			obs::record_flow_outcome(KIND, FlowOutcome::Failure);
		}

		result
	}

	pub(crate) async fn load_or_introspect(
		&self,
		options: &IntrospectOptions,
	) -> Result<IdxResponse> {
		if let Some(document) = self.store.load().await? {
			return Ok(IdxResponse::decompose_with(document, true, self.resolver.as_ref())?
				.with_credentials(options.with_credentials));
		}

		let version = options.version.as_deref().unwrap_or(&self.config.version);

		validate_version(version).map_err(ConfigError::from)?;

		let media_type = ion_media_type(version);
		let url = self.config.introspect_url();
		let request = JsonRequest {
			method: "POST",
			url: &url,
			content_type: &media_type,
			accept: &media_type,
			body: options.body(),
		};

		common::send(self, request, options.with_credentials).await
	}
}
