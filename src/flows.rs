//! Flow orchestration on top of the document decomposer and the remediator registry.
//!
//! [`IdxClient`] owns the transport, the transaction store, and the reference resolver.
//! [`IdxClient::introspect`] bootstraps a transaction, [`IdxClient::run`] drives an arbitrary
//! registry to a terminal state, and [`IdxClient::authenticate`] wires the registry for a
//! password or multi-factor sign-in. Every entry point that touches the store is serialized
//! through one async guard per client.

pub mod authenticate;
pub mod introspect;
pub mod proceed;
pub mod run;
pub mod transaction;

mod common;

pub use authenticate::*;
pub use introspect::*;
pub use run::*;
pub use transaction::*;

// self
use crate::{
	_prelude::*,
	config::IdxConfig,
	document::{JsonPathResolver, ReferenceResolver},
	http::{IdxHttpClient, TransportErrorMapper},
	store::TransactionStore,
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};

/// Client specialized for the crate's default reqwest transport stack.
#[cfg(feature = "reqwest")]
pub type ReqwestIdxClient = IdxClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Drives exchanges against one org.
#[derive(Clone)]
pub struct IdxClient<C, M>
where
	C: ?Sized + IdxHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Store holding the latest document of the exchange in progress.
	pub store: Arc<dyn TransactionStore>,
	/// Engine configuration.
	pub config: IdxConfig,
	/// Evaluator for `relatesTo` references.
	pub resolver: Arc<dyn ReferenceResolver>,
	flow_guard: Arc<AsyncMutex<()>>,
}
impl<C, M> IdxClient<C, M>
where
	C: ?Sized + IdxHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		store: Arc<dyn TransactionStore>,
		config: IdxConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			store,
			config,
			resolver: Arc::new(JsonPathResolver),
			flow_guard: Default::default(),
		}
	}

	/// Replaces the reference resolver used when decomposing documents.
	pub fn with_resolver(mut self, resolver: Arc<dyn ReferenceResolver>) -> Self {
		self.resolver = resolver;

		self
	}
}
#[cfg(feature = "reqwest")]
impl IdxClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client that provisions its own reqwest-backed transport.
	pub fn new(store: Arc<dyn TransactionStore>, config: IdxConfig) -> Self {
		Self::with_http_client(
			store,
			config,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for IdxClient<C, M>
where
	C: ?Sized + IdxHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdxClient").field("config", &self.config).finish()
	}
}
