//! Client-side engine for server-driven IDX authentication exchanges: decompose remediation
//! documents, check step readiness, and proceed until the flow reaches a terminal state.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod document;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod remediator;
pub mod service;
pub mod store;
#[cfg(any(test, feature = "test"))]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports, document fixtures, and client builders shared by unit and
	//! integration tests; enabled via `cfg(test)` or the `test` crate feature.

	pub mod fixtures;

	pub use crate::_prelude::*;

	#[cfg(feature = "reqwest")]
	// self
	use crate::{
		config::IdxConfig,
		flows::IdxClient,
		http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
		store::{MemoryStore, TransactionStore},
	};

	/// Client type alias used by reqwest-backed integration tests.
	#[cfg(feature = "reqwest")]
	pub type ReqwestTestClient = IdxClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`IdxClient`] backed by an in-memory store and the reqwest transport used
	/// across integration tests.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_client(issuer: &str) -> (ReqwestTestClient, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TransactionStore> = store_backend.clone();
		let issuer = Url::parse(issuer).expect("Failed to parse test issuer URL.");
		let config = IdxConfig::builder(issuer).build().expect("Failed to build test config.");
		let client = IdxClient::with_http_client(
			store,
			config,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		);

		(client, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value, json};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
