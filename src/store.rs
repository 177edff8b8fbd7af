//! Storage contracts and built-in store implementations for in-progress exchange documents.
//!
//! A store holds at most one raw document: the latest response of the exchange it belongs
//! to. Flows load it to resume without a network call, overwrite it after every step, and
//! clear it once the exchange reaches a terminal state.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, document::IdxDocument};

/// Boxed future returned by [`TransactionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the persisted exchange document.
pub trait TransactionStore
where
	Self: Send + Sync,
{
	/// Returns the persisted document, if any.
	fn load(&self) -> StoreFuture<'_, Option<IdxDocument>>;

	/// Persists or replaces the document.
	fn save(&self, document: IdxDocument) -> StoreFuture<'_, ()>;

	/// Removes the persisted document. Clearing an empty store succeeds.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TransactionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
