//! Thread-safe in-memory [`TransactionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	document::IdxDocument,
	store::{StoreFuture, TransactionStore},
};

type Slot = Arc<RwLock<Option<IdxDocument>>>;

/// Storage backend that keeps the document in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Slot);
impl MemoryStore {
	/// Creates a store seeded with `document`.
	pub fn with_document(document: IdxDocument) -> Self {
		Self(Arc::new(RwLock::new(Some(document))))
	}

	/// Returns the persisted document without going through the async contract.
	pub fn snapshot(&self) -> Option<IdxDocument> {
		self.0.read().clone()
	}
}
impl TransactionStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Option<IdxDocument>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn save(&self, document: IdxDocument) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(document);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			slot.write().take();

			Ok(())
		})
	}
}
