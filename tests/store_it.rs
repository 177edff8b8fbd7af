#![cfg(feature = "reqwest")]

// self
use idx_flow::{
	_preludet::*,
	document::IdxDocument,
	store::{FileStore, MemoryStore, TransactionStore},
};

async fn exercise(store: &dyn TransactionStore) {
	assert!(store.load().await.expect("Loading an empty store should succeed.").is_none());

	store.save(fixtures::identify_document()).await.expect("First save should succeed.");
	store
		.save(fixtures::challenge_password_document())
		.await
		.expect("Second save should replace the first.");

	let loaded: Option<IdxDocument> = store.load().await.expect("Loading should succeed.");

	assert_eq!(loaded, Some(fixtures::challenge_password_document()));

	store.clear().await.expect("Clearing should succeed.");

	assert!(store.load().await.expect("Loading after clear should succeed.").is_none());
}

#[tokio::test]
async fn memory_store_keeps_only_the_latest_document() {
	let store = MemoryStore::default();

	exercise(&store).await;

	let clone = store.clone();

	store.save(fixtures::success_document()).await.expect("Save should succeed.");

	assert_eq!(clone.snapshot(), Some(fixtures::success_document()));
}

#[tokio::test]
async fn file_store_follows_the_same_contract() {
	let path = std::env::temp_dir().join(format!("idx_flow_store_it_{}.json", std::process::id()));
	let _ = std::fs::remove_file(&path);
	let store = FileStore::open(&path).expect("Opening a fresh file store should succeed.");

	exercise(&store).await;

	assert!(!path.exists());
}

#[test]
fn file_store_rejects_corrupt_snapshots() {
	let path =
		std::env::temp_dir().join(format!("idx_flow_store_it_corrupt_{}.json", std::process::id()));

	std::fs::write(&path, b"{not json").expect("Writing the corrupt snapshot should succeed.");

	let err = FileStore::open(&path).expect_err("Corrupt snapshots should be rejected.");

	std::fs::remove_file(&path).expect("Removing the corrupt snapshot should succeed.");

	assert!(err.to_string().contains("Serialization error"));
}
