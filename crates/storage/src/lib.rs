//! Azure Storage access for the bridge: shared-key request signing, block
//! blob upload to a SAS URL, and the status table.

pub mod blob;
pub mod error;
pub mod event_store;
pub mod memory;
pub mod shared_key;
pub mod table;

pub use blob::BlockBlobClient;
pub use error::StorageError;
pub use event_store::{EventStore, TableEventStore};
pub use memory::MemoryEventStore;
pub use table::{TableClient, TableEntity};

/// REST API version sent as `x-ms-version` on every request.
pub const STORAGE_API_VERSION: &str = "2020-08-04";
