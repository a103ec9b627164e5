//! Profile store and hobby directory backends
//!
//! Both are point-read services from the pipeline's point of view. The
//! fjall backend persists them on disk; the in-memory backend serves
//! demos and tests.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::UserProfile;

pub mod fjall_store;
pub mod memory;
pub mod seed;

pub use fjall_store::FjallStore;
pub use memory::InMemoryStore;
pub use seed::{SeedDocument, SeedSummary};

/// Lookup of stored traveler profiles by user id
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: u64) -> Result<Option<UserProfile>, StorageError>;

    /// Insert or replace a profile
    async fn put_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;
}

/// Directory of hobby names to the locations offering them
#[async_trait]
pub trait HobbyDirectory: Send + Sync {
    /// Open a read handle. The handle is released when dropped.
    fn open_reader(&self) -> Result<Box<dyn DirectoryReader>, StorageError>;

    /// Replace the location list of a hobby
    async fn set_locations(&self, hobby: &str, locations: &[String]) -> Result<(), StorageError>;
}

/// Scoped read access to a hobby directory
#[async_trait]
pub trait DirectoryReader: Send + Sync {
    /// Locations for a hobby in stored order; empty when the hobby is unknown
    async fn lookup_locations(&self, hobby: &str) -> Result<Vec<String>, StorageError>;
}
