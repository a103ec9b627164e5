use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use super::{DirectoryReader, HobbyDirectory, ProfileStore};
use crate::error::StorageError;
use crate::models::{ProfileRecord, UserProfile};

type LocationMap = Arc<RwLock<HashMap<String, Vec<String>>>>;

/// Process-local profile store and hobby directory.
///
/// Profiles are kept in their stored encoding so reads decode exactly like
/// the persistent backend.
#[derive(Default)]
pub struct InMemoryStore {
    profiles: RwLock<HashMap<u64, ProfileRecord>>,
    hobby_locations: LocationMap,
    open_readers: Arc<AtomicUsize>,
    readers_opened: AtomicUsize,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw record, bypassing the list encoder
    pub fn insert_record(&self, user_id: u64, record: ProfileRecord) {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id, record);
    }

    /// Number of directory readers currently alive
    #[must_use]
    pub fn open_reader_count(&self) -> usize {
        self.open_readers.load(Ordering::SeqCst)
    }

    /// Directory readers opened since creation
    #[must_use]
    pub fn readers_opened(&self) -> usize {
        self.readers_opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn get_profile(&self, user_id: u64) -> Result<Option<UserProfile>, StorageError> {
        let record = self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .cloned();
        record
            .map(|record| UserProfile::from_record(user_id, &record))
            .transpose()
    }

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let record = profile.to_record()?;
        self.insert_record(profile.user_id, record);
        Ok(())
    }
}

#[async_trait]
impl HobbyDirectory for InMemoryStore {
    fn open_reader(&self) -> Result<Box<dyn DirectoryReader>, StorageError> {
        self.open_readers.fetch_add(1, Ordering::SeqCst);
        self.readers_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryDirectoryReader {
            locations: Arc::clone(&self.hobby_locations),
            open_readers: Arc::clone(&self.open_readers),
        }))
    }

    async fn set_locations(&self, hobby: &str, locations: &[String]) -> Result<(), StorageError> {
        self.hobby_locations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(hobby.to_string(), locations.to_vec());
        Ok(())
    }
}

struct MemoryDirectoryReader {
    locations: LocationMap,
    open_readers: Arc<AtomicUsize>,
}

#[async_trait]
impl DirectoryReader for MemoryDirectoryReader {
    async fn lookup_locations(&self, hobby: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .locations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(hobby)
            .cloned()
            .unwrap_or_default())
    }
}

impl Drop for MemoryDirectoryReader {
    fn drop(&mut self) {
        self.open_readers.fetch_sub(1, Ordering::SeqCst);
    }
}
