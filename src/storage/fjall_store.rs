use std::fmt::Debug;
use std::path::Path;

use async_trait::async_trait;
use fjall::Keyspace;
use serde::{Serialize, de::DeserializeOwned};
use tokio::task;

use super::{DirectoryReader, HobbyDirectory, ProfileStore};
use crate::error::StorageError;
use crate::models::{ProfileRecord, UserProfile};

const PROFILES: &str = "profiles";
const HOBBY_LOCATIONS: &str = "hobby_locations";

/// Persistent profile store and hobby directory backed by fjall
pub struct FjallStore {
    profiles: Keyspace,
    hobby_locations: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>, StorageError> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

async fn read<T: DeserializeOwned + Send + 'static>(
    store: &Keyspace,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let store = store.clone();
    let key_bytes = key.as_bytes().to_vec();

    let maybe_bytes = task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

    match maybe_bytes {
        Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
        None => {
            tracing::debug!("Key '{}' not found", key);
            Ok(None)
        }
    }
}

async fn write<T: Serialize + Debug>(
    store: &Keyspace,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let store = store.clone();
    let key = key.as_bytes().to_vec();
    let bytes = postcard::to_stdvec(value)?;

    task::spawn_blocking(move || store.insert(key, bytes)).await??;
    Ok(())
}

impl FjallStore {
    /// Open (or create) the database at `path`. Opened once per process.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = fjall::Database::builder(&path).open()?;
        let profiles = db.keyspace(PROFILES, fjall::KeyspaceCreateOptions::default)?;
        let hobby_locations = db.keyspace(HOBBY_LOCATIONS, fjall::KeyspaceCreateOptions::default)?;
        tracing::info!("Opened store at {}", path.as_ref().display());
        Ok(Self {
            profiles,
            hobby_locations,
        })
    }
}

#[async_trait]
impl ProfileStore for FjallStore {
    #[tracing::instrument(name = "get_profile", level = "debug", skip(self))]
    async fn get_profile(&self, user_id: u64) -> Result<Option<UserProfile>, StorageError> {
        let record: Option<ProfileRecord> = read(&self.profiles, &user_id.to_string()).await?;
        record
            .map(|record| UserProfile::from_record(user_id, &record))
            .transpose()
    }

    #[tracing::instrument(name = "put_profile", level = "debug", skip(self, profile), fields(user_id = profile.user_id))]
    async fn put_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let record = profile.to_record()?;
        write(&self.profiles, &profile.user_id.to_string(), &record).await
    }
}

#[async_trait]
impl HobbyDirectory for FjallStore {
    fn open_reader(&self) -> Result<Box<dyn DirectoryReader>, StorageError> {
        tracing::debug!("Opening hobby directory reader");
        Ok(Box::new(FjallDirectoryReader {
            keyspace: self.hobby_locations.clone(),
        }))
    }

    async fn set_locations(&self, hobby: &str, locations: &[String]) -> Result<(), StorageError> {
        write(&self.hobby_locations, hobby, &locations.to_vec()).await
    }
}

/// Read handle over the `hobby_locations` keyspace
struct FjallDirectoryReader {
    keyspace: Keyspace,
}

#[async_trait]
impl DirectoryReader for FjallDirectoryReader {
    async fn lookup_locations(&self, hobby: &str) -> Result<Vec<String>, StorageError> {
        let locations: Option<Vec<String>> = read(&self.keyspace, hobby).await?;
        Ok(locations.unwrap_or_default())
    }
}

impl Drop for FjallDirectoryReader {
    fn drop(&mut self) {
        tracing::debug!("Released hobby directory reader");
    }
}
