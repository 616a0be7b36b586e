use crate::error::AppError;
use crate::models::{decode_collection, encode_collection, PhotoRecord};
use crate::services::preferences_service::PreferenceStore;
use std::sync::Arc;
use tokio::sync::watch;

/// Preference key holding the serialized photo collection
pub const PHOTO_STORAGE_KEY: &str = "photos";

/// Immutable view of the photo collection, newest first
pub type PhotoSnapshot = Arc<Vec<PhotoRecord>>;

/// Owns the photo collection and keeps it in sync with the preference store
///
/// The collection lives inside a `watch` channel: the sender's current value is
/// the authoritative in-memory state, and every receiver sees the latest
/// snapshot (the current one right after subscribing).
pub struct PhotoStore {
    prefs: Arc<dyn PreferenceStore>,
    photos: watch::Sender<PhotoSnapshot>,
}

impl PhotoStore {
    /// Creates an empty store; call [`PhotoStore::load`] to hydrate it
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        let (photos, _rx) = watch::channel(Arc::new(Vec::new()));
        Self { prefs, photos }
    }

    /// Hydrates the collection from the preference store
    ///
    /// An absent blob yields an empty collection. A corrupt blob is logged and
    /// also yields an empty collection. The stored blob itself is left untouched
    /// until the next successful capture overwrites it.
    pub async fn load(&self) -> Result<usize, AppError> {
        let records = match self.prefs.get(PHOTO_STORAGE_KEY).await? {
            None => Vec::new(),
            Some(blob) => match decode_collection(&blob) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("Stored photo list is unreadable, starting empty: {}", e);
                    Vec::new()
                }
            },
        };

        let count = records.len();
        log::debug!("Loaded {} photos", count);
        self.photos.send_replace(Arc::new(records));
        Ok(count)
    }

    /// Writes the whole current collection to the preference store
    pub async fn persist(&self) -> Result<(), AppError> {
        let current = self.current();
        self.write_blob(&current).await
    }

    /// Inserts `record` as the newest photo, persists and notifies
    ///
    /// The in-memory collection only changes after the blob was written, so a
    /// failed write leaves memory and storage in agreement.
    pub async fn prepend(&self, record: PhotoRecord) -> Result<PhotoSnapshot, AppError> {
        let current = self.current();
        let mut updated = Vec::with_capacity(current.len() + 1);
        updated.push(record);
        updated.extend(current.iter().cloned());

        self.write_blob(&updated).await?;

        let snapshot = Arc::new(updated);
        self.photos.send_replace(snapshot.clone());
        Ok(snapshot)
    }

    pub fn current(&self) -> PhotoSnapshot {
        self.photos.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PhotoSnapshot> {
        self.photos.subscribe()
    }

    pub fn len(&self) -> usize {
        self.photos.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn write_blob(&self, records: &[PhotoRecord]) -> Result<(), AppError> {
        let blob = encode_collection(records)
            .map_err(|e| AppError::Storage(format!("encoding photo list failed: {}", e)))?;
        self.prefs
            .set(PHOTO_STORAGE_KEY, &blob)
            .await
            .map_err(|e| AppError::Storage(format!("saving photo list failed: {}", e)))
    }
}
