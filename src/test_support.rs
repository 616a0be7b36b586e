// In-memory stand-ins for the device capabilities, used by unit tests.

use crate::camera::{Camera, CapturedImage, CaptureOptions};
use crate::error::AppError;
use crate::filesystem::{DownloadSink, FileStore};
use crate::geolocation::{Geolocator, PositionOptions};
use crate::image_source::ImageReader;
use crate::models::Coordinates;
use crate::services::preferences_service::PreferenceStore;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Camera that either returns a fixed web image or fails with a capture error
pub struct FakeCamera {
    pub deny: bool,
    pub calls: AtomicUsize,
}

impl FakeCamera {
    pub fn working() -> Self {
        Self {
            deny: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn denied() -> Self {
        Self {
            deny: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Camera for FakeCamera {
    async fn capture_photo(&self, _options: &CaptureOptions) -> Result<CapturedImage, AppError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.deny {
            return Err(AppError::Capture("User cancelled photos app".to_string()));
        }
        // Yield so concurrent captures can interleave
        tokio::task::yield_now().await;
        Ok(CapturedImage {
            path: None,
            web_path: Some(format!("blob:preview/{}", n)),
            format: "jpeg".to_string(),
        })
    }
}

/// Geolocator with a fixed answer; `None` behaves like a denied permission
pub struct FakeGeolocator(pub Option<Coordinates>);

#[async_trait]
impl Geolocator for FakeGeolocator {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, AppError> {
        tokio::task::yield_now().await;
        self.0
            .ok_or_else(|| AppError::Geolocation("User denied Geolocation".to_string()))
    }
}

/// Image reader returning the same bytes for every capture
pub struct FakeImageReader(pub Vec<u8>);

#[async_trait]
impl ImageReader for FakeImageReader {
    async fn read_image(&self, _image: &CapturedImage) -> Result<Vec<u8>, AppError> {
        Ok(self.0.clone())
    }
}

/// File store kept in a map, with per-name failure injection
#[derive(Default)]
pub struct MemoryFileStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    failing_reads: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<String>>,
    fail_all_writes_with_suffix: Mutex<Option<String>>,
}

impl MemoryFileStore {
    pub fn insert(&self, name: &str, data: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), data.to_vec());
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(name).cloned()
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(|d| String::from_utf8(d).unwrap())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn fail_reads_of(&self, name: &str) {
        self.failing_reads.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_writes_of(&self, name: &str) {
        self.failing_writes.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_writes_ending_with(&self, suffix: &str) {
        *self.fail_all_writes_with_suffix.lock().unwrap() = Some(suffix.to_string());
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn read_file(&self, name: &str) -> Result<Vec<u8>, AppError> {
        tokio::task::yield_now().await;
        if self.failing_reads.lock().unwrap().contains(name) {
            return Err(AppError::Filesystem(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read refused",
            )));
        }
        self.get(name)
            .ok_or_else(|| AppError::NotFound(name.to_string()))
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), AppError> {
        tokio::task::yield_now().await;
        let suffix_fails = self
            .fail_all_writes_with_suffix
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|s| name.ends_with(s));
        if suffix_fails || self.failing_writes.lock().unwrap().contains(name) {
            return Err(AppError::Filesystem(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.insert(name, data);
        Ok(())
    }
}

/// Preference store whose every call fails
pub struct FailingPreferences;

#[async_trait]
impl PreferenceStore for FailingPreferences {
    async fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
        Err(AppError::Other("preferences unavailable".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), AppError> {
        Err(AppError::Other("preferences unavailable".to_string()))
    }
}

/// Download sink that remembers what it was handed
#[derive(Default)]
pub struct RecordingDownloads {
    downloads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingDownloads {
    pub fn downloads(&self) -> Vec<(String, Vec<u8>)> {
        self.downloads.lock().unwrap().clone()
    }
}

impl DownloadSink for RecordingDownloads {
    fn trigger_download(&self, data: &[u8], file_name: &str) {
        self.downloads
            .lock()
            .unwrap()
            .push((file_name.to_string(), data.to_vec()));
    }
}
