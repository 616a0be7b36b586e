use crate::camera::{Camera, DeviceCamera};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::filesystem::{DownloadSink, FileDownloadSink, FileStore, LocalFileStore};
use crate::geolocation::{DeviceGeolocator, Geolocator, PositionOptions};
use crate::image_source::{image_reader_for, ImageReader};
use crate::models::PhotoRecord;
use crate::services::{
    location_log, CaptureService, PhotoSnapshot, PhotoStore, PreferenceStore, SqlitePreferences,
};
use std::sync::Arc;
use tokio::sync::watch;

/// The capabilities the app runs on
pub struct Adapters {
    pub camera: Arc<dyn Camera>,
    pub geolocator: Arc<dyn Geolocator>,
    pub image_reader: Arc<dyn ImageReader>,
    pub files: Arc<dyn FileStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub downloads: Arc<dyn DownloadSink>,
}

impl Adapters {
    /// Device-backed adapters for the configured platform and directories
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let bridge = config.bridge_config();
        Ok(Self {
            camera: Arc::new(DeviceCamera::new(bridge.clone())),
            geolocator: Arc::new(DeviceGeolocator::new(bridge)),
            image_reader: image_reader_for(config.platform),
            files: Arc::new(LocalFileStore::new(&config.data_dir)),
            preferences: Arc::new(SqlitePreferences::open(&config.database_path())?),
            downloads: Arc::new(FileDownloadSink::new(&config.export_dir)),
        })
    }
}

/// Wires the store, the capture workflow and the location log together
pub struct GeoFotoApp {
    capture: CaptureService,
    files: Arc<dyn FileStore>,
    downloads: Arc<dyn DownloadSink>,
}

impl GeoFotoApp {
    /// Builds the app and hydrates the photo collection
    pub async fn start(config: &AppConfig, adapters: Adapters) -> Result<Self, AppError> {
        let store = Arc::new(PhotoStore::new(adapters.preferences));
        let count = store.load().await?;
        log::info!("geofoto started with {} photos", count);

        let capture = CaptureService::new(
            adapters.camera,
            adapters.geolocator,
            adapters.image_reader,
            adapters.files.clone(),
            store,
        )
        .with_position_options(PositionOptions {
            enable_high_accuracy: config.high_accuracy,
        });

        Ok(Self {
            capture,
            files: adapters.files,
            downloads: adapters.downloads,
        })
    }

    /// [`GeoFotoApp::start`] with the device adapters from `config`
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let adapters = Adapters::from_config(config)?;
        Self::start(config, adapters).await
    }

    pub fn capture_service(&self) -> &CaptureService {
        &self.capture
    }

    pub async fn take_photo(&self) -> Result<PhotoRecord, AppError> {
        self.capture.capture_and_store().await
    }

    pub fn photos(&self) -> PhotoSnapshot {
        self.capture.store().current()
    }

    pub fn subscribe(&self) -> watch::Receiver<PhotoSnapshot> {
        self.capture.store().subscribe()
    }

    /// Exports all photo locations, newest first, through the download sink
    pub fn export_locations(&self) -> usize {
        let photos = self.photos();
        location_log::export(&photos, self.downloads.as_ref());
        photos.len()
    }

    /// Rewrites the location log from the stored photo list
    pub async fn rebuild_location_log(&self) -> Result<usize, AppError> {
        let photos = self.photos();
        location_log::rebuild(self.files.as_ref(), &photos).await
    }
}
