use crate::camera::{Camera, CaptureOptions, CapturedImage};
use crate::error::AppError;
use crate::filesystem::FileStore;
use crate::geolocation::{Geolocator, PositionOptions};
use crate::image_source::ImageReader;
use crate::models::{Coordinates, PhotoRecord};
use crate::services::location_log;
use crate::services::photo_store::PhotoStore;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Extension of every stored image file
pub const IMAGE_EXTENSION: &str = "jpeg";

/// Source of the capture timestamp that names image files
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// File name for an image captured at `at`: `{unix millis}.jpeg`
pub fn picture_file_name(at: DateTime<Utc>) -> String {
    format!("{}.{}", at.timestamp_millis(), IMAGE_EXTENSION)
}

// Newest capture time encoded in the stored file names, if any
fn newest_stored_stamp(store: &PhotoStore) -> Option<i64> {
    store
        .current()
        .iter()
        .filter_map(|record| {
            record
                .filepath()
                .strip_suffix(IMAGE_EXTENSION)?
                .strip_suffix('.')?
                .parse::<i64>()
                .ok()
        })
        .max()
}

/// Runs the capture workflow: photo, location, image file, record, log line
pub struct CaptureService {
    camera: Arc<dyn Camera>,
    geolocator: Arc<dyn Geolocator>,
    image_reader: Arc<dyn ImageReader>,
    files: Arc<dyn FileStore>,
    store: Arc<PhotoStore>,
    capture_options: CaptureOptions,
    position_options: PositionOptions,
    clock: Clock,
    last_stamp: AtomicI64,
    // One capture at a time; the store and log updates are read-modify-write
    capture_gate: Mutex<()>,
}

impl CaptureService {
    pub fn new(
        camera: Arc<dyn Camera>,
        geolocator: Arc<dyn Geolocator>,
        image_reader: Arc<dyn ImageReader>,
        files: Arc<dyn FileStore>,
        store: Arc<PhotoStore>,
    ) -> Self {
        // Never reuse a stored file name, even if the clock went backwards
        let last_stamp = newest_stored_stamp(&store).unwrap_or(i64::MIN);
        Self {
            camera,
            geolocator,
            image_reader,
            files,
            store,
            capture_options: CaptureOptions::default(),
            position_options: PositionOptions::default(),
            clock: Arc::new(Utc::now),
            last_stamp: AtomicI64::new(last_stamp),
            capture_gate: Mutex::new(()),
        }
    }

    pub fn with_position_options(mut self, options: PositionOptions) -> Self {
        self.position_options = options;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<PhotoStore> {
        &self.store
    }

    /// Captures a photo, tags it with the current location and stores it
    ///
    /// Fails with [`AppError::Capture`] when no photo was taken and with
    /// [`AppError::Storage`] when the image or the photo list could not be
    /// saved. A missing location fix or a failed log append only produce
    /// warnings.
    pub async fn capture_and_store(&self) -> Result<PhotoRecord, AppError> {
        let _gate = self.capture_gate.lock().await;
        log::debug!("=== capture_and_store called ===");

        let captured = self
            .camera
            .capture_photo(&self.capture_options)
            .await
            .map_err(|e| {
                log::error!("Photo capture failed: {}", e);
                as_capture_error(e)
            })?;

        let location = self.locate().await;

        let file_name = self.save_picture(&captured).await.map_err(|e| {
            log::error!("Saving photo failed: {}", e);
            e
        })?;

        let record = PhotoRecord::new(file_name, captured.web_path.clone(), location);
        self.store.prepend(record.clone()).await?;
        log::info!(
            "Stored photo {} ({} photos total)",
            record.filepath(),
            self.store.len()
        );

        if let Err(e) = location_log::append_entry(self.files.as_ref(), &record).await {
            log::warn!("Location log not updated: {}", e);
        }

        Ok(record)
    }

    async fn locate(&self) -> Option<Coordinates> {
        match self.geolocator.current_position(&self.position_options).await {
            Ok(coords) => {
                log::debug!(
                    "Location: {}, {}",
                    coords.latitude(),
                    coords.longitude()
                );
                Some(coords)
            }
            Err(e) => {
                log::warn!("Could not determine location: {}", e);
                None
            }
        }
    }

    // Capture time, nudged forward if two captures land in the same millisecond
    fn next_stamp(&self) -> DateTime<Utc> {
        let now = (self.clock)();
        let last = self.last_stamp.load(Ordering::SeqCst);
        if now.timestamp_millis() > last {
            self.last_stamp.store(now.timestamp_millis(), Ordering::SeqCst);
            return now;
        }
        let bumped = last + 1;
        self.last_stamp.store(bumped, Ordering::SeqCst);
        DateTime::from_timestamp_millis(bumped).unwrap_or(now)
    }

    async fn save_picture(&self, captured: &CapturedImage) -> Result<String, AppError> {
        let data = self
            .image_reader
            .read_image(captured)
            .await
            .map_err(as_storage_error)?;

        let file_name = picture_file_name(self.next_stamp());
        self.files
            .write_file(&file_name, &data)
            .await
            .map_err(as_storage_error)?;

        log::debug!("Saved {} ({} bytes)", file_name, data.len());
        Ok(file_name)
    }
}

fn as_capture_error(e: AppError) -> AppError {
    match e {
        AppError::Capture(_) => e,
        other => AppError::Capture(other.to_string()),
    }
}

fn as_storage_error(e: AppError) -> AppError {
    match e {
        AppError::Storage(_) => e,
        other => AppError::Storage(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::location_log::LOCATION_LOG_FILE;
    use crate::services::preferences_service::{PreferenceStore, SqlitePreferences};
    use crate::services::photo_store::PHOTO_STORAGE_KEY;
    use crate::test_support::{
        FailingPreferences, FakeCamera, FakeGeolocator, FakeImageReader, MemoryFileStore,
    };
    use chrono::TimeZone;

    struct Harness {
        service: CaptureService,
        files: Arc<MemoryFileStore>,
        prefs: Arc<SqlitePreferences>,
    }

    fn fixed_clock(millis: i64) -> Clock {
        Arc::new(move || Utc.timestamp_millis_opt(millis).unwrap())
    }

    fn ticking_clock(start: i64) -> Clock {
        let next = Arc::new(AtomicI64::new(start));
        Arc::new(move || {
            Utc.timestamp_millis_opt(next.fetch_add(1, Ordering::SeqCst))
                .unwrap()
        })
    }

    fn harness(camera: FakeCamera, position: Option<(f64, f64)>) -> Harness {
        let files = Arc::new(MemoryFileStore::default());
        let prefs = Arc::new(SqlitePreferences::open_in_memory().unwrap());
        let store = Arc::new(PhotoStore::new(prefs.clone()));
        let location = position.and_then(|(lat, lon)| Coordinates::new(lat, lon));
        let service = CaptureService::new(
            Arc::new(camera),
            Arc::new(FakeGeolocator(location)),
            Arc::new(FakeImageReader(b"\xff\xd8jpeg".to_vec())),
            files.clone(),
            store,
        )
        .with_clock(fixed_clock(1_700_000_000_000));
        Harness {
            service,
            files,
            prefs,
        }
    }

    #[test]
    fn test_picture_file_name() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(picture_file_name(at), "1700000000000.jpeg");
    }

    #[tokio::test]
    async fn test_capture_with_location() {
        let h = harness(FakeCamera::working(), Some((40.4168, -3.7038)));

        let record = h.service.capture_and_store().await.unwrap();

        assert_eq!(record.filepath(), "1700000000000.jpeg");
        assert_eq!(record.webview_path(), Some("blob:preview/0"));
        assert_eq!(
            record.maps_link().as_deref(),
            Some("https://www.google.com/maps/@40.4168,-3.7038")
        );
        assert_eq!(h.files.get("1700000000000.jpeg").unwrap(), b"\xff\xd8jpeg");
        assert_eq!(
            h.files.text(LOCATION_LOG_FILE).unwrap(),
            "Foto: 1700000000000.jpeg, Latitud: 40.4168, Longitud: -3.7038, Link: https://www.google.com/maps/@40.4168,-3.7038\n"
        );
    }

    #[tokio::test]
    async fn test_capture_adds_exactly_one_record_at_front() {
        let h = harness(FakeCamera::working(), None);
        let service = h.service.with_clock(ticking_clock(100));

        service.capture_and_store().await.unwrap();
        let before = service.store().len();
        let record = service.capture_and_store().await.unwrap();

        let current = service.store().current();
        assert_eq!(current.len(), before + 1);
        assert_eq!(current[0], record);
        assert_eq!(current[1].filepath(), "100.jpeg");
    }

    #[tokio::test]
    async fn test_same_millisecond_captures_get_distinct_files() {
        let h = harness(FakeCamera::working(), None);

        let first = h.service.capture_and_store().await.unwrap();
        let second = h.service.capture_and_store().await.unwrap();

        assert_eq!(first.filepath(), "1700000000000.jpeg");
        assert_eq!(second.filepath(), "1700000000001.jpeg");
        assert!(h.files.get("1700000000001.jpeg").is_some());
    }

    #[tokio::test]
    async fn test_clock_behind_stored_photos_does_not_overwrite() {
        let files = Arc::new(MemoryFileStore::default());
        files.insert("1700000000500.jpeg", b"earlier");
        let prefs = Arc::new(SqlitePreferences::open_in_memory().unwrap());
        prefs
            .set(
                PHOTO_STORAGE_KEY,
                r#"[{"filepath":"1700000000500.jpeg"},{"filepath":"imported.jpeg"}]"#,
            )
            .await
            .unwrap();
        let store = Arc::new(PhotoStore::new(prefs));
        store.load().await.unwrap();

        let service = CaptureService::new(
            Arc::new(FakeCamera::working()),
            Arc::new(FakeGeolocator(None)),
            Arc::new(FakeImageReader(b"new".to_vec())),
            files.clone(),
            store,
        )
        .with_clock(fixed_clock(1_700_000_000_000));

        let record = service.capture_and_store().await.unwrap();

        assert_eq!(record.filepath(), "1700000000501.jpeg");
        assert_eq!(files.get("1700000000500.jpeg").unwrap(), b"earlier");
        assert_eq!(files.get("1700000000501.jpeg").unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_capture_without_location_still_succeeds() {
        let h = harness(FakeCamera::working(), None);

        let record = h.service.capture_and_store().await.unwrap();

        assert!(record.latitude().is_none());
        assert!(record.longitude().is_none());
        assert!(record.maps_link().is_none());
        assert_eq!(
            h.files.text(LOCATION_LOG_FILE).unwrap(),
            "Foto: 1700000000000.jpeg, Latitud: undefined, Longitud: undefined, Link: undefined\n"
        );
    }

    #[tokio::test]
    async fn test_camera_failure_creates_nothing() {
        let h = harness(FakeCamera::denied(), Some((1.0, 2.0)));

        let result = h.service.capture_and_store().await;

        assert!(matches!(result, Err(AppError::Capture(_))));
        assert!(h.service.store().is_empty());
        assert!(h.files.names().is_empty());
        assert_eq!(h.prefs.get(PHOTO_STORAGE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_image_write_failure_adds_no_record_and_no_log_line() {
        let h = harness(FakeCamera::working(), Some((1.0, 2.0)));
        h.files.fail_writes_ending_with(".jpeg");

        let result = h.service.capture_and_store().await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(h.service.store().is_empty());
        assert!(h.files.get(LOCATION_LOG_FILE).is_none());
        assert_eq!(h.prefs.get(PHOTO_STORAGE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_metadata_persist_failure_orphans_image() {
        let files = Arc::new(MemoryFileStore::default());
        let store = Arc::new(PhotoStore::new(Arc::new(FailingPreferences)));
        let service = CaptureService::new(
            Arc::new(FakeCamera::working()),
            Arc::new(FakeGeolocator(None)),
            Arc::new(FakeImageReader(b"img".to_vec())),
            files.clone(),
            store.clone(),
        )
        .with_clock(fixed_clock(5));

        let result = service.capture_and_store().await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(store.is_empty());
        assert_eq!(files.get("5.jpeg").unwrap(), b"img");
        assert!(files.get(LOCATION_LOG_FILE).is_none());
    }

    #[tokio::test]
    async fn test_log_append_failure_does_not_fail_capture() {
        let h = harness(FakeCamera::working(), Some((1.0, 2.0)));
        h.files.fail_writes_of(LOCATION_LOG_FILE);

        let record = h.service.capture_and_store().await.unwrap();

        assert_eq!(h.service.store().current()[0], record);
        assert!(h.prefs.get(PHOTO_STORAGE_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_capture_notifies_subscribers() {
        let h = harness(FakeCamera::working(), None);
        let mut rx = h.service.store().subscribe();

        let record = h.service.capture_and_store().await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow()[0], record);
    }

    #[tokio::test]
    async fn test_concurrent_captures_are_serialized() {
        let h = harness(FakeCamera::working(), Some((1.0, 2.0)));
        let service = h.service.with_clock(ticking_clock(1_000));

        let (a, b) = tokio::join!(service.capture_and_store(), service.capture_and_store());
        a.unwrap();
        b.unwrap();

        assert_eq!(service.store().len(), 2);
        let log = h.files.text(LOCATION_LOG_FILE).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        // Log is chronological, the collection newest first
        assert!(lines[0].starts_with("Foto: 1000.jpeg,"));
        assert!(lines[1].starts_with("Foto: 1001.jpeg,"));
        assert_eq!(service.store().current()[0].filepath(), "1001.jpeg");

        let reloaded = PhotoStore::new(h.prefs.clone());
        reloaded.load().await.unwrap();
        assert_eq!(reloaded.len(), 2);
    }
}
