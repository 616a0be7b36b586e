pub mod capture_service;
pub mod location_log;
pub mod photo_store;
pub mod preferences_service;

pub use capture_service::{CaptureService, Clock, IMAGE_EXTENSION};
pub use photo_store::{PhotoSnapshot, PhotoStore, PHOTO_STORAGE_KEY};
pub use preferences_service::{PreferenceStore, SqlitePreferences};
