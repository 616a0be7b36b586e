//! # Device Bridge
//!
//! Camera and location access for the geofoto app.
//!
//! On Android every call goes through JNI into the host `MainActivity`, which
//! launches the system camera or requests a location fix and exposes the
//! outcome through static getters that are polled from Rust. On every other
//! platform the calls return [`BridgeError::PlatformNotSupported`].
//!
//! All functions block the calling thread while polling. Async callers should
//! run them on a blocking thread (e.g. `tokio::task::spawn_blocking`).
//!
//! ## Host contract
//!
//! The activity class must provide:
//! - `static getInstance()` (or an `instance` field / `Companion.getInstance()`)
//! - `launchCamera()`, `hasCameraPermission()`
//! - `requestLocation(boolean highAccuracy)`
//! - `static getLastPhotoPath()`, `static getLastLocation()` (`"lat,lon"`)
//! - `static getLastError()`, `static clearLastError()`

#[cfg(target_os = "android")]
mod activity;
pub mod camera;
pub mod location;

use std::time::Duration;

pub use camera::{capture_photo, capture_photo_with_config, has_camera_permission};
pub use location::{current_position, current_position_with_config, parse_position, Position};

/// Activity class used when the host app does not override it
pub const DEFAULT_MAIN_ACTIVITY_CLASS: &str = "dev/dioxus/main/MainActivity";

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeError {
    PermissionDenied(String),
    Timeout(String),
    Cancelled(String),
    PlatformNotSupported(String),
    InvalidResponse(String),
    Other(String),
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            BridgeError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            BridgeError::Cancelled(msg) => write!(f, "Cancelled: {}", msg),
            BridgeError::PlatformNotSupported(msg) => write!(f, "Platform not supported: {}", msg),
            BridgeError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            BridgeError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BridgeError {}

impl BridgeError {
    /// Classify an error string reported by the host activity
    pub fn from_host_message(message: String) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("cancel") {
            BridgeError::Cancelled(message)
        } else if lower.contains("permission") || lower.contains("denied") {
            BridgeError::PermissionDenied(message)
        } else {
            BridgeError::Other(message)
        }
    }
}

/// Configuration for the Android host activity
#[derive(Debug, Clone)]
pub struct AndroidBridgeConfig {
    /// Fully qualified class name in slash format (e.g., "com/example/myapp/MainActivity")
    pub main_activity_class: String,
    /// How long to wait for the user to take a photo
    pub camera_timeout: Duration,
    /// How long to wait for a location fix
    pub location_timeout: Duration,
}

impl Default for AndroidBridgeConfig {
    fn default() -> Self {
        Self {
            main_activity_class: DEFAULT_MAIN_ACTIVITY_CLASS.to_string(),
            camera_timeout: Duration::from_secs(60),
            location_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_message_classification() {
        assert!(matches!(
            BridgeError::from_host_message("User cancelled".to_string()),
            BridgeError::Cancelled(_)
        ));
        assert!(matches!(
            BridgeError::from_host_message("Camera permission denied".to_string()),
            BridgeError::PermissionDenied(_)
        ));
        assert!(matches!(
            BridgeError::from_host_message("provider unavailable".to_string()),
            BridgeError::Other(_)
        ));
    }

    #[test]
    fn test_default_config() {
        let config = AndroidBridgeConfig::default();
        assert_eq!(config.main_activity_class, DEFAULT_MAIN_ACTIVITY_CLASS);
        assert_eq!(config.camera_timeout, Duration::from_secs(60));
    }
}
