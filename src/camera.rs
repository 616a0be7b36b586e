// Camera capability: the trait the capture workflow depends on, and the
// device-backed implementation on top of device-bridge.

use crate::error::AppError;
use async_trait::async_trait;
use device_bridge::{AndroidBridgeConfig, BridgeError};
use std::path::PathBuf;

/// How the camera hands back the captured image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    /// A reference (file path / web path) to the image data
    Uri,
    /// Inline base64 data
    Base64,
}

/// Where the image comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraSource {
    Camera,
    Photos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    pub result_type: ResultType,
    pub source: CameraSource,
    /// JPEG quality, 0-100
    pub quality: u8,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            result_type: ResultType::Uri,
            source: CameraSource::Camera,
            quality: 100,
        }
    }
}

/// Reference to a freshly captured image
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    /// Native file path, if the platform has one
    pub path: Option<PathBuf>,
    /// Reference usable for immediate display (file URI or data URL)
    pub web_path: Option<String>,
    /// Image format reported by the camera, e.g. "jpeg"
    pub format: String,
}

#[async_trait]
pub trait Camera: Send + Sync {
    /// Fails with [`AppError::Capture`] if the user cancels or access is denied
    async fn capture_photo(&self, options: &CaptureOptions) -> Result<CapturedImage, AppError>;
}

// Every bridge failure during capture means "no photo"
fn bridge_error_to_app_error(e: BridgeError) -> AppError {
    match e {
        BridgeError::Cancelled(msg) => AppError::Capture(format!("cancelled: {}", msg)),
        BridgeError::PermissionDenied(msg) => AppError::Capture(format!("denied: {}", msg)),
        other => AppError::Capture(other.to_string()),
    }
}

/// Camera of the device the app runs on
#[derive(Debug, Clone, Default)]
pub struct DeviceCamera {
    config: AndroidBridgeConfig,
}

impl DeviceCamera {
    pub fn new(config: AndroidBridgeConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Camera for DeviceCamera {
    async fn capture_photo(&self, options: &CaptureOptions) -> Result<CapturedImage, AppError> {
        if options.source != CameraSource::Camera {
            return Err(AppError::Capture(
                "only the camera source is supported on this device".to_string(),
            ));
        }

        let config = self.config.clone();
        let path = tokio::task::spawn_blocking(move || {
            device_bridge::capture_photo_with_config(&config)
        })
        .await
        .map_err(|e| AppError::Capture(format!("camera task failed: {}", e)))?
        .map_err(bridge_error_to_app_error)?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "jpeg".to_string());

        Ok(CapturedImage {
            web_path: Some(format!("file://{}", path.display())),
            path: Some(path),
            format,
        })
    }
}
