// Camera capture through the host activity.

use crate::{AndroidBridgeConfig, BridgeError};
use std::path::PathBuf;

/// Capture a photo using the camera
///
/// On Android, this launches the camera app and waits for the user to take a photo.
/// Returns the absolute path to the captured image.
pub fn capture_photo() -> Result<PathBuf, BridgeError> {
    capture_photo_with_config(&AndroidBridgeConfig::default())
}

/// Capture a photo using the camera with custom Android configuration
#[cfg(target_os = "android")]
pub fn capture_photo_with_config(config: &AndroidBridgeConfig) -> Result<PathBuf, BridgeError> {
    use crate::activity;

    activity::with_env(|env| {
        let (activity_obj, main_cls) = activity::get_activity_instance(env, config)?;
        activity::clear_last_error(env, &main_cls)?;

        env.call_method(&activity_obj, "launchCamera", "()V", &[])
            .map_err(|e| BridgeError::Other(format!("launchCamera failed: {}", e)))?;

        let path = activity::poll_result(
            env,
            &main_cls,
            "getLastPhotoPath",
            config.camera_timeout,
            "Camera",
        )?;
        log::debug!("Camera returned {}", path);
        Ok(PathBuf::from(path))
    })
}

#[cfg(not(target_os = "android"))]
pub fn capture_photo_with_config(_config: &AndroidBridgeConfig) -> Result<PathBuf, BridgeError> {
    Err(BridgeError::PlatformNotSupported(
        "Camera not available on this platform".to_string(),
    ))
}

/// Check if camera permission is granted
#[cfg(target_os = "android")]
pub fn has_camera_permission(config: &AndroidBridgeConfig) -> Result<bool, BridgeError> {
    use crate::activity;

    activity::with_env(|env| {
        let (activity_obj, _cls) = activity::get_activity_instance(env, config)?;
        env.call_method(&activity_obj, "hasCameraPermission", "()Z", &[])
            .and_then(|v| v.z())
            .map_err(|e| BridgeError::Other(format!("hasCameraPermission failed: {}", e)))
    })
}

#[cfg(not(target_os = "android"))]
pub fn has_camera_permission(_config: &AndroidBridgeConfig) -> Result<bool, BridgeError> {
    Ok(false)
}
