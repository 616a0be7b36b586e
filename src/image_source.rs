// Reading the bytes behind a captured image reference.
//
// Native platforms hand back a file path, browsers a `data:` URL. The reader
// is chosen once from the configured platform instead of branching inline.

use crate::camera::CapturedImage;
use crate::config::Platform;
use crate::error::AppError;
use async_trait::async_trait;
use base64::Engine;
use std::sync::Arc;

#[async_trait]
pub trait ImageReader: Send + Sync {
    async fn read_image(&self, image: &CapturedImage) -> Result<Vec<u8>, AppError>;
}

/// Reads the file the camera wrote
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeImageReader;

#[async_trait]
impl ImageReader for NativeImageReader {
    async fn read_image(&self, image: &CapturedImage) -> Result<Vec<u8>, AppError> {
        let path = image
            .path
            .as_ref()
            .ok_or_else(|| AppError::Storage("captured image has no file path".to_string()))?;
        tokio::fs::read(path).await.map_err(|e| {
            AppError::Storage(format!("reading {} failed: {}", path.display(), e))
        })
    }
}

/// Decodes the `data:` URL a browser camera returns
#[derive(Debug, Clone, Copy, Default)]
pub struct WebImageReader;

#[async_trait]
impl ImageReader for WebImageReader {
    async fn read_image(&self, image: &CapturedImage) -> Result<Vec<u8>, AppError> {
        let web_path = image
            .web_path
            .as_deref()
            .ok_or_else(|| AppError::Storage("captured image has no web path".to_string()))?;
        let (_mime, data) = decode_data_url(web_path)?;
        Ok(data)
    }
}

/// Splits a base64 `data:` URL into its MIME type and decoded bytes
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), AppError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| AppError::Storage("web path is not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::Storage("data URL has no payload".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| AppError::Storage("data URL is not base64 encoded".to_string()))?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AppError::Storage(format!("invalid base64 image data: {}", e)))?;
    Ok((mime.to_string(), data))
}

/// Reader matching the platform the app was configured for
pub fn image_reader_for(platform: Platform) -> Arc<dyn ImageReader> {
    match platform {
        Platform::Native => Arc::new(NativeImageReader),
        Platform::Web => Arc::new(WebImageReader),
    }
}
