use crate::error::AppError;
use crate::models::Coordinates;
use async_trait::async_trait;
use device_bridge::AndroidBridgeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
        }
    }
}

#[async_trait]
pub trait Geolocator: Send + Sync {
    /// Fails with [`AppError::Geolocation`] when no fix is available
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, AppError>;
}

/// Location provider of the device the app runs on
#[derive(Debug, Clone, Default)]
pub struct DeviceGeolocator {
    config: AndroidBridgeConfig,
}

impl DeviceGeolocator {
    pub fn new(config: AndroidBridgeConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Geolocator for DeviceGeolocator {
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, AppError> {
        let config = self.config.clone();
        let high_accuracy = options.enable_high_accuracy;
        let position = tokio::task::spawn_blocking(move || {
            device_bridge::current_position_with_config(&config, high_accuracy)
        })
        .await
        .map_err(|e| AppError::Geolocation(format!("location task failed: {}", e)))?
        .map_err(|e| AppError::Geolocation(e.to_string()))?;

        Coordinates::new(position.latitude, position.longitude).ok_or_else(|| {
            AppError::Geolocation(format!(
                "position out of range: {},{}",
                position.latitude, position.longitude
            ))
        })
    }
}
