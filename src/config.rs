use crate::error::AppError;
use crate::filesystem::{get_app_data_dir, get_export_base_dir};
use device_bridge::{AndroidBridgeConfig, DEFAULT_MAIN_ACTIVITY_CLASS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which image read path the host provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Camera returns a file path (Android, desktop)
    #[default]
    Native,
    /// Camera returns a `data:` URL (browser)
    Web,
}

/// Runtime configuration for the app
///
/// Every field has a platform default, so a TOML file only needs the keys it
/// wants to change:
///
/// ```toml
/// data_dir = "/var/lib/geofoto"
/// platform = "web"
/// high_accuracy = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// App-private storage for images and the location log
    pub data_dir: PathBuf,
    /// Target directory of exports
    pub export_dir: PathBuf,
    /// SQLite file (relative to `data_dir`) holding the preferences
    pub database_file: String,
    pub platform: Platform,
    /// Ask the location provider for a high-accuracy fix
    pub high_accuracy: bool,
    /// Host activity for camera and location calls on Android
    pub android_activity_class: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: get_app_data_dir(),
            export_dir: get_export_base_dir(),
            database_file: "geofoto.db".to_string(),
            platform: Platform::default(),
            high_accuracy: true,
            android_activity_class: DEFAULT_MAIN_ACTIVITY_CLASS.to_string(),
        }
    }
}

impl AppConfig {
    /// Load config from a TOML file; a missing file or no path yields defaults
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.database_file.trim().is_empty() {
            return Err(AppError::Config("database_file must not be empty".to_string()));
        }
        if self.android_activity_class.contains('.') {
            return Err(AppError::Config(
                "android_activity_class uses slash format, e.g. com/example/MainActivity"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn bridge_config(&self) -> AndroidBridgeConfig {
        AndroidBridgeConfig {
            main_activity_class: self.android_activity_class.clone(),
            ..AndroidBridgeConfig::default()
        }
    }
}
