use std::fmt;

/// Central error types for the geofoto app
#[derive(Debug)]
pub enum AppError {
    /// Camera denied, cancelled or unavailable
    Capture(String),
    /// Location fix unavailable, denied or timed out
    Geolocation(String),
    /// Image bytes or photo metadata could not be stored
    Storage(String),
    /// Location log could not be updated
    LogAppend(String),
    /// Stored photo metadata could not be parsed
    Deserialization(serde_json::Error),
    /// Database error (rusqlite)
    Database(rusqlite::Error),
    /// Filesystem error
    Filesystem(std::io::Error),
    /// Resource not found (e.g. a file that was never written)
    NotFound(String),
    /// Invalid configuration
    Config(String),
    /// General error
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Capture(msg) => write!(f, "Capture error: {}", msg),
            AppError::Geolocation(msg) => write!(f, "Geolocation error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::LogAppend(msg) => write!(f, "Location log error: {}", msg),
            AppError::Deserialization(e) => write!(f, "Deserialization error: {}", e),
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Deserialization(e) => Some(e),
            AppError::Database(e) => Some(e),
            AppError::Filesystem(e) => Some(e),
            _ => None,
        }
    }
}

// Conversions from other error types
impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Deserialization(e)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl AppError {
    /// True for errors that stop a capture; everything else is recovered locally
    pub fn is_fatal_to_capture(&self) -> bool {
        matches!(self, AppError::Capture(_) | AppError::Storage(_))
    }

    /// User-friendly error message for the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            AppError::Capture(_) => "No photo was taken. Please check camera permissions.".to_string(),
            AppError::Geolocation(_) => "The current location could not be determined.".to_string(),
            AppError::Storage(_) => "The photo could not be saved. Please try again.".to_string(),
            AppError::LogAppend(_) => "The location log could not be updated.".to_string(),
            AppError::Deserialization(_) => "Saved photos could not be read.".to_string(),
            AppError::Database(_) => "A database error occurred. Please try again.".to_string(),
            AppError::Filesystem(_) => {
                "Error accessing files. Please check app permissions.".to_string()
            }
            AppError::NotFound(msg) => format!("{} was not found.", msg),
            AppError::Config(msg) => format!("Invalid configuration: {}", msg),
            AppError::Other(msg) => msg.clone(),
        }
    }
}
