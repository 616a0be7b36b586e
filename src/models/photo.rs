use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Base of the map link attached to geotagged photos
pub const MAPS_BASE_URL: &str = "https://www.google.com/maps/@";

/// Renders a coordinate the way the map link and the location log print it
///
/// Shortest round-trip decimal, with `-0` printed as `0` and magnitudes
/// below `1e-6` in exponent form (`1e-7`).
pub fn format_coordinate(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.abs() < 1e-6 {
        format!("{:e}", value)
    } else {
        value.to_string()
    }
}

/// A valid latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Returns `None` for non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Map URL centered on these coordinates
    pub fn maps_link(&self) -> String {
        format!(
            "{}{},{}",
            MAPS_BASE_URL,
            format_coordinate(self.latitude),
            format_coordinate(self.longitude)
        )
    }
}

/// Metadata of one captured photo
///
/// Coordinates are stored as a single optional pair, so a record either has
/// both latitude and longitude or neither. The map link is always derived
/// from them and never stored independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredPhoto", into = "StoredPhoto")]
pub struct PhotoRecord {
    filepath: String,
    webview_path: Option<String>,
    location: Option<Coordinates>,
}

impl PhotoRecord {
    pub fn new(
        filepath: impl Into<String>,
        webview_path: Option<String>,
        location: Option<Coordinates>,
    ) -> Self {
        Self {
            filepath: filepath.into(),
            webview_path,
            location,
        }
    }

    /// File name of the stored image bytes
    pub fn filepath(&self) -> &str {
        &self.filepath
    }

    /// Transient preview reference (may be stale after a restart)
    pub fn webview_path(&self) -> Option<&str> {
        self.webview_path.as_deref()
    }

    pub fn location(&self) -> Option<Coordinates> {
        self.location
    }

    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|c| c.latitude())
    }

    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|c| c.longitude())
    }

    pub fn maps_link(&self) -> Option<String> {
        self.location.map(|c| c.maps_link())
    }
}

/// Persisted shape of a [`PhotoRecord`]
///
/// Field names match the blob written by earlier app versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPhoto {
    filepath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    webview_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    maps_link: Option<String>,
}

impl From<PhotoRecord> for StoredPhoto {
    fn from(record: PhotoRecord) -> Self {
        let maps_link = record.maps_link();
        Self {
            latitude: record.latitude(),
            longitude: record.longitude(),
            maps_link,
            filepath: record.filepath,
            webview_path: record.webview_path,
        }
    }
}

impl From<StoredPhoto> for PhotoRecord {
    fn from(stored: StoredPhoto) -> Self {
        let location = match (stored.latitude, stored.longitude) {
            (Some(lat), Some(lon)) => {
                let location = Coordinates::new(lat, lon);
                if location.is_none() {
                    log::warn!(
                        "Photo {} has invalid coordinates {},{}, dropping location",
                        stored.filepath,
                        lat,
                        lon
                    );
                }
                location
            }
            (None, None) => None,
            _ => {
                log::warn!(
                    "Photo {} has only one coordinate, dropping location",
                    stored.filepath
                );
                None
            }
        };
        Self {
            filepath: stored.filepath,
            webview_path: stored.webview_path,
            location,
        }
    }
}

/// Serializes a photo collection into the stored blob
pub fn encode_collection(records: &[PhotoRecord]) -> Result<String, AppError> {
    Ok(serde_json::to_string(records)?)
}

/// Parses a stored blob back into a photo collection
pub fn decode_collection(blob: &str) -> Result<Vec<PhotoRecord>, AppError> {
    Ok(serde_json::from_str(blob)?)
}
