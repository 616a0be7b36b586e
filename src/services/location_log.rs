// Plain-text location log: one line per photo.
//
// The log file in app storage grows by one line per capture (oldest first).
// Exports render the whole collection in its current order (newest first).

use crate::error::AppError;
use crate::filesystem::{DownloadSink, FileStore};
use crate::models::{format_coordinate, PhotoRecord};

/// Name of the log file in app storage and of the exported download
pub const LOCATION_LOG_FILE: &str = "photo_locations.txt";

/// Printed in place of a missing latitude, longitude or link
pub const MISSING_PLACEHOLDER: &str = "undefined";

/// Formats one record as a terminated log line
///
/// `Foto: <file>, Latitud: <lat>, Longitud: <lon>, Link: <link>`
pub fn render_line(record: &PhotoRecord) -> String {
    let or_missing =
        |value: Option<String>| value.unwrap_or_else(|| MISSING_PLACEHOLDER.to_string());
    format!(
        "Foto: {}, Latitud: {}, Longitud: {}, Link: {}\n",
        record.filepath(),
        or_missing(record.latitude().map(format_coordinate)),
        or_missing(record.longitude().map(format_coordinate)),
        or_missing(record.maps_link()),
    )
}

/// Formats all records, in the order given
pub fn render_all(records: &[PhotoRecord]) -> String {
    records.iter().map(render_line).collect()
}

/// Appends the line for `record` to the log file, creating it if needed
///
/// This is a read-then-write; callers serialize appends (the capture service
/// holds its capture gate while appending).
pub async fn append_entry(files: &dyn FileStore, record: &PhotoRecord) -> Result<(), AppError> {
    let line = render_line(record);

    let mut content = match files.read_file(LOCATION_LOG_FILE).await {
        Ok(existing) => existing,
        Err(AppError::NotFound(_)) => {
            log::debug!("Creating {}", LOCATION_LOG_FILE);
            Vec::new()
        }
        Err(e) => {
            return Err(AppError::LogAppend(format!(
                "reading {} failed: {}",
                LOCATION_LOG_FILE, e
            )))
        }
    };
    content.extend_from_slice(line.as_bytes());

    files
        .write_file(LOCATION_LOG_FILE, &content)
        .await
        .map_err(|e| AppError::LogAppend(format!("writing {} failed: {}", LOCATION_LOG_FILE, e)))
}

/// Regenerates the log file from the collection (given newest first)
///
/// The collection is authoritative; the log is a projection of it in
/// capture order.
pub async fn rebuild(files: &dyn FileStore, records: &[PhotoRecord]) -> Result<usize, AppError> {
    let chronological: Vec<PhotoRecord> = records.iter().rev().cloned().collect();
    files
        .write_file(LOCATION_LOG_FILE, render_all(&chronological).as_bytes())
        .await
        .map_err(|e| AppError::LogAppend(format!("rebuilding {} failed: {}", LOCATION_LOG_FILE, e)))?;
    log::info!("Rebuilt {} with {} entries", LOCATION_LOG_FILE, records.len());
    Ok(records.len())
}

/// Hands the whole collection, as rendered text, to the download sink
pub fn export(records: &[PhotoRecord], sink: &dyn DownloadSink) {
    let content = render_all(records);
    log::debug!("Exporting {} location entries", records.len());
    sink.trigger_download(content.as_bytes(), LOCATION_LOG_FILE);
}
