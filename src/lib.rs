//! geofoto: take photos, tag them with the device location and keep a
//! plain-text log of where each one was taken.
//!
//! The device capabilities (camera, geolocation, file storage, preferences,
//! downloads) sit behind the traits in [`camera`], [`geolocation`],
//! [`image_source`], [`filesystem`] and [`services::preferences_service`].
//! [`GeoFotoApp`] wires them to the photo store and the capture workflow.

pub mod app;
pub mod camera;
pub mod config;
pub mod database;
pub mod error;
pub mod filesystem;
pub mod geolocation;
pub mod image_source;
pub mod models;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use app::{Adapters, GeoFotoApp};
pub use config::{AppConfig, Platform};
pub use error::AppError;
pub use models::{Coordinates, PhotoRecord};
