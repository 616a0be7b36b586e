// Location fixes through the host activity.

use crate::{AndroidBridgeConfig, BridgeError};

/// A raw position as reported by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// Parse the host's `"lat,lon"` answer
pub fn parse_position(raw: &str) -> Result<Position, BridgeError> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| BridgeError::InvalidResponse(format!("expected 'lat,lon', got '{}'", raw)))?;

    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| BridgeError::InvalidResponse(format!("bad coordinate '{}': {}", s, e)))
    };

    Ok(Position {
        latitude: parse(lat)?,
        longitude: parse(lon)?,
    })
}

/// Request the current position
pub fn current_position(high_accuracy: bool) -> Result<Position, BridgeError> {
    current_position_with_config(&AndroidBridgeConfig::default(), high_accuracy)
}

/// Request the current position with custom Android configuration
///
/// Blocks until the host reports a fix, an error, or the configured timeout passes.
#[cfg(target_os = "android")]
pub fn current_position_with_config(
    config: &AndroidBridgeConfig,
    high_accuracy: bool,
) -> Result<Position, BridgeError> {
    use crate::activity;
    use jni::objects::JValue;

    activity::with_env(|env| {
        let (activity_obj, main_cls) = activity::get_activity_instance(env, config)?;
        activity::clear_last_error(env, &main_cls)?;

        env.call_method(
            &activity_obj,
            "requestLocation",
            "(Z)V",
            &[JValue::Bool(high_accuracy as u8)],
        )
        .map_err(|e| BridgeError::Other(format!("requestLocation failed: {}", e)))?;

        let raw = activity::poll_result(
            env,
            &main_cls,
            "getLastLocation",
            config.location_timeout,
            "Location",
        )?;
        parse_position(&raw)
    })
}

#[cfg(not(target_os = "android"))]
pub fn current_position_with_config(
    _config: &AndroidBridgeConfig,
    _high_accuracy: bool,
) -> Result<Position, BridgeError> {
    Err(BridgeError::PlatformNotSupported(
        "Location not available on this platform".to_string(),
    ))
}
