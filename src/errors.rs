// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the depth pipeline

use std::fmt;

/// Result type alias using CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Main pipeline error type
#[derive(Debug, Clone)]
pub enum CoreError {
    /// Device enumeration errors
    Catalog(CatalogError),
    /// Session lifecycle errors
    Session(SessionError),
    /// Sensor-layer errors on the per-tick path
    Sensor(SensorError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Device enumeration errors
#[derive(Debug, Clone)]
pub enum CatalogError {
    /// No depth devices attached
    NoDevices,
    /// Enumeration query against the sensor layer failed
    QueryFailed(String),
}

/// Session lifecycle errors
///
/// All variants are recoverable: the session is left stopped and a later
/// tick may retry with the same or a different device.
#[derive(Debug, Clone)]
pub enum SessionError {
    /// Requested device id absent from the current enumeration
    DeviceNotFound(String),
    /// Stream start against the sensor layer failed
    StartFailed(String),
    /// Stream stop failed (device detached, etc.)
    StopFailed(String),
    /// Selected device exposes no depth-capable sensor
    NoDepthSensor(String),
}

/// Sensor-layer errors during poll or conversion
///
/// Per-tick failures; callers log these and produce no output for the tick.
#[derive(Debug, Clone)]
pub enum SensorError {
    /// Frame poll failed
    PollFailed(String),
    /// Device detached during streaming
    Disconnected,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Catalog(e) => write!(f, "Catalog error: {}", e),
            CoreError::Session(e) => write!(f, "Session error: {}", e),
            CoreError::Sensor(e) => write!(f, "Sensor error: {}", e),
            CoreError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CoreError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::NoDevices => write!(f, "No depth devices detected"),
            CatalogError::QueryFailed(msg) => write!(f, "Device enumeration failed: {}", msg),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::DeviceNotFound(id) => write!(f, "Device not found: {}", id),
            SessionError::StartFailed(msg) => write!(f, "Failed to start stream: {}", msg),
            SessionError::StopFailed(msg) => write!(f, "Failed to stop stream: {}", msg),
            SessionError::NoDepthSensor(id) => {
                write!(f, "No depth-capable sensor on device: {}", id)
            }
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::PollFailed(msg) => write!(f, "Frame poll failed: {}", msg),
            SensorError::Disconnected => write!(f, "Device disconnected"),
        }
    }
}

impl std::error::Error for CoreError {}
impl std::error::Error for CatalogError {}
impl std::error::Error for SessionError {}
impl std::error::Error for SensorError {}

// Conversions from sub-errors to CoreError
impl From<CatalogError> for CoreError {
    fn from(err: CatalogError) -> Self {
        CoreError::Catalog(err)
    }
}

impl From<SessionError> for CoreError {
    fn from(err: SessionError) -> Self {
        CoreError::Session(err)
    }
}

impl From<SensorError> for CoreError {
    fn from(err: SensorError) -> Self {
        CoreError::Sensor(err)
    }
}

impl From<String> for CoreError {
    fn from(msg: String) -> Self {
        CoreError::Other(msg)
    }
}

impl From<&str> for CoreError {
    fn from(msg: &str) -> Self {
        CoreError::Other(msg.to_string())
    }
}
