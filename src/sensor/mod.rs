// SPDX-License-Identifier: GPL-3.0-only

//! Sensor-layer abstraction
//!
//! This module provides a trait-based abstraction over the depth sensor
//! access library, so the session manager and the tick pipeline never talk
//! to device APIs directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │    DepthPipeline    │  ← tick driver
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │   SessionManager    │  ← lifecycle, calibration
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  SensorLayer trait  │  ← common interface
//! └─────┬─────────┬─────┘
//!       │         │
//!       ▼         ▼
//! ┌─────────┐ ┌───────────┐
//! │RealSense│ │ Simulated │
//! └─────────┘ └───────────┘
//! ```
//!
//! All failure signaling at this boundary is `Result`-typed; nothing below
//! it is allowed to panic its way through the tick loop.

pub mod simulated;
pub mod types;

#[cfg(feature = "realsense")]
pub mod realsense;

pub use simulated::{SensorEvent, SimulatedSensor};
pub use types::*;

#[cfg(feature = "realsense")]
pub use realsense::RealSenseLayer;

use crate::config::StreamConfig;
use crate::errors::{CatalogError, SensorError, SessionError};

/// Complete sensor-layer trait
///
/// All device backends implement this trait to provide:
/// - Device enumeration
/// - Stream lifecycle (start, stop)
/// - Calibration queries (depth scale, stream intrinsics)
/// - Non-blocking frame retrieval
pub trait SensorLayer: Send {
    // ===== Enumeration =====

    /// Take a fresh snapshot of attached devices
    ///
    /// May legitimately return an empty list; mapping that to an error is
    /// the catalog's concern.
    fn enumerate(&mut self) -> Result<Vec<SensorDevice>, CatalogError>;

    // ===== Stream lifecycle =====

    /// Start a depth stream against the device with the given serial
    ///
    /// Any previously running stream must be stopped first; backends do not
    /// multiplex streams.
    fn start_stream(&mut self, serial: &str, config: &StreamConfig) -> Result<(), SessionError>;

    /// Stop the active stream
    ///
    /// Safe to call when no stream is running.
    fn stop_stream(&mut self) -> Result<(), SessionError>;

    /// Whether a stream is currently running
    fn is_streaming(&self) -> bool;

    // ===== Calibration =====

    /// Depth scale of the streaming device, meters per raw depth unit
    ///
    /// Queried once per stream start. Fails when none of the device's
    /// sensors is depth-capable.
    fn depth_scale(&self) -> Result<f32, SessionError>;

    /// Pinhole intrinsics of the active depth stream
    fn intrinsics(&self) -> Result<DepthIntrinsics, SessionError>;

    // ===== Frames =====

    /// Poll for the next queued depth frame without blocking
    ///
    /// Returns `Ok(None)` immediately when no frame is queued; a miss is
    /// not an error.
    fn poll_frame(&mut self) -> Result<Option<RawDepthFrame>, SensorError>;
}
