// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for sensor backends

use serde::{Deserialize, Serialize};

/// Identifier prefix for enumerated devices
pub const DEVICE_ID_PREFIX: &str = "Sensor";

/// A depth device visible in one enumeration snapshot
///
/// The identifier is the prefix plus the hardware serial number, so it is
/// stable across repeated enumerations while the attached hardware set is
/// unchanged. Descriptors are immutable; re-enumeration may yield a
/// different set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorDevice {
    /// Stable identifier: prefix + hardware serial number
    pub id: String,
    /// Hardware serial number
    pub serial: String,
    /// Human-readable model name
    pub model: String,
}

impl SensorDevice {
    /// Build a descriptor from a hardware serial number
    pub fn from_serial(serial: impl Into<String>, model: impl Into<String>) -> Self {
        let serial = serial.into();
        Self {
            id: format!("{DEVICE_ID_PREFIX}{serial}"),
            serial,
            model: model.into(),
        }
    }
}

/// One sensor-captured grid of per-pixel distance samples in raw integer
/// units
///
/// Row-major in the sensor's native row order. A frame is owned for the
/// duration of one conversion call and not retained across ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDepthFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// One value per pixel, row-major
    pub samples: Vec<u16>,
}

impl RawDepthFrame {
    /// Create a frame from raw samples
    pub fn new(width: u32, height: u32, samples: Vec<u16>) -> Self {
        debug_assert_eq!(samples.len(), width as usize * height as usize);
        Self {
            width,
            height,
            samples,
        }
    }

    /// Raw sample at (row, col) in sensor row order
    pub fn sample(&self, row: u32, col: u32) -> u16 {
        self.samples[(row * self.width + col) as usize]
    }
}

/// Pinhole intrinsics of the active depth stream
///
/// Focal lengths and the principal point are in pixels at the stream
/// resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthIntrinsics {
    /// Stream width in pixels
    pub width: u32,
    /// Stream height in pixels
    pub height: u32,
    /// Focal length X (pixels)
    pub fx: f32,
    /// Focal length Y (pixels)
    pub fy: f32,
    /// Principal point X (pixels)
    pub ppx: f32,
    /// Principal point Y (pixels)
    pub ppy: f32,
}

impl DepthIntrinsics {
    /// Back-project the pixel at (col, row) with depth `depth_m` meters
    /// into camera-space X/Y/Z meters
    pub fn deproject(&self, col: u32, row: u32, depth_m: f32) -> [f32; 3] {
        let x = (col as f32 - self.ppx) / self.fx * depth_m;
        let y = (row as f32 - self.ppy) / self.fy * depth_m;
        [x, y, depth_m]
    }
}
