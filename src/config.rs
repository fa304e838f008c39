// SPDX-License-Identifier: GPL-3.0-only

//! Stream configuration

use serde::{Deserialize, Serialize};
use std::fmt;

/// Depth stream configuration
///
/// The default matches the reference deployment: 848x480 @ 60 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Stream width in pixels
    pub width: u32,
    /// Stream height in pixels
    pub height: u32,
    /// Stream frame rate in Hz
    pub frame_rate: u32,
}

impl StreamConfig {
    /// Number of pixels per frame
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            width: 848,
            height: 480,
            frame_rate: 60,
        }
    }
}

impl fmt::Display for StreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} @ {}fps", self.width, self.height, self.frame_rate)
    }
}

/// Timing constants
pub mod timing {
    /// Tick counter modulo for periodic frame logging
    pub const TICK_LOG_INTERVAL: u64 = 60;
}
