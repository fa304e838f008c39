// SPDX-License-Identifier: GPL-3.0-only

//! Double-buffered output surface
//!
//! The converter writes the buffer not currently exposed to the consumer;
//! a publish flips the handoff index. A tick that produces no frame
//! performs no publish, so the visible buffer is bit-identical across
//! misses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Output representation requested for a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputMode {
    /// Single-channel scaled depth map
    #[default]
    Depth,
    /// Four-channel camera-space point cloud
    PointCloud,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Depth => write!(f, "Depth"),
            OutputMode::PointCloud => write!(f, "Point Cloud"),
        }
    }
}

/// Channel layout of an output buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// One float channel per pixel
    Depth,
    /// Four float channels per pixel (X, Y, Z, homogeneous 1.0)
    PointCloud,
}

impl OutputLayout {
    /// Number of float channels per pixel
    pub const fn channels(self) -> usize {
        match self {
            OutputLayout::Depth => 1,
            OutputLayout::PointCloud => 4,
        }
    }
}

impl From<OutputMode> for OutputLayout {
    fn from(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Depth => OutputLayout::Depth,
            OutputMode::PointCloud => OutputLayout::PointCloud,
        }
    }
}

/// Flat float pixel buffer handed to the downstream renderer
///
/// Row-major, `width * height * channels` floats.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputBuffer {
    width: u32,
    height: u32,
    layout: OutputLayout,
    data: Vec<f32>,
}

impl OutputBuffer {
    /// Create a zero-filled buffer
    pub fn new(width: u32, height: u32, layout: OutputLayout) -> Self {
        Self {
            width,
            height,
            layout,
            data: vec![0.0; width as usize * height as usize * layout.channels()],
        }
    }

    /// Buffer width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel layout
    pub fn layout(&self) -> OutputLayout {
        self.layout
    }

    /// All float samples, row-major
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Channels of the pixel at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> &[f32] {
        let channels = self.layout.channels();
        let index = (y * self.width + x) as usize * channels;
        &self.data[index..index + channels]
    }

    /// Byte view for renderer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Re-shape for `layout`, reallocating only when the channel count
    /// changes
    fn ensure_layout(&mut self, layout: OutputLayout) {
        if self.layout != layout {
            self.layout = layout;
            self.data = vec![0.0; self.width as usize * self.height as usize * layout.channels()];
        }
    }
}

/// Double-buffered handoff surface
///
/// Exposes exactly one buffer as current per tick; the other is the write
/// target for the next conversion.
pub struct OutputSurface {
    buffers: [OutputBuffer; 2],
    front: usize,
}

impl OutputSurface {
    /// Create a surface with both buffers zero-filled
    pub fn new(width: u32, height: u32, layout: OutputLayout) -> Self {
        Self {
            buffers: [
                OutputBuffer::new(width, height, layout),
                OutputBuffer::new(width, height, layout),
            ],
            front: 0,
        }
    }

    /// The buffer currently exposed to the consumer
    pub fn current(&self) -> &OutputBuffer {
        &self.buffers[self.front]
    }

    /// The buffer the next conversion writes, re-shaped to `layout`
    pub fn back_mut(&mut self, layout: OutputLayout) -> &mut OutputBuffer {
        let back = self.front ^ 1;
        self.buffers[back].ensure_layout(layout);
        &mut self.buffers[back]
    }

    /// Expose the freshly written back buffer as current
    pub fn publish(&mut self) {
        self.front ^= 1;
    }
}
