// SPDX-License-Identifier: GPL-3.0-only

//! Raw depth frame conversion
//!
//! Two conversions, selected by the tick's latched output mode. Both read
//! the raw sample at row `height - 1 - y` for output row `y` (the sensor's
//! native row order is flipped relative to the output buffer's orientation)
//! and rewrite the targeted buffer in full; there is no partial write and
//! no interpolation across missed frames.

use crate::sensor::{DepthIntrinsics, RawDepthFrame};
use crate::surface::{OutputBuffer, OutputLayout};

/// Write the scaled depth map for `frame` into `out`
///
/// Each output pixel is the exact float product of the raw sample and the
/// calibration scale.
pub fn convert_depth(frame: &RawDepthFrame, scale: f32, out: &mut OutputBuffer) {
    debug_assert_eq!(out.layout(), OutputLayout::Depth);
    debug_assert_eq!((frame.width, frame.height), (out.width(), out.height()));

    let width = out.width() as usize;
    let height = out.height() as usize;
    let data = out.data_mut();
    for y in 0..height {
        let src_row = (height - 1 - y) * width;
        let dst_row = y * width;
        for x in 0..width {
            data[dst_row + x] = scale * f32::from(frame.samples[src_row + x]);
        }
    }
}

/// Write the camera-space point cloud for `frame` into `out`
///
/// Each depth sample is back-projected through the depth-stream intrinsics
/// into camera-space meters. The fourth channel is a constant 1.0 so a
/// pixel doubles as a homogeneous point for downstream matrix transforms.
pub fn convert_point_cloud(
    frame: &RawDepthFrame,
    scale: f32,
    intrinsics: &DepthIntrinsics,
    out: &mut OutputBuffer,
) {
    debug_assert_eq!(out.layout(), OutputLayout::PointCloud);
    debug_assert_eq!((frame.width, frame.height), (out.width(), out.height()));

    let width = out.width() as usize;
    let height = out.height() as usize;
    let data = out.data_mut();
    for y in 0..height {
        let src_y = height - 1 - y;
        let src_row = src_y * width;
        let dst_row = y * width * 4;
        for x in 0..width {
            let depth_m = scale * f32::from(frame.samples[src_row + x]);
            let [px, py, pz] = intrinsics.deproject(x as u32, src_y as u32, depth_m);
            let pixel = dst_row + x * 4;
            data[pixel] = px;
            data[pixel + 1] = py;
            data[pixel + 2] = pz;
            data[pixel + 3] = 1.0;
        }
    }
}
