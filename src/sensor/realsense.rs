// SPDX-License-Identifier: GPL-3.0-only

#![cfg(feature = "realsense")]

//! Intel RealSense sensor backend
//!
//! Streams Z16 depth frames through librealsense2 via the realsense-rust
//! bindings. Device selection is serial-based, so catalog identifiers map
//! directly onto hardware, and the calibration scale is read from the depth
//! sensor's `DepthUnits` option on every stream start.

use std::collections::HashSet;
use std::ffi::CString;

use realsense_rust::{
    config::Config,
    context::Context,
    frame::{DepthFrame, FrameEx},
    kind::{Rs2CameraInfo, Rs2Format, Rs2Option, Rs2StreamKind},
    pipeline::{ActivePipeline, InactivePipeline},
};
use tracing::{info, warn};

use super::SensorLayer;
use super::types::{DepthIntrinsics, RawDepthFrame, SensorDevice};
use crate::config::StreamConfig;
use crate::errors::{CatalogError, SensorError, SessionError};

/// RealSense sensor backend
pub struct RealSenseLayer {
    context: Context,
    pipeline: Option<ActivePipeline>,
}

impl RealSenseLayer {
    /// Open the librealsense2 context
    pub fn new() -> Result<Self, CatalogError> {
        let context = Context::new().map_err(|e| CatalogError::QueryFailed(e.to_string()))?;
        Ok(Self {
            context,
            pipeline: None,
        })
    }
}

impl SensorLayer for RealSenseLayer {
    fn enumerate(&mut self) -> Result<Vec<SensorDevice>, CatalogError> {
        let devices = self.context.query_devices(HashSet::new());
        Ok(devices
            .iter()
            .filter_map(|device| {
                let serial = device
                    .info(Rs2CameraInfo::SerialNumber)?
                    .to_str()
                    .ok()?
                    .to_string();
                let model = device
                    .info(Rs2CameraInfo::Name)
                    .and_then(|name| name.to_str().ok())
                    .unwrap_or("unknown")
                    .to_string();
                Some(SensorDevice::from_serial(serial, model))
            })
            .collect())
    }

    fn start_stream(&mut self, serial: &str, config: &StreamConfig) -> Result<(), SessionError> {
        if let Some(active) = self.pipeline.take() {
            active.stop();
        }

        let serial_c =
            CString::new(serial).map_err(|e| SessionError::StartFailed(e.to_string()))?;
        let mut rs_config = Config::new();
        rs_config
            .enable_device_from_serial(&serial_c)
            .map_err(|e| SessionError::StartFailed(e.to_string()))?
            .disable_all_streams()
            .map_err(|e| SessionError::StartFailed(e.to_string()))?
            .enable_stream(
                Rs2StreamKind::Depth,
                None,
                config.width as usize,
                config.height as usize,
                Rs2Format::Z16,
                config.frame_rate as usize,
            )
            .map_err(|e| SessionError::StartFailed(e.to_string()))?;

        let inactive = InactivePipeline::try_from(&self.context)
            .map_err(|e| SessionError::StartFailed(e.to_string()))?;
        let active = inactive
            .start(Some(rs_config))
            .map_err(|e| SessionError::StartFailed(e.to_string()))?;

        info!(serial = %serial, config = %config, "Depth stream started");
        self.pipeline = Some(active);
        Ok(())
    }

    fn stop_stream(&mut self) -> Result<(), SessionError> {
        if let Some(active) = self.pipeline.take() {
            active.stop();
            info!("Depth stream stopped");
        }
        Ok(())
    }

    fn is_streaming(&self) -> bool {
        self.pipeline.is_some()
    }

    fn depth_scale(&self) -> Result<f32, SessionError> {
        let active = self
            .pipeline
            .as_ref()
            .ok_or_else(|| SessionError::StartFailed("no active stream".to_string()))?;
        let device = active.profile().device();
        let serial = device
            .info(Rs2CameraInfo::SerialNumber)
            .and_then(|s| s.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        for sensor in device.sensors() {
            if let Some(scale) = sensor.get_option(Rs2Option::DepthUnits) {
                return Ok(scale);
            }
        }
        Err(SessionError::NoDepthSensor(serial))
    }

    fn intrinsics(&self) -> Result<DepthIntrinsics, SessionError> {
        let active = self
            .pipeline
            .as_ref()
            .ok_or_else(|| SessionError::StartFailed("no active stream".to_string()))?;
        let streams = active.profile().streams();
        let depth_stream = streams
            .iter()
            .find(|stream| stream.kind() == Rs2StreamKind::Depth)
            .ok_or_else(|| SessionError::NoDepthSensor("no depth stream".to_string()))?;
        let intrinsics = depth_stream
            .intrinsics()
            .map_err(|e| SessionError::NoDepthSensor(e.to_string()))?;
        Ok(DepthIntrinsics {
            width: intrinsics.width() as u32,
            height: intrinsics.height() as u32,
            fx: intrinsics.fx(),
            fy: intrinsics.fy(),
            ppx: intrinsics.ppx(),
            ppy: intrinsics.ppy(),
        })
    }

    fn poll_frame(&mut self) -> Result<Option<RawDepthFrame>, SensorError> {
        let active = self.pipeline.as_mut().ok_or(SensorError::Disconnected)?;
        let Some(frames) = active.poll() else {
            return Ok(None);
        };
        let mut depth_frames = frames.frames_of_type::<DepthFrame>();
        if depth_frames.is_empty() {
            warn!("Frameset without a depth frame");
            return Ok(None);
        }
        let frame = depth_frames.remove(0);
        let width = frame.width() as u32;
        let height = frame.height() as u32;
        // Z16: two bytes per sample, row-major.
        let samples = unsafe {
            let ptr: *const std::os::raw::c_void = frame.get_data();
            std::slice::from_raw_parts(ptr.cast::<u16>(), frame.get_data_size() / 2).to_vec()
        };
        Ok(Some(RawDepthFrame::new(width, height, samples)))
    }
}

impl Drop for RealSenseLayer {
    fn drop(&mut self) {
        let _ = self.stop_stream();
    }
}
