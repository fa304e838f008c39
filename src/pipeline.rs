// SPDX-License-Identifier: GPL-3.0-only

//! Tick-driven depth pipeline
//!
//! The host drives one [`DepthPipeline::tick`] per rendering frame. Each
//! tick reconciles the requested device against the active session,
//! performs a single non-blocking poll, and on a hit converts into the
//! back buffer and publishes it. Per-tick failures are logged and degrade
//! to a no-output tick, so a failed tick is indistinguishable from a
//! "no new frame" tick and never crashes the host.

use tracing::{debug, warn};

use crate::config::{StreamConfig, timing};
use crate::convert;
use crate::errors::{CatalogError, SessionError};
use crate::sensor::{SensorDevice, SensorLayer};
use crate::session::SessionManager;
use crate::surface::{OutputBuffer, OutputMode, OutputSurface};

/// Inputs read once per tick
#[derive(Debug, Clone)]
pub struct TickRequest<'a> {
    /// Identifier of the device the consumer wants streaming
    pub device_id: &'a str,
    /// Requested output representation; takes effect on the next tick
    pub mode: OutputMode,
}

/// Tick-driven device/session and conversion pipeline
pub struct DepthPipeline {
    manager: SessionManager,
    surface: OutputSurface,
    /// Mode used for this tick's conversion, latched from the previous
    /// tick's request
    mode: OutputMode,
    execute_count: u64,
}

impl std::fmt::Debug for DepthPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepthPipeline")
            .field("mode", &self.mode)
            .field("execute_count", &self.execute_count)
            .finish_non_exhaustive()
    }
}

impl DepthPipeline {
    /// Create the pipeline and take the startup enumeration
    ///
    /// Zero attached devices is the only fatal failure. No stream is
    /// started yet; the session is created lazily by the first tick that
    /// names a device.
    pub fn new(sensor: Box<dyn SensorLayer>, config: StreamConfig) -> Result<Self, CatalogError> {
        let mut manager = SessionManager::new(sensor, config);
        manager.enumerate()?;
        let mode = OutputMode::default();
        Ok(Self {
            manager,
            surface: OutputSurface::new(config.width, config.height, mode.into()),
            mode,
            execute_count: 0,
        })
    }

    /// Device identifiers for operator presentation
    pub fn available_devices(&mut self) -> Result<Vec<SensorDevice>, CatalogError> {
        self.manager.enumerate()
    }

    /// Number of completed ticks, the externally reportable statistic
    pub fn execute_count(&self) -> u64 {
        self.execute_count
    }

    /// The currently published output buffer
    pub fn current(&self) -> &OutputBuffer {
        self.surface.current()
    }

    /// Run one tick
    ///
    /// Returns the buffer published to the consumer for this tick; on a
    /// miss or a degraded tick this is the previously published buffer,
    /// unchanged.
    pub fn tick(&mut self, request: &TickRequest<'_>) -> &OutputBuffer {
        self.execute_count += 1;

        self.reconcile_device(request.device_id);
        self.produce_frame();

        // The requested mode drives the next tick's conversion, so a
        // layout switch lags the input by one tick.
        self.mode = request.mode;

        self.surface.current()
    }

    /// Stop the active session
    pub fn teardown(&mut self) {
        self.manager.teardown();
    }

    fn reconcile_device(&mut self, device_id: &str) {
        if self
            .manager
            .session()
            .is_some_and(|s| s.device_id == device_id)
        {
            return;
        }
        match self.manager.select_device(device_id) {
            Ok(()) => {}
            Err(SessionError::DeviceNotFound(id)) => {
                debug!(device = %id, "Requested device not in current enumeration");
            }
            Err(e) => warn!(error = %e, "Device selection failed"),
        }
    }

    fn produce_frame(&mut self) {
        let Some(session) = self.manager.session() else {
            return;
        };
        let scale = session.depth_scale;
        let intrinsics = session.intrinsics;
        let config = session.config;

        let frame = match self.manager.poll_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Frame poll failed");
                return;
            }
        };

        if frame.width != config.width || frame.height != config.height {
            warn!(
                width = frame.width,
                height = frame.height,
                config = %config,
                "Frame geometry does not match the stream configuration"
            );
            return;
        }

        let out = self.surface.back_mut(self.mode.into());
        match self.mode {
            OutputMode::Depth => convert::convert_depth(&frame, scale, out),
            OutputMode::PointCloud => {
                convert::convert_point_cloud(&frame, scale, &intrinsics, out)
            }
        }
        self.surface.publish();

        if self.execute_count % timing::TICK_LOG_INTERVAL == 0 {
            debug!(ticks = self.execute_count, mode = %self.mode, "Published converted frame");
        }
    }
}
