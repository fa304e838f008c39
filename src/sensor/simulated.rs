// SPDX-License-Identifier: GPL-3.0-only

//! Scripted sensor backend
//!
//! Always available, used by tests and by the CLI when no hardware backend
//! is compiled in. The backend replays devices and frames scripted through
//! a shared handle and records every lifecycle call, so tests can assert
//! call ordering (e.g. stop-before-start on a device switch).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::SensorLayer;
use super::types::{DepthIntrinsics, RawDepthFrame, SensorDevice};
use crate::config::StreamConfig;
use crate::errors::{CatalogError, SensorError, SessionError};

/// One recorded lifecycle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorEvent {
    /// Device snapshot taken
    Enumerate,
    /// Stream started against the serial
    Start(String),
    /// Stream stopped
    Stop,
    /// Frame polled
    Poll,
}

/// Scripted state shared between the backend and its driver
#[derive(Debug)]
pub struct SimScript {
    /// Devices returned by every enumeration
    pub devices: Vec<SensorDevice>,
    /// Frames handed out by successive polls
    pub frames: VecDeque<RawDepthFrame>,
    /// Depth scale reported for the streaming device; `None` models a
    /// device with no depth-capable sensor
    pub depth_scale: Option<f32>,
    /// Intrinsics reported for the active stream
    pub intrinsics: DepthIntrinsics,
    /// Synthesize a ramp frame on every poll instead of draining `frames`
    pub synthesize: bool,
    /// Fail the next start_stream call
    pub fail_next_start: bool,
    /// Fail the next stop_stream call
    pub fail_next_stop: bool,
    /// Fail every poll
    pub poll_error: bool,
    /// Recorded lifecycle calls
    pub events: Vec<SensorEvent>,
}

impl Default for SimScript {
    fn default() -> Self {
        Self {
            devices: vec![SensorDevice::from_serial("SIM0001", "Simulated depth sensor")],
            frames: VecDeque::new(),
            depth_scale: Some(0.001),
            intrinsics: DepthIntrinsics {
                width: 848,
                height: 480,
                fx: 421.0,
                fy: 421.0,
                ppx: 423.5,
                ppy: 239.5,
            },
            synthesize: false,
            fail_next_start: false,
            fail_next_stop: false,
            poll_error: false,
            events: Vec::new(),
        }
    }
}

/// Scripted sensor backend
pub struct SimulatedSensor {
    script: Arc<Mutex<SimScript>>,
    streaming: Option<String>,
    config: Option<StreamConfig>,
    synth_tick: u16,
}

impl SimulatedSensor {
    /// Create a backend with the default script (one device, 1 mm scale)
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(SimScript::default())),
            streaming: None,
            config: None,
            synth_tick: 0,
        }
    }

    /// Shared handle to the script for seeding devices, frames and faults
    pub fn script(&self) -> Arc<Mutex<SimScript>> {
        Arc::clone(&self.script)
    }

    /// Synthesize a ramp frame on every poll
    pub fn enable_synthesis(&mut self) {
        self.script.lock().unwrap().synthesize = true;
    }

    fn ramp_frame(&mut self, config: &StreamConfig) -> RawDepthFrame {
        // Row ramp shifted per poll so successive frames differ.
        self.synth_tick = self.synth_tick.wrapping_add(1);
        let mut samples = Vec::with_capacity(config.pixel_count());
        for row in 0..config.height as u16 {
            let value = row.wrapping_mul(8).wrapping_add(self.synth_tick);
            samples.extend(std::iter::repeat_n(value, config.width as usize));
        }
        RawDepthFrame::new(config.width, config.height, samples)
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorLayer for SimulatedSensor {
    fn enumerate(&mut self) -> Result<Vec<SensorDevice>, CatalogError> {
        let mut script = self.script.lock().unwrap();
        script.events.push(SensorEvent::Enumerate);
        Ok(script.devices.clone())
    }

    fn start_stream(&mut self, serial: &str, config: &StreamConfig) -> Result<(), SessionError> {
        let mut script = self.script.lock().unwrap();
        script.events.push(SensorEvent::Start(serial.to_string()));
        if script.fail_next_start {
            script.fail_next_start = false;
            return Err(SessionError::StartFailed("scripted start failure".into()));
        }
        if !script.devices.iter().any(|d| d.serial == serial) {
            return Err(SessionError::StartFailed(format!(
                "unknown serial: {serial}"
            )));
        }
        debug!(serial = %serial, config = %config, "Simulated stream started");
        self.streaming = Some(serial.to_string());
        self.config = Some(*config);
        Ok(())
    }

    fn stop_stream(&mut self) -> Result<(), SessionError> {
        let mut script = self.script.lock().unwrap();
        script.events.push(SensorEvent::Stop);
        // The stream is gone either way; a failure models a detached device.
        self.streaming = None;
        self.config = None;
        if script.fail_next_stop {
            script.fail_next_stop = false;
            return Err(SessionError::StopFailed("scripted stop failure".into()));
        }
        Ok(())
    }

    fn is_streaming(&self) -> bool {
        self.streaming.is_some()
    }

    fn depth_scale(&self) -> Result<f32, SessionError> {
        let script = self.script.lock().unwrap();
        script.depth_scale.ok_or_else(|| {
            SessionError::NoDepthSensor(self.streaming.clone().unwrap_or_default())
        })
    }

    fn intrinsics(&self) -> Result<DepthIntrinsics, SessionError> {
        Ok(self.script.lock().unwrap().intrinsics)
    }

    fn poll_frame(&mut self) -> Result<Option<RawDepthFrame>, SensorError> {
        let (frame, synthesize) = {
            let mut script = self.script.lock().unwrap();
            script.events.push(SensorEvent::Poll);
            if script.poll_error {
                return Err(SensorError::PollFailed("scripted poll failure".into()));
            }
            (script.frames.pop_front(), script.synthesize)
        };
        if frame.is_some() {
            return Ok(frame);
        }
        if synthesize && let Some(config) = self.config {
            return Ok(Some(self.ramp_frame(&config)));
        }
        Ok(None)
    }
}
