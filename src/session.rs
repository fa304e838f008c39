// SPDX-License-Identifier: GPL-3.0-only

//! Depth session lifecycle
//!
//! The manager owns the single acquisition session process-wide: it binds
//! one enumerated device to a running depth stream and re-derives the
//! device's calibration on every (re)start. A session is either fully
//! stopped or fully running; callers never observe a partially-started
//! state.

use tracing::{info, warn};

use crate::catalog;
use crate::config::StreamConfig;
use crate::errors::{CatalogError, SensorError, SessionError};
use crate::sensor::{DepthIntrinsics, RawDepthFrame, SensorDevice, SensorLayer};

/// The live configuration binding one device to an active stream
#[derive(Debug, Clone)]
pub struct Session {
    /// Identifier of the streaming device
    pub device_id: String,
    /// Stream geometry and rate
    pub config: StreamConfig,
    /// Meters per raw depth unit, re-derived at every stream start
    pub depth_scale: f32,
    /// Depth-stream intrinsics for point-cloud projection
    pub intrinsics: DepthIntrinsics,
}

/// Session lifecycle manager
pub struct SessionManager {
    sensor: Box<dyn SensorLayer>,
    config: StreamConfig,
    session: Option<Session>,
}

impl SessionManager {
    /// Create a manager over a sensor backend
    pub fn new(sensor: Box<dyn SensorLayer>, config: StreamConfig) -> Self {
        Self {
            sensor,
            config,
            session: None,
        }
    }

    /// Take a fresh enumeration snapshot
    pub fn enumerate(&mut self) -> Result<Vec<SensorDevice>, CatalogError> {
        catalog::enumerate_devices(self.sensor.as_mut())
    }

    /// The running session, if any
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Switch the active stream to the device with the given id
    ///
    /// The device is located in a fresh enumeration before the running
    /// stream is touched, so an unknown id leaves the session unchanged.
    /// For a valid id the previous stream is stopped before the new one
    /// starts; on any start or calibration failure the session is left
    /// stopped and the error is returned to the caller.
    pub fn select_device(&mut self, id: &str) -> Result<(), SessionError> {
        // Fast path: the requested device is already streaming.
        if self.session.as_ref().is_some_and(|s| s.device_id == id) {
            return Ok(());
        }

        let device = self
            .enumerate()
            .map_err(|e| SessionError::DeviceNotFound(e.to_string()))?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| SessionError::DeviceNotFound(id.to_string()))?;

        if self.session.is_some() || self.sensor.is_streaming() {
            self.stop_stream();
        }

        self.sensor.start_stream(&device.serial, &self.config)?;

        // Calibration refresh. A device with no depth-capable sensor fails
        // the selection rather than keeping the previous device's scale.
        let depth_scale = match self.sensor.depth_scale() {
            Ok(scale) => scale,
            Err(e) => {
                self.stop_stream();
                return Err(e);
            }
        };
        let intrinsics = match self.sensor.intrinsics() {
            Ok(intrinsics) => intrinsics,
            Err(e) => {
                self.stop_stream();
                return Err(e);
            }
        };

        info!(device = %device.id, scale = depth_scale, config = %self.config, "Depth session started");
        self.session = Some(Session {
            device_id: device.id,
            config: self.config,
            depth_scale,
            intrinsics,
        });
        Ok(())
    }

    /// Stop the running stream
    ///
    /// Safe to call when already stopped.
    pub fn teardown(&mut self) {
        if self.session.take().is_some() || self.sensor.is_streaming() {
            self.stop_stream();
        }
    }

    fn stop_stream(&mut self) {
        self.session = None;
        if let Err(e) = self.sensor.stop_stream() {
            // The device may already be detached; proceed as stopped.
            warn!(error = %e, "Stream stop failed");
        }
    }

    // ===== Frame fetch =====

    /// Non-blocking poll for the next depth frame
    ///
    /// The sole suspension-free boundary between the per-tick caller and
    /// the sensor layer: a miss returns `Ok(None)` immediately and means
    /// "no new output this tick", not an error. No timeout or retry logic
    /// wraps it.
    pub fn poll_frame(&mut self) -> Result<Option<RawDepthFrame>, SensorError> {
        if self.session.is_none() {
            return Ok(None);
        }
        self.sensor.poll_frame()
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::{SensorEvent, SimulatedSensor};
    use std::sync::{Arc, Mutex};

    type ScriptHandle = Arc<Mutex<crate::sensor::simulated::SimScript>>;

    fn manager_with_devices(serials: &[&str]) -> (SessionManager, ScriptHandle) {
        let sensor = SimulatedSensor::new();
        let script = sensor.script();
        script.lock().unwrap().devices = serials
            .iter()
            .map(|s| SensorDevice::from_serial(*s, "Test sensor"))
            .collect();
        (
            SessionManager::new(Box::new(sensor), StreamConfig::default()),
            script,
        )
    }

    #[test]
    fn test_select_starts_session() {
        let (mut manager, _script) = manager_with_devices(&["ABC123"]);
        manager.select_device("SensorABC123").unwrap();
        let session = manager.session().expect("session running");
        assert_eq!(session.device_id, "SensorABC123");
        assert_eq!(session.depth_scale, 0.001);
    }

    #[test]
    fn test_unknown_id_leaves_session_unchanged() {
        let (mut manager, script) = manager_with_devices(&["ABC123"]);
        manager.select_device("SensorABC123").unwrap();

        let err = manager.select_device("SensorNOPE").unwrap_err();
        assert!(matches!(err, SessionError::DeviceNotFound(_)));
        assert_eq!(
            manager.session().unwrap().device_id,
            "SensorABC123",
            "running session must survive an unknown id"
        );
        let events = script.lock().unwrap().events.clone();
        assert!(
            !events.contains(&SensorEvent::Stop),
            "unknown id must not stop the running stream"
        );
    }

    #[test]
    fn test_switch_stops_before_start() {
        let (mut manager, script) = manager_with_devices(&["ABC123", "DEF456"]);
        manager.select_device("SensorABC123").unwrap();
        manager.select_device("SensorDEF456").unwrap();

        let events = script.lock().unwrap().events.clone();
        let stop = events
            .iter()
            .position(|e| *e == SensorEvent::Stop)
            .expect("previous stream stopped");
        let second_start = events
            .iter()
            .position(|e| *e == SensorEvent::Start("DEF456".to_string()))
            .expect("new stream started");
        assert!(stop < second_start, "stop must precede the new start");
        assert_eq!(manager.session().unwrap().device_id, "SensorDEF456");
    }

    #[test]
    fn test_reselect_active_id_is_a_noop() {
        let (mut manager, script) = manager_with_devices(&["ABC123"]);
        manager.select_device("SensorABC123").unwrap();
        let events_before = script.lock().unwrap().events.len();
        manager.select_device("SensorABC123").unwrap();
        assert_eq!(
            script.lock().unwrap().events.len(),
            events_before,
            "reselecting the active id must not touch the sensor layer"
        );
    }

    #[test]
    fn test_start_failure_leaves_session_stopped() {
        let (mut manager, script) = manager_with_devices(&["ABC123"]);
        script.lock().unwrap().fail_next_start = true;
        let err = manager.select_device("SensorABC123").unwrap_err();
        assert!(matches!(err, SessionError::StartFailed(_)));
        assert!(manager.session().is_none());

        // The failure is recoverable: the next selection succeeds.
        manager.select_device("SensorABC123").unwrap();
        assert!(manager.session().is_some());
    }

    #[test]
    fn test_missing_depth_sensor_fails_selection() {
        let (mut manager, script) = manager_with_devices(&["ABC123"]);
        script.lock().unwrap().depth_scale = None;
        let err = manager.select_device("SensorABC123").unwrap_err();
        assert!(matches!(err, SessionError::NoDepthSensor(_)));
        assert!(
            manager.session().is_none(),
            "no session may run without a calibration scale"
        );
        let events = script.lock().unwrap().events.clone();
        assert_eq!(
            events.last(),
            Some(&SensorEvent::Stop),
            "the started stream must be stopped again"
        );
    }

    #[test]
    fn test_stop_failure_treated_as_stopped() {
        let (mut manager, script) = manager_with_devices(&["ABC123", "DEF456"]);
        manager.select_device("SensorABC123").unwrap();
        script.lock().unwrap().fail_next_stop = true;
        // The stop failure is logged, not propagated; the switch proceeds.
        manager.select_device("SensorDEF456").unwrap();
        assert_eq!(manager.session().unwrap().device_id, "SensorDEF456");
    }

    #[test]
    fn test_teardown_safe_when_stopped() {
        let (mut manager, _script) = manager_with_devices(&["ABC123"]);
        manager.teardown();
        manager.teardown();
        assert!(manager.session().is_none());
    }

    #[test]
    fn test_poll_without_session_is_a_miss() {
        let (mut manager, script) = manager_with_devices(&["ABC123"]);
        assert!(manager.poll_frame().unwrap().is_none());
        assert!(
            !script.lock().unwrap().events.contains(&SensorEvent::Poll),
            "no sensor poll without a running session"
        );
    }
}
