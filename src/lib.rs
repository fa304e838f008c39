// SPDX-License-Identifier: GPL-3.0-only

//! Depth camera session manager and frame-conversion pipeline
//!
//! This library ingests frames from a depth-sensing camera, converts each
//! frame into a dense float pixel buffer for a downstream renderer, and
//! exposes device-lifecycle control: enumerate attached devices, switch
//! the active device, and select between a scaled depth map and a
//! camera-space point cloud.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`catalog`]: Device enumeration with stable serial-derived identifiers
//! - [`session`]: Session lifecycle and calibration ownership
//! - [`pipeline`]: The tick-driven entry point the host calls per frame
//! - [`convert`]: Depth-map and point-cloud conversions
//! - [`surface`]: Double-buffered output surface
//! - [`sensor`]: Sensor-layer abstraction and backends
//! - [`config`]: Stream configuration
//!
//! # Example
//!
//! ```
//! use depthgrab::{DepthPipeline, StreamConfig, TickRequest, OutputMode};
//! use depthgrab::sensor::SimulatedSensor;
//!
//! let mut sensor = SimulatedSensor::new();
//! sensor.enable_synthesis();
//! let mut pipeline =
//!     DepthPipeline::new(Box::new(sensor), StreamConfig::default()).unwrap();
//! let devices = pipeline.available_devices().unwrap();
//! let request = TickRequest {
//!     device_id: &devices[0].id,
//!     mode: OutputMode::Depth,
//! };
//! let output = pipeline.tick(&request);
//! assert_eq!(output.width(), 848);
//! ```

pub mod catalog;
pub mod config;
pub mod convert;
pub mod errors;
pub mod pipeline;
pub mod sensor;
pub mod session;
pub mod surface;

// Re-export commonly used types
pub use config::StreamConfig;
pub use errors::{CoreError, CoreResult};
pub use pipeline::{DepthPipeline, TickRequest};
pub use sensor::{RawDepthFrame, SensorDevice, SensorLayer};
pub use surface::{OutputBuffer, OutputLayout, OutputMode};
