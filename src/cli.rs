// SPDX-License-Identifier: GPL-3.0-only

//! Terminal commands

use std::thread;
use std::time::Duration;

use depthgrab::config::StreamConfig;
use depthgrab::pipeline::{DepthPipeline, TickRequest};
use depthgrab::sensor::{SensorLayer, SimulatedSensor};
use depthgrab::surface::OutputMode;

/// Build the sensor layer for this build
///
/// With the `realsense` feature the hardware backend is preferred; the
/// simulated backend synthesizes frames so the pipeline stays exercisable
/// without attached hardware.
fn sensor_layer() -> Box<dyn SensorLayer> {
    #[cfg(feature = "realsense")]
    {
        match depthgrab::sensor::RealSenseLayer::new() {
            Ok(layer) => return Box::new(layer),
            Err(e) => eprintln!("RealSense unavailable ({e}), falling back to simulated sensor"),
        }
    }
    let mut sensor = SimulatedSensor::new();
    sensor.enable_synthesis();
    Box::new(sensor)
}

/// List available depth devices
pub fn list_devices(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut sensor = sensor_layer();
    let devices = depthgrab::catalog::enumerate_devices(sensor.as_mut())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }

    println!("Available depth devices:");
    for (index, device) in devices.iter().enumerate() {
        println!("  [{}] {} ({})", index, device.id, device.model);
    }
    Ok(())
}

/// Drive the pipeline for a number of ticks and report statistics
pub fn grab(
    device: Option<String>,
    ticks: u64,
    mode: OutputMode,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = StreamConfig::default();
    let mut pipeline = DepthPipeline::new(sensor_layer(), config)?;

    let device_id = match device {
        Some(id) => id,
        None => pipeline.available_devices()?[0].id.clone(),
    };
    println!("Grabbing from {} at {} in {} mode", device_id, config, mode);

    let request = TickRequest {
        device_id: &device_id,
        mode,
    };
    let interval = Duration::from_secs_f64(1.0 / f64::from(config.frame_rate));
    for _ in 0..ticks {
        pipeline.tick(&request);
        thread::sleep(interval);
    }

    let output = pipeline.current();
    println!(
        "Completed {} ticks; current buffer {}x{} with {} channels",
        pipeline.execute_count(),
        output.width(),
        output.height(),
        output.layout().channels(),
    );
    let center = output.pixel(output.width() / 2, output.height() / 2);
    println!("Center pixel: {:?}", center);

    pipeline.teardown();
    Ok(())
}
