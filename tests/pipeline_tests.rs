// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the tick-driven pipeline

use std::sync::{Arc, Mutex};

use depthgrab::config::StreamConfig;
use depthgrab::errors::CatalogError;
use depthgrab::pipeline::{DepthPipeline, TickRequest};
use depthgrab::sensor::simulated::SimScript;
use depthgrab::sensor::{
    DepthIntrinsics, RawDepthFrame, SensorDevice, SensorEvent, SimulatedSensor,
};
use depthgrab::surface::{OutputLayout, OutputMode};

const CONFIG: StreamConfig = StreamConfig {
    width: 4,
    height: 4,
    frame_rate: 30,
};

/// Pipeline over a scripted sensor with one device, "SensorABC123"
fn scripted_pipeline() -> (DepthPipeline, Arc<Mutex<SimScript>>) {
    let sensor = SimulatedSensor::new();
    let script = sensor.script();
    {
        let mut script = script.lock().unwrap();
        script.devices = vec![SensorDevice::from_serial("ABC123", "Test sensor")];
        script.intrinsics = DepthIntrinsics {
            width: CONFIG.width,
            height: CONFIG.height,
            fx: 5.0,
            fy: 5.0,
            ppx: 1.0,
            ppy: 0.0,
        };
    }
    let pipeline = DepthPipeline::new(Box::new(sensor), CONFIG).unwrap();
    (pipeline, script)
}

fn frame_with_sample(row: u32, col: u32, value: u16) -> RawDepthFrame {
    let mut samples = vec![0u16; CONFIG.pixel_count()];
    samples[(row * CONFIG.width + col) as usize] = value;
    RawDepthFrame::new(CONFIG.width, CONFIG.height, samples)
}

#[test]
fn test_no_devices_is_fatal_at_startup() {
    let sensor = SimulatedSensor::new();
    sensor.script().lock().unwrap().devices.clear();
    let err = DepthPipeline::new(Box::new(sensor), CONFIG).unwrap_err();
    assert!(matches!(err, CatalogError::NoDevices));
}

#[test]
fn test_depth_scenario() {
    // Enumerate -> ["SensorABC123"], select it, Depth mode, raw 1000 with
    // scale 0.001 -> output pixel 1.0.
    let (mut pipeline, script) = scripted_pipeline();
    script
        .lock()
        .unwrap()
        .frames
        .push_back(frame_with_sample(3, 0, 1000));

    let devices = pipeline.available_devices().unwrap();
    assert_eq!(devices[0].id, "SensorABC123");

    let output = pipeline.tick(&TickRequest {
        device_id: "SensorABC123",
        mode: OutputMode::Depth,
    });
    assert_eq!(output.layout(), OutputLayout::Depth);
    // Source row 3 lands on output row 0 after the vertical flip.
    assert_eq!(output.pixel(0, 0), &[1.0]);
}

#[test]
fn test_point_cloud_scenario() {
    // With scale 0.001, raw 500 at source (row 2, col 2) projects to
    // (0.1, 0.2, 0.5) through the scripted intrinsics; the flipped
    // destination pixel is (2, 1) and carries a homogeneous 1.0.
    let (mut pipeline, script) = scripted_pipeline();
    {
        let mut script = script.lock().unwrap();
        script.frames.push_back(frame_with_sample(2, 2, 500));
        script.frames.push_back(frame_with_sample(2, 2, 500));
    }

    let request = TickRequest {
        device_id: "SensorABC123",
        mode: OutputMode::PointCloud,
    };
    // First tick converts with the initial Depth latch; the requested mode
    // takes effect on the second tick.
    pipeline.tick(&request);
    let output = pipeline.tick(&request);
    assert_eq!(output.layout(), OutputLayout::PointCloud);
    assert_eq!(output.pixel(2, 1), &[0.1, 0.2, 0.5, 1.0]);
}

#[test]
fn test_mode_switch_lags_one_tick() {
    let (mut pipeline, script) = scripted_pipeline();
    {
        let mut script = script.lock().unwrap();
        for _ in 0..3 {
            script.frames.push_back(frame_with_sample(0, 0, 100));
        }
    }

    let depth = TickRequest {
        device_id: "SensorABC123",
        mode: OutputMode::Depth,
    };
    let cloud = TickRequest {
        device_id: "SensorABC123",
        mode: OutputMode::PointCloud,
    };

    assert_eq!(pipeline.tick(&depth).layout(), OutputLayout::Depth);
    // The tick that reads the new mode still produces the old layout.
    assert_eq!(pipeline.tick(&cloud).layout(), OutputLayout::Depth);
    assert_eq!(pipeline.tick(&cloud).layout(), OutputLayout::PointCloud);
}

#[test]
fn test_poll_miss_keeps_published_output() {
    let (mut pipeline, script) = scripted_pipeline();
    script
        .lock()
        .unwrap()
        .frames
        .push_back(frame_with_sample(3, 1, 250));

    let request = TickRequest {
        device_id: "SensorABC123",
        mode: OutputMode::Depth,
    };
    let published = pipeline.tick(&request).clone();
    assert_eq!(published.pixel(1, 0), &[0.25]);

    // No frame queued: the published buffer must be bit-identical.
    let after_miss = pipeline.tick(&request);
    assert_eq!(*after_miss, published);
}

#[test]
fn test_poll_error_is_indistinguishable_from_miss() {
    let (mut pipeline, script) = scripted_pipeline();
    script
        .lock()
        .unwrap()
        .frames
        .push_back(frame_with_sample(0, 0, 42));

    let request = TickRequest {
        device_id: "SensorABC123",
        mode: OutputMode::Depth,
    };
    let published = pipeline.tick(&request).clone();

    script.lock().unwrap().poll_error = true;
    let after_error = pipeline.tick(&request);
    assert_eq!(*after_error, published, "a failed tick must not update the output");
    assert_eq!(pipeline.execute_count(), 2);
}

#[test]
fn test_device_switch_stops_previous_stream() {
    let sensor = SimulatedSensor::new();
    let script = sensor.script();
    script.lock().unwrap().devices = vec![
        SensorDevice::from_serial("ABC123", "Test sensor"),
        SensorDevice::from_serial("DEF456", "Test sensor"),
    ];
    let mut pipeline = DepthPipeline::new(Box::new(sensor), CONFIG).unwrap();

    pipeline.tick(&TickRequest {
        device_id: "SensorABC123",
        mode: OutputMode::Depth,
    });
    pipeline.tick(&TickRequest {
        device_id: "SensorDEF456",
        mode: OutputMode::Depth,
    });

    let events = script.lock().unwrap().events.clone();
    let first_start = events
        .iter()
        .position(|e| *e == SensorEvent::Start("ABC123".to_string()))
        .expect("first stream started");
    let stop = events
        .iter()
        .position(|e| *e == SensorEvent::Stop)
        .expect("previous stream stopped");
    let second_start = events
        .iter()
        .position(|e| *e == SensorEvent::Start("DEF456".to_string()))
        .expect("new stream started");
    assert!(first_start < stop && stop < second_start);
}

#[test]
fn test_unknown_device_is_a_noop_tick() {
    let (mut pipeline, script) = scripted_pipeline();
    script
        .lock()
        .unwrap()
        .frames
        .push_back(frame_with_sample(0, 0, 77));

    let request = TickRequest {
        device_id: "SensorABC123",
        mode: OutputMode::Depth,
    };
    let published = pipeline.tick(&request).clone();

    // The unknown id is degraded to a logged no-op; the session and the
    // published buffer are unchanged.
    let after = pipeline.tick(&TickRequest {
        device_id: "SensorMISSING",
        mode: OutputMode::Depth,
    });
    assert_eq!(*after, published);
    let events = script.lock().unwrap().events.clone();
    assert!(!events.contains(&SensorEvent::Stop));
}

#[test]
fn test_execute_count_covers_missed_ticks() {
    let (mut pipeline, _script) = scripted_pipeline();
    let request = TickRequest {
        device_id: "SensorABC123",
        mode: OutputMode::Depth,
    };
    for _ in 0..5 {
        pipeline.tick(&request);
    }
    assert_eq!(pipeline.execute_count(), 5);
}
