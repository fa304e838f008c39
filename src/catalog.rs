// SPDX-License-Identifier: GPL-3.0-only

//! Depth device enumeration
//!
//! A thin layer over [`SensorLayer::enumerate`] that rejects empty
//! snapshots. Callers that need an active device cannot proceed with zero
//! candidates, so an empty enumeration is surfaced as
//! [`CatalogError::NoDevices`] rather than an empty list.

use tracing::info;

use crate::errors::CatalogError;
use crate::sensor::{SensorDevice, SensorLayer};

/// Enumerate attached depth devices
///
/// Returns one descriptor per attached device, in the sensor layer's
/// order. No side effects beyond querying the underlying device layer.
pub fn enumerate_devices(
    sensor: &mut dyn SensorLayer,
) -> Result<Vec<SensorDevice>, CatalogError> {
    let devices = sensor.enumerate()?;
    if devices.is_empty() {
        return Err(CatalogError::NoDevices);
    }
    for device in &devices {
        info!(id = %device.id, model = %device.model, "Found depth device");
    }
    Ok(devices)
}
