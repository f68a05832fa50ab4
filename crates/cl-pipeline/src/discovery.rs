//! Plattform‑ und Geräteinventar plus Auswahlregel.

use std::fmt::Write as _;

use opencl3::{
    device::{CL_DEVICE_TYPE_ALL, Device},
    platform::get_platforms,
    types::cl_device_id,
};
use tracing::debug;

use crate::error::{DEVICE_NOT_FOUND, PLATFORM_NOT_FOUND_KHR, PipelineError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceEntry {
    pub id: cl_device_id,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformEntry {
    pub name: String,
    pub devices: Vec<DeviceEntry>,
}

/// Alle Plattformen in Aufzählungsreihenfolge
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    pub platforms: Vec<PlatformEntry>,
}

/// zählt alle Plattformen und deren Geräte (Typ ALL) auf
pub fn enumerate() -> Result<Inventory> {
    let platforms = match get_platforms() {
        Ok(p) => p,
        Err(e) if e.0 == PLATFORM_NOT_FOUND_KHR => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    if platforms.is_empty() {
        return Err(PipelineError::NoPlatforms);
    }

    let mut inventory = Inventory::default();
    for platform in platforms {
        let name = platform.name()?;
        let ids = match platform.get_devices(CL_DEVICE_TYPE_ALL) {
            Ok(ids) => ids,
            Err(e) if e.0 == DEVICE_NOT_FOUND => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let mut devices = Vec::with_capacity(ids.len());
        for id in ids {
            devices.push(DeviceEntry { id, name: Device::new(id).name()? });
        }
        debug!(platform = %name, devices = devices.len(), "platform enumerated");
        inventory.platforms.push(PlatformEntry { name, devices });
    }
    Ok(inventory)
}

impl Inventory {
    /// Konsolen‑Inventar, unabhängig vom Auswahlergebnis
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Found {} platform(s)", self.platforms.len());
        for p in &self.platforms {
            let _ = writeln!(out, "Platform: {}", p.name);
            let _ = writeln!(out, "Devices found: {}", p.devices.len());
            for d in &p.devices {
                let _ = writeln!(out, "\tdevice: {}", d.name);
            }
        }
        out
    }

    /// erstes Gerät der ersten Plattform mit mindestens einem Gerät;
    /// Gerätetyp spielt keine Rolle
    pub fn select_first(&self) -> Result<&DeviceEntry> {
        self.platforms
            .iter()
            .find_map(|p| p.devices.first())
            .ok_or(PipelineError::NoDevices)
    }

    pub fn device_count(&self) -> usize {
        self.platforms.iter().map(|p| p.devices.len()).sum()
    }
}
