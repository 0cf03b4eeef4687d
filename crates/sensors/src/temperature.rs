/*
 * SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

// src/temperature.rs
// Temperature probes.
//
// The real probe reads the SoC thermal zone from sysfs (millidegrees
// Celsius). The simulated probe exists for boxes without one -- dev
// machines, CI -- and reports itself as such so telemetry can carry
// the sensor_type honestly.

use std::fs;
use std::path::PathBuf;

use rand::Rng;

use crate::errors::SensorError;

const DEFAULT_THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

// TemperatureProbe is the seam between the telemetry sampler and the
// hardware.
pub trait TemperatureProbe: Send + Sync {
    // sample reads one temperature in degrees Celsius.
    fn sample(&self) -> Result<f64, SensorError>;

    // kind names the probe in telemetry ("CPU" or "Simulated").
    fn kind(&self) -> &'static str;
}

// CpuThermalZone reads the SoC temperature the kernel exposes in
// sysfs.
pub struct CpuThermalZone {
    path: PathBuf,
}

impl CpuThermalZone {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_THERMAL_ZONE),
        }
    }

    // with_path points the probe at a different zone file (other
    // zones, tests).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for CpuThermalZone {
    fn default() -> Self {
        Self::new()
    }
}

impl TemperatureProbe for CpuThermalZone {
    fn sample(&self) -> Result<f64, SensorError> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| SensorError::io(&self.path, e))?;
        let millidegrees: i64 = contents
            .trim()
            .parse()
            .map_err(|_| SensorError::parse(&self.path, format!("'{}'", contents.trim())))?;
        Ok(round2(millidegrees as f64 / 1000.0))
    }

    fn kind(&self) -> &'static str {
        "CPU"
    }
}

// SimulatedProbe returns plausible CPU temperatures for machines
// without a thermal zone.
#[derive(Default)]
pub struct SimulatedProbe;

impl TemperatureProbe for SimulatedProbe {
    fn sample(&self) -> Result<f64, SensorError> {
        let mut rng = rand::rng();
        Ok(round2(rng.random_range(40.0..60.0)))
    }

    fn kind(&self) -> &'static str {
        "Simulated"
    }
}

// placeholder_humidity is a fixed reading until a real hygrometer is
// wired in.
// TODO: read a DHT22 over GPIO once the hardware lands.
pub fn placeholder_humidity() -> f64 {
    45.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
