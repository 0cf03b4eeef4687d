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

// src/lib.rs
// Main exports for the sensor inputs library.
//
// Everything physical lives here: CPU temperature from sysfs,
// the humidity placeholder, the GPIO presence pin, and the
// edge-watcher/debouncer pair that turns raw pin chatter into
// confirmed presence transitions.

pub mod edge;
pub mod errors;
pub mod gpio;
pub mod temperature;

pub use edge::{Debouncer, EdgeEvent, EdgeWatcher, DEFAULT_QUIET_PERIOD};
pub use errors::SensorError;
pub use gpio::{PresenceInput, SimulatedPin, SysfsGpioPin};
pub use temperature::{
    CpuThermalZone, SimulatedProbe, TemperatureProbe, placeholder_humidity,
};
