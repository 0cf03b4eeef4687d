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

// src/gpio.rs
// GPIO presence pin input.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::SensorError;

// PresenceInput is the seam between the edge watcher and the pin.
pub trait PresenceInput: Send + Sync {
    // is_high reads the current pin level.
    fn is_high(&self) -> Result<bool, SensorError>;
}

// SysfsGpioPin reads an exported GPIO value file. The pin is assumed
// to already be exported and configured as an input (the PIR sensor
// wiring is part of provisioning, not this process).
pub struct SysfsGpioPin {
    value_path: PathBuf,
}

impl SysfsGpioPin {
    // new points at BCM pin N via the sysfs gpio interface.
    pub fn new(pin: u32) -> Self {
        Self {
            value_path: PathBuf::from(format!("/sys/class/gpio/gpio{pin}/value")),
        }
    }

    pub fn with_path(value_path: impl Into<PathBuf>) -> Self {
        Self {
            value_path: value_path.into(),
        }
    }
}

impl PresenceInput for SysfsGpioPin {
    fn is_high(&self) -> Result<bool, SensorError> {
        let contents =
            fs::read_to_string(&self.value_path).map_err(|e| SensorError::io(&self.value_path, e))?;
        match contents.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(SensorError::parse(&self.value_path, format!("'{other}'"))),
        }
    }
}

// SimulatedPin is a settable level for development and tests.
#[derive(Clone, Default)]
pub struct SimulatedPin {
    level: Arc<AtomicBool>,
}

impl SimulatedPin {
    pub fn new(initial: bool) -> Self {
        Self {
            level: Arc::new(AtomicBool::new(initial)),
        }
    }

    pub fn set(&self, level: bool) {
        self.level.store(level, Ordering::SeqCst);
    }
}

impl PresenceInput for SimulatedPin {
    fn is_high(&self) -> Result<bool, SensorError> {
        Ok(self.level.load(Ordering::SeqCst))
    }
}
