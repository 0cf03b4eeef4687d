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

// src/sampler.rs
// Builds one temperature telemetry message per cycle.

use std::sync::{Arc, Mutex};

use agent_core::{AgentError, Sampler};
use async_trait::async_trait;
use hublink::TelemetryMessage;
use sensors::{TemperatureProbe, placeholder_humidity};
use tracing::warn;
use twin::TwinStore;

use crate::INITIAL_BATTERY_LEVEL;

// Reading the probe can fail mid-run (zone unreadable for a cycle);
// the cycle still reports, with this stand-in value.
const FALLBACK_TEMPERATURE: f64 = 45.0;

pub struct ThermalSampler {
    device_id: String,
    probe: Arc<dyn TemperatureProbe>,
    store: Arc<Mutex<TwinStore>>,
}

impl ThermalSampler {
    pub fn new(
        device_id: String,
        probe: Arc<dyn TemperatureProbe>,
        store: Arc<Mutex<TwinStore>>,
    ) -> Self {
        Self {
            device_id,
            probe,
            store,
        }
    }
}

#[async_trait]
impl Sampler for ThermalSampler {
    async fn sample(&self) -> Result<Option<TelemetryMessage>, AgentError> {
        let temperature = match self.probe.sample() {
            Ok(t) => t,
            Err(e) => {
                warn!("Temperature read failed: {e}; using fallback");
                FALLBACK_TEMPERATURE
            }
        };
        let battery_level = self
            .store
            .lock()
            .unwrap()
            .int_setting("battery_level", INITIAL_BATTERY_LEVEL);

        Ok(Some(
            TelemetryMessage::new(self.device_id.clone())
                .with_field("temperature", temperature)
                .with_field("humidity", placeholder_humidity())
                .with_field("battery_level", battery_level)
                .with_field("sensor_type", self.probe.kind()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensors::SimulatedProbe;

    #[tokio::test]
    async fn message_carries_all_thermal_fields() {
        let store = Arc::new(Mutex::new(TwinStore::new()));
        let sampler = ThermalSampler::new(
            "RPiSmartHome".to_string(),
            Arc::new(SimulatedProbe),
            store.clone(),
        );

        let message = sampler.sample().await.unwrap().expect("always reports");
        assert_eq!(message.device_id, "RPiSmartHome");
        assert!(message.fields.contains_key("temperature"));
        assert_eq!(message.fields["humidity"], serde_json::json!(45.0));
        assert_eq!(message.fields["battery_level"], serde_json::json!(31));
        assert_eq!(message.fields["sensor_type"], serde_json::json!("Simulated"));
    }

    #[tokio::test]
    async fn battery_level_tracks_the_twin() {
        let store = Arc::new(Mutex::new(TwinStore::new()));
        store
            .lock()
            .unwrap()
            .set_desired("battery_level", twin::TwinValue::Integer(88));

        let sampler =
            ThermalSampler::new("dev".to_string(), Arc::new(SimulatedProbe), store);
        let message = sampler.sample().await.unwrap().unwrap();
        assert_eq!(message.fields["battery_level"], serde_json::json!(88));
    }
}
