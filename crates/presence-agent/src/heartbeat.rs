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

// src/heartbeat.rs
// The slow-cycle heartbeat: coarse state once a minute, suppressed
// entirely while logging is disabled.

use std::sync::{Arc, Mutex};

use agent_core::{AgentError, Sampler};
use async_trait::async_trait;
use hublink::TelemetryMessage;
use twin::TwinStore;

use crate::state::PresenceState;

pub struct HeartbeatSampler {
    device_id: String,
    store: Arc<Mutex<TwinStore>>,
    presence: PresenceState,
}

impl HeartbeatSampler {
    pub fn new(
        device_id: String,
        store: Arc<Mutex<TwinStore>>,
        presence: PresenceState,
    ) -> Self {
        Self {
            device_id,
            store,
            presence,
        }
    }
}

#[async_trait]
impl Sampler for HeartbeatSampler {
    async fn sample(&self) -> Result<Option<TelemetryMessage>, AgentError> {
        let logging_enabled = self
            .store
            .lock()
            .unwrap()
            .bool_setting("logging_enabled", true);
        if !logging_enabled {
            return Ok(None);
        }

        Ok(Some(
            TelemetryMessage::event(self.device_id.clone(), "heartbeat")
                .with_field("presence_state", self.presence.is_present())
                .with_field("logging_enabled", logging_enabled),
        ))
    }
}
