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

// src/channel.rs
// Seams between the runtime and the connected hub session.
//
// The loops and pumps talk to traits, not to HubClient, so every
// piece of the runtime runs under test against recording fakes.
// HubChannel is the one production implementation, delegating to the
// live session.

use std::sync::Arc;

use async_trait::async_trait;
use hublink::{HubClient, HubLinkError, TelemetryMessage};
use serde_json::{Map, Value};
use twin::{TwinChannel, TwinDocument, TwinError};

// TelemetrySink sends one fire-and-forget telemetry message.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn send(&self, message: &TelemetryMessage) -> Result<(), HubLinkError>;
}

// CommandLink answers direct method requests.
#[async_trait]
pub trait CommandLink: Send + Sync {
    async fn respond(&self, rid: &str, status: u16, payload: &Value)
    -> Result<(), HubLinkError>;
}

// HubChannel adapts a live HubClient to all the runtime seams.
pub struct HubChannel {
    client: Arc<HubClient>,
}

impl HubChannel {
    pub fn new(client: Arc<HubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TelemetrySink for HubChannel {
    async fn send(&self, message: &TelemetryMessage) -> Result<(), HubLinkError> {
        self.client.send_telemetry(message).await
    }
}

#[async_trait]
impl CommandLink for HubChannel {
    async fn respond(
        &self,
        rid: &str,
        status: u16,
        payload: &Value,
    ) -> Result<(), HubLinkError> {
        self.client.respond_to_method(rid, status, payload).await
    }
}

#[async_trait]
impl TwinChannel for HubChannel {
    async fn fetch_twin(&self) -> Result<TwinDocument, TwinError> {
        let value = self
            .client
            .get_twin()
            .await
            .map_err(|e| TwinError::twin_fetch(e.to_string()))?;
        Ok(TwinDocument::from_value(&value))
    }

    async fn push_reported(&self, properties: &Map<String, Value>) -> Result<(), TwinError> {
        self.client
            .patch_reported(properties)
            .await
            .map_err(|e| TwinError::report_push(e.to_string()))
    }
}
