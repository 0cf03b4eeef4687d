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

// src/message.rs
// Outbound telemetry envelope.
//
// TelemetryMessage is constructed fresh per send, never mutated, and
// discarded after transmission. The wire body is a flat JSON object:
// timestamp and device_id always present, everything else supplied by
// the caller as message-specific fields. The message id travels in
// the topic property bag, not in the body, together with the content
// type and encoding the hub conventions require.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::HubLinkError;

pub const CONTENT_TYPE: &str = "application/json";
pub const CONTENT_ENCODING: &str = "utf-8";

// TelemetryMessage is one device-to-cloud event.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryMessage {
    // message_id uniquely identifies this send; carried as transport
    // metadata rather than in the JSON body.
    #[serde(skip)]
    pub message_id: Uuid,
    // timestamp is the UTC time the message was built, serialized
    // ISO-8601.
    pub timestamp: DateTime<Utc>,
    // device_id names the sending device.
    pub device_id: String,
    // fields carries the message-specific measurements, flattened
    // into the top-level JSON object.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TelemetryMessage {
    // new creates an empty message for a device, stamped now.
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            device_id: device_id.into(),
            fields: Map::new(),
        }
    }

    // event creates a message pre-populated with an event_type field,
    // the shape used by presence changes, heartbeats, and shutdown
    // notices.
    pub fn event(device_id: impl Into<String>, event_type: &str) -> Self {
        Self::new(device_id).with_field("event_type", event_type)
    }

    // with_field adds one message-specific field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    // with_fields merges a map of message-specific fields.
    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields.extend(fields);
        self
    }

    // to_payload serializes the wire body.
    pub fn to_payload(&self) -> Result<Vec<u8>, HubLinkError> {
        Ok(serde_json::to_vec(self)?)
    }
}
