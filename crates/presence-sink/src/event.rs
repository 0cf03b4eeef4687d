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

// src/event.rs
// Presence event parsing.
//
// The known columns are pulled out of the JSON; whatever the device
// sent beyond them rides along as opaque additional_data. A missing
// presence_status makes the event unusable (the column is NOT NULL
// for a reason); a missing or garbled timestamp does not -- the
// receive time stands in, matching the source behavior.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::errors::SinkError;

#[derive(Debug, Clone, PartialEq)]
pub struct PresenceEvent {
    pub device_id: String,
    pub presence_status: String,
    pub is_present: bool,
    pub event_type: String,
    pub event_time: DateTime<Utc>,
    pub additional_data: Option<Map<String, Value>>,
}

// The fields that become real columns; everything else is
// additional_data.
const COLUMN_FIELDS: [&str; 5] = [
    "timestamp",
    "device_id",
    "presence_status",
    "is_present",
    "event_type",
];

impl PresenceEvent {
    // parse builds an event from one raw payload.
    pub fn parse(payload: &[u8]) -> Result<Self, SinkError> {
        let value: Value = serde_json::from_slice(payload)?;
        let Some(object) = value.as_object() else {
            return Err(SinkError::NotAnObject);
        };

        let device_id = object
            .get("device_id")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        let presence_status = object
            .get("presence_status")
            .and_then(Value::as_str)
            .ok_or(SinkError::MissingField("presence_status"))?
            .to_string();
        let is_present = object
            .get("is_present")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let event_type = object
            .get("event_type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let event_time = object
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|ts| ts.parse::<DateTime<Utc>>().ok())
            .unwrap_or_else(Utc::now);

        let additional_data: Map<String, Value> = object
            .iter()
            .filter(|(key, _)| !COLUMN_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let additional_data = if additional_data.is_empty() {
            None
        } else {
            Some(additional_data)
        };

        Ok(Self {
            device_id,
            presence_status,
            is_present,
            event_type,
            event_time,
            additional_data,
        })
    }
}
