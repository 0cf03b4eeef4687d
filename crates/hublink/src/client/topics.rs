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

// src/client/topics.rs
// Topic builders and inbound topic routing for the hub MQTT
// conventions.
//
// The hub multiplexes telemetry, twin synchronization, and direct
// methods over a fixed topic scheme; request/response pairs are
// correlated through a $rid query parameter. Everything the client
// sends or matches on the wire is defined here.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::HubLinkError;

// Subscription filters covering everything the hub pushes at a device.
pub const TWIN_RESPONSE_FILTER: &str = "$iothub/twin/res/#";
pub const DESIRED_PATCH_FILTER: &str = "$iothub/twin/PATCH/properties/desired/#";
pub const METHOD_REQUEST_FILTER: &str = "$iothub/methods/POST/#";

static TWIN_RESPONSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$iothub/twin/res/(\d+)/\?\$rid=(\d+)").expect("static pattern"));
static DESIRED_PATCH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$iothub/twin/PATCH/properties/desired/(?:\?\$version=(\d+))?")
        .expect("static pattern")
});
static METHOD_REQUEST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$iothub/methods/POST/([^/]+)/\?\$rid=(.+)$").expect("static pattern")
});

// telemetry_topic builds the device-to-cloud events topic with the
// message metadata carried as a property bag: unique message id,
// content type, and content encoding.
pub fn telemetry_topic(device_id: &str, message_id: &str) -> String {
    format!(
        "devices/{device_id}/messages/events/$.mid={message_id}&$.ct=application%2Fjson&$.ce=utf-8"
    )
}

// twin_get_topic builds the topic that requests the full twin
// document; the response arrives on $iothub/twin/res with the same
// rid.
pub fn twin_get_topic(rid: u64) -> String {
    format!("$iothub/twin/GET/?$rid={rid}")
}

// twin_patch_reported_topic builds the topic that pushes reported
// properties; the ack arrives on $iothub/twin/res with the same rid.
pub fn twin_patch_reported_topic(rid: u64) -> String {
    format!("$iothub/twin/PATCH/properties/reported/?$rid={rid}")
}

// method_response_topic builds the topic that answers a direct
// method request. Method rids are opaque strings minted by the hub
// and must be echoed back verbatim.
pub fn method_response_topic(status: u16, rid: &str) -> String {
    format!("$iothub/methods/res/{status}/?$rid={rid}")
}

// InboundTopic classifies a topic the hub published to us.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundTopic {
    // A correlated response to a twin GET or reported PATCH.
    TwinResponse { status: u16, rid: u64 },
    // A desired-property patch pushed by the hub.
    DesiredPatch { version: Option<i64> },
    // A direct method invocation.
    MethodRequest { name: String, rid: String },
}

// parse_inbound routes an inbound topic to its message class.
// First-match-wins over the three conventions we subscribe to; a
// topic matching none of them is a parse error, which callers log
// and drop.
pub fn parse_inbound(topic: &str) -> Result<InboundTopic, HubLinkError> {
    if let Some(caps) = TWIN_RESPONSE_RE.captures(topic) {
        let status = caps[1]
            .parse::<u16>()
            .map_err(|_| HubLinkError::malformed_topic(topic))?;
        let rid = caps[2]
            .parse::<u64>()
            .map_err(|_| HubLinkError::malformed_topic(topic))?;
        return Ok(InboundTopic::TwinResponse { status, rid });
    }

    if let Some(caps) = DESIRED_PATCH_RE.captures(topic) {
        let version = caps.get(1).and_then(|v| v.as_str().parse::<i64>().ok());
        return Ok(InboundTopic::DesiredPatch { version });
    }

    if let Some(caps) = METHOD_REQUEST_RE.captures(topic) {
        return Ok(InboundTopic::MethodRequest {
            name: caps[1].to_string(),
            rid: caps[2].to_string(),
        });
    }

    Err(HubLinkError::malformed_topic(topic))
}
