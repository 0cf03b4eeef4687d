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

// src/errors.rs
// Error types for the hublink device client.
//
// Three broad families, matching how callers are expected to react:
// transport errors (connect/send/twin round trips), credential errors
// (connection string / SAS signing), and parse errors (payloads and
// topics that don't match the hub conventions).

use thiserror::Error;

// HubLinkError is the error type for all hublink operations.
#[derive(Error, Debug)]
pub enum HubLinkError {
    // Request-side failures from the underlying MQTT client
    // (publish/subscribe/disconnect requests).
    #[error("MQTT connection error: {0}")]
    ConnectionError(#[from] rumqttc::ClientError),

    // Failures while polling the connection itself (TCP, TLS,
    // keepalive, broker going away).
    #[error("MQTT transport error: {0}")]
    TransportError(#[from] rumqttc::ConnectionError),

    // The broker accepted the TCP session but refused the MQTT
    // connection (bad credentials, unknown device, etc.).
    #[error("Connection refused by broker: {0}")]
    ConnectionRefused(String),

    #[error("JSON serialization error: {0}")]
    JsonSerializationError(#[from] serde_json::Error),

    // Deserialization failures get their own variant so callers can
    // tell "we couldn't build the message" from "the hub sent us
    // something unreadable".
    #[error("JSON deserialization error: {0}")]
    JsonDeserializationError(serde_json::Error),

    #[error("Malformed connection string: {0}")]
    MalformedConnectionString(String),

    #[error("SAS token signing error: {0}")]
    SasSigningError(String),

    // An inbound topic that matched none of the hub conventions we
    // subscribe to.
    #[error("Malformed topic: {0}")]
    MalformedTopic(String),

    // A twin GET or reported-property PATCH that never got its
    // correlated response back.
    #[error("Timed out waiting for twin response (rid {rid})")]
    TwinRequestTimeout { rid: u64 },

    // A twin GET that came back with a non-success status.
    #[error("Twin request failed with status {status}")]
    TwinRequestFailed { status: u16 },

    // A reported-property push that did not reach the hub. Spelled
    // out as its own variant because callers must treat a dropped
    // push as a desync, never as a soft failure.
    #[error("Failed to push reported properties: {0}")]
    ReportPushError(String),

    // An internal channel (event routing, response correlation) was
    // dropped before the operation completed.
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

impl HubLinkError {
    // malformed_connection_string creates a credentials-parse error.
    pub fn malformed_connection_string(message: impl Into<String>) -> Self {
        Self::MalformedConnectionString(message.into())
    }

    // sas_signing_error creates a SAS token generation error.
    pub fn sas_signing_error(message: impl Into<String>) -> Self {
        Self::SasSigningError(message.into())
    }

    // malformed_topic creates a topic-parse error.
    pub fn malformed_topic(topic: impl Into<String>) -> Self {
        Self::MalformedTopic(topic.into())
    }

    // report_push_error creates a reported-property push failure.
    pub fn report_push_error(message: impl Into<String>) -> Self {
        Self::ReportPushError(message.into())
    }

    // channel_closed creates an internal channel failure.
    pub fn channel_closed(message: impl Into<String>) -> Self {
        Self::ChannelClosed(message.into())
    }

    // is_transport_error checks if this error came from the wire
    // (connect, poll, publish, or a twin round trip that never
    // completed).
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError(_)
                | Self::TransportError(_)
                | Self::ConnectionRefused(_)
                | Self::TwinRequestTimeout { .. }
                | Self::TwinRequestFailed { .. }
                | Self::ReportPushError(_)
                | Self::ChannelClosed(_)
        )
    }

    // is_parse_error checks if this error came from malformed data
    // rather than the wire.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::JsonSerializationError(_)
                | Self::JsonDeserializationError(_)
                | Self::MalformedTopic(_)
        )
    }

    // is_credentials_error checks if this error came from credential
    // handling (connection string or SAS signing).
    pub fn is_credentials_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedConnectionString(_) | Self::SasSigningError(_)
        )
    }

    // is_report_push_error checks for the dropped-reported-push case
    // that callers must surface rather than swallow.
    pub fn is_report_push_error(&self) -> bool {
        matches!(self, Self::ReportPushError(_))
    }
}
