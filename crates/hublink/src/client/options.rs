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

// src/client/options.rs
// Configuration options and credentials for the hub client.

use std::fmt;

use tokio::time::Duration;

use crate::errors::HubLinkError;

pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);
pub const DEFAULT_TLS_PORT: u16 = 8883;
pub const DEFAULT_TCP_PORT: u16 = 1883;
pub const DEFAULT_SAS_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 1;
pub const DEFAULT_CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

// ClientOptions are optional parameters that can be passed to the
// client, all of which have default fallbacks. The defaults preserve
// the source behavior of a single connect attempt whose failure
// propagates to the caller; retry is opt-in.
#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
    // keep_alive sets the MQTT keepalive for the broker session.
    // Defaults to DEFAULT_KEEP_ALIVE.
    pub keep_alive: Option<Duration>,
    // port overrides the broker port. Defaults to DEFAULT_TLS_PORT
    // when a tls_config is present, DEFAULT_TCP_PORT otherwise.
    pub port: Option<u16>,
    // sas_ttl is the lifetime of the generated SAS token.
    // Defaults to DEFAULT_SAS_TTL.
    pub sas_ttl: Option<Duration>,
    // connect_attempts is the number of times connect() will try to
    // reach the broker before giving up. The final failure is always
    // returned to the caller. Defaults to DEFAULT_CONNECT_ATTEMPTS.
    pub connect_attempts: Option<u32>,
    // connect_retry_delay is the pause between connect attempts.
    // Defaults to DEFAULT_CONNECT_RETRY_DELAY.
    pub connect_retry_delay: Option<Duration>,
    // channel_capacity bounds the channels that deliver desired
    // patches and method requests to the agent, and the underlying
    // MQTT request queue. Defaults to DEFAULT_CHANNEL_CAPACITY.
    pub channel_capacity: Option<usize>,
    // operation_timeout bounds correlated twin round trips (GET and
    // reported PATCH). Defaults to DEFAULT_OPERATION_TIMEOUT.
    pub operation_timeout: Option<Duration>,
    // tls_config is an optional TLS configuration for the broker
    // session. This is required for real hub endpoints and omitted
    // for local plaintext brokers.
    pub tls_config: Option<ClientTlsConfig>,
}

impl ClientOptions {
    // Builder methods that consume and return Self.
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = Some(keep_alive);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_sas_ttl(mut self, ttl: Duration) -> Self {
        self.sas_ttl = Some(ttl);
        self
    }

    pub fn with_connect_attempts(mut self, attempts: u32) -> Self {
        self.connect_attempts = Some(attempts.max(1));
        self
    }

    pub fn with_connect_retry_delay(mut self, delay: Duration) -> Self {
        self.connect_retry_delay = Some(delay);
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    pub fn with_tls_config(mut self, tls_config: ClientTlsConfig) -> Self {
        self.tls_config = Some(tls_config);
        self
    }

    // effective_port resolves the port, falling back to the scheme
    // default for the configured transport.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.tls_config.is_some() {
            DEFAULT_TLS_PORT
        } else {
            DEFAULT_TCP_PORT
        })
    }
}

// ClientTlsConfig is config for using TLS with the broker.
#[derive(Clone, Debug)]
pub struct ClientTlsConfig {
    // ca_certificate is PEM/DER bytes for a CA certificate (or CA
    // certificate bundle); it is intended these were probably loaded
    // from a file, but could have also been provided over the wire.
    pub ca_certificate: Vec<u8>,
}

// ClientCredentials identify one device against one hub. Parsed from
// the `HostName=...;DeviceId=...;SharedAccessKey=...` connection
// string format the hub hands out. The string itself is supplied out
// of band (environment or config), never hard-coded.
#[derive(Clone)]
pub struct ClientCredentials {
    pub hostname: String,
    pub device_id: String,
    pub shared_access_key: String,
}

impl ClientCredentials {
    // from_connection_string parses the semicolon-delimited key=value
    // connection string. All three fields are required; anything else
    // in the string is ignored.
    pub fn from_connection_string(connection_string: &str) -> Result<Self, HubLinkError> {
        let mut hostname = None;
        let mut device_id = None;
        let mut shared_access_key = None;

        for part in connection_string.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let Some((key, value)) = part.split_once('=') else {
                return Err(HubLinkError::malformed_connection_string(format!(
                    "segment without '=': '{part}'"
                )));
            };
            match key {
                "HostName" => hostname = Some(value.to_string()),
                "DeviceId" => device_id = Some(value.to_string()),
                // The shared access key is base64 and may itself
                // contain '=' padding, so only the first '=' splits.
                "SharedAccessKey" => shared_access_key = Some(value.to_string()),
                _ => {}
            }
        }

        let hostname = hostname
            .ok_or_else(|| HubLinkError::malformed_connection_string("missing HostName"))?;
        let device_id = device_id
            .ok_or_else(|| HubLinkError::malformed_connection_string("missing DeviceId"))?;
        let shared_access_key = shared_access_key
            .ok_or_else(|| HubLinkError::malformed_connection_string("missing SharedAccessKey"))?;

        Ok(Self {
            hostname,
            device_id,
            shared_access_key,
        })
    }
}

// The access key never goes to logs.
impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("hostname", &self.hostname)
            .field("device_id", &self.device_id)
            .field("shared_access_key", &"<redacted>")
            .finish()
    }
}
