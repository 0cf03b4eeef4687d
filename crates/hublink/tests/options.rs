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

// tests/options.rs
// Unit tests for client options and connection string parsing.

use hublink::{ClientCredentials, ClientOptions, ClientTlsConfig};
use tokio::time::Duration;

#[test]
fn connection_string_parses_all_three_fields() {
    let credentials = ClientCredentials::from_connection_string(
        "HostName=hub.example.net;DeviceId=PresenceDetector;SharedAccessKey=c2VjcmV0a2V5",
    )
    .unwrap();
    assert_eq!(credentials.hostname, "hub.example.net");
    assert_eq!(credentials.device_id, "PresenceDetector");
    assert_eq!(credentials.shared_access_key, "c2VjcmV0a2V5");
}

#[test]
fn connection_string_key_keeps_base64_padding() {
    // The '=' padding inside the key value must survive parsing.
    let credentials = ClientCredentials::from_connection_string(
        "HostName=h;DeviceId=d;SharedAccessKey=YWJjZA==",
    )
    .unwrap();
    assert_eq!(credentials.shared_access_key, "YWJjZA==");
}

#[test]
fn connection_string_missing_field_is_rejected() {
    let err =
        ClientCredentials::from_connection_string("HostName=h;SharedAccessKey=x").unwrap_err();
    assert!(err.is_credentials_error());
    assert!(format!("{err}").contains("DeviceId"));
}

#[test]
fn connection_string_segment_without_equals_is_rejected() {
    let err = ClientCredentials::from_connection_string("HostName=h;garbage").unwrap_err();
    assert!(err.is_credentials_error());
}

#[test]
fn unknown_segments_are_ignored() {
    let credentials = ClientCredentials::from_connection_string(
        "HostName=h;DeviceId=d;SharedAccessKey=k;GatewayHostName=edge",
    )
    .unwrap();
    assert_eq!(credentials.device_id, "d");
}

#[test]
fn debug_redacts_the_access_key() {
    let credentials =
        ClientCredentials::from_connection_string("HostName=h;DeviceId=d;SharedAccessKey=topsecret")
            .unwrap();
    let debug = format!("{credentials:?}");
    assert!(!debug.contains("topsecret"));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn port_defaults_follow_transport() {
    let plain = ClientOptions::default();
    assert_eq!(plain.effective_port(), 1883);

    let tls = ClientOptions::default().with_tls_config(ClientTlsConfig {
        ca_certificate: Vec::new(),
    });
    assert_eq!(tls.effective_port(), 8883);

    let pinned = ClientOptions::default().with_port(1884);
    assert_eq!(pinned.effective_port(), 1884);
}

#[test]
fn builder_methods_accumulate() {
    let options = ClientOptions::default()
        .with_keep_alive(Duration::from_secs(15))
        .with_connect_attempts(3)
        .with_connect_retry_delay(Duration::from_millis(250))
        .with_operation_timeout(Duration::from_secs(5))
        .with_channel_capacity(64);
    assert_eq!(options.keep_alive, Some(Duration::from_secs(15)));
    assert_eq!(options.connect_attempts, Some(3));
    assert_eq!(options.connect_retry_delay, Some(Duration::from_millis(250)));
    assert_eq!(options.operation_timeout, Some(Duration::from_secs(5)));
    assert_eq!(options.channel_capacity, Some(64));
}

#[test]
fn zero_connect_attempts_is_clamped_to_one() {
    let options = ClientOptions::default().with_connect_attempts(0);
    assert_eq!(options.connect_attempts, Some(1));
}
