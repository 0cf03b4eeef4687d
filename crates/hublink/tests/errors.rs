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

// tests/errors.rs
// Unit tests for error creation, categorization, and display.

use hublink::HubLinkError;

fn create_test_json_error() -> serde_json::Error {
    serde_json::from_str::<i32>("not a number").unwrap_err()
}

#[test]
fn json_serialization_error_from_conversion() {
    let err = HubLinkError::from(create_test_json_error());
    match err {
        HubLinkError::JsonSerializationError(_) => {}
        _ => panic!("Should be JsonSerializationError"),
    }
    assert!(err.is_parse_error());
    assert!(!err.is_transport_error());
}

#[test]
fn report_push_error_constructor_and_category() {
    let err = HubLinkError::report_push_error("hub answered status 500");
    assert!(err.is_report_push_error());
    assert!(err.is_transport_error());
    assert!(!err.is_parse_error());

    let display = format!("{err}");
    assert!(display.contains("Failed to push reported properties"));
    assert!(display.contains("500"));
}

#[test]
fn malformed_topic_category() {
    let err = HubLinkError::malformed_topic("$iothub/nope");
    assert!(err.is_parse_error());
    assert!(!err.is_transport_error());
    assert!(format!("{err}").contains("$iothub/nope"));
}

#[test]
fn credentials_errors_category() {
    let parse = HubLinkError::malformed_connection_string("missing HostName");
    let sas = HubLinkError::sas_signing_error("key is not valid base64");
    assert!(parse.is_credentials_error());
    assert!(sas.is_credentials_error());
    assert!(!parse.is_transport_error());
    assert!(format!("{parse}").contains("missing HostName"));
}

#[test]
fn twin_timeout_is_a_transport_error() {
    let err = HubLinkError::TwinRequestTimeout { rid: 3 };
    assert!(err.is_transport_error());
    assert!(format!("{err}").contains("rid 3"));
}

#[test]
fn twin_failed_status_display() {
    let err = HubLinkError::TwinRequestFailed { status: 429 };
    assert!(err.is_transport_error());
    assert!(format!("{err}").contains("429"));
}

// Errors cross task boundaries in the event loop, so they must stay
// Send + Sync.
#[test]
fn errors_are_send_and_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    assert_send::<HubLinkError>();
    assert_sync::<HubLinkError>();
}
