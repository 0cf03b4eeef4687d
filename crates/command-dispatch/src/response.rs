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

// src/response.rs
// Command request/response types and payload field helpers.

use serde::Serialize;
use serde_json::{Value, json};

// Two status families: success and caller error. Unknown commands
// and validation failures both land in the 400 family.
pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;

// CommandRequest is one remote invocation: a name from an open set
// plus an untyped payload.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub name: String,
    pub payload: Value,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

// CommandResponse is the single structured answer to a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResponse {
    pub status: u16,
    pub payload: Value,
}

impl CommandResponse {
    pub fn ok(payload: Value) -> Self {
        Self {
            status: STATUS_OK,
            payload,
        }
    }

    // message is the common success shape: {"message": "..."}.
    pub fn message(text: impl Into<String>) -> Self {
        Self::ok(json!({"message": text.into()}))
    }

    pub fn bad_request(payload: Value) -> Self {
        Self {
            status: STATUS_BAD_REQUEST,
            payload,
        }
    }

    // unknown_command is the mandatory answer for an unrecognized
    // name: an error payload naming the offender, never a crash.
    pub fn unknown_command(name: &str) -> Self {
        Self::bad_request(json!({"error": format!("Unknown command: {name}")}))
    }

    // invalid_payload answers a recognized command whose payload
    // failed validation.
    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        Self::bad_request(json!({"error": reason.into()}))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// i64_field extracts an integer payload field.
pub fn i64_field(payload: &Value, key: &str) -> Option<i64> {
    payload.get(key).and_then(Value::as_i64)
}

// str_field extracts a string payload field.
pub fn str_field<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}
