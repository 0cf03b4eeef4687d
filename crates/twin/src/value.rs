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

// src/value.rs
// Scalar twin setting values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// TwinValue is one scalar configuration value: boolean, integer, or
// string. The twin surface is deliberately flat; anything structured
// belongs in telemetry, not configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TwinValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl TwinValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    // from_json converts a raw JSON value if it is one of the
    // supported scalars. Non-scalar patch values are rejected here
    // and dropped by the caller.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_i64().map(Self::Integer),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<bool> for TwinValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for TwinValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for TwinValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TwinValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&TwinValue> for Value {
    fn from(value: &TwinValue) -> Self {
        match value {
            TwinValue::Bool(b) => Value::from(*b),
            TwinValue::Integer(i) => Value::from(*i),
            TwinValue::Text(s) => Value::from(s.as_str()),
        }
    }
}
