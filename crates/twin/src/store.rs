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

// src/store.rs
// The local twin view.
//
// One flat map: desired keys stored verbatim, reported keys stored
// under the `reported_` prefix. The hub's protocol-internal keys
// ($metadata, $version) are filtered on load and never stored.
//
// Known ambiguity, kept as-is from the source behavior: a literal
// desired key named `reported_x` lands on the same slot as the
// merged reported value of `x`. Last write wins; the merge logs a
// warning when it happens.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::value::TwinValue;

pub const REPORTED_PREFIX: &str = "reported_";

// The hub's twin bookkeeping keys, excluded from the local store.
const SYSTEM_KEYS: [&str; 2] = ["$metadata", "$version"];

fn is_system_key(key: &str) -> bool {
    SYSTEM_KEYS.contains(&key)
}

// TwinDocument is the remote twin as fetched from the hub.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TwinDocument {
    #[serde(default)]
    pub desired: Map<String, Value>,
    #[serde(default)]
    pub reported: Map<String, Value>,
}

impl TwinDocument {
    // from_value accepts both document nestings the hub has been
    // seen to produce: {"desired": ..., "reported": ...} and
    // {"properties": {"desired": ..., "reported": ...}}.
    pub fn from_value(value: &Value) -> Self {
        let root = value.get("properties").unwrap_or(value);
        let section = |name: &str| -> Map<String, Value> {
            root.get(name)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default()
        };
        Self {
            desired: section("desired"),
            reported: section("reported"),
        }
    }
}

// TwinStore is the in-memory settings map shared by the loops and
// the command handlers. It is plain data: callers guard it with a
// mutex and never hold the lock across an await.
#[derive(Debug, Default, Clone)]
pub struct TwinStore {
    settings: HashMap<String, TwinValue>,
}

impl TwinStore {
    pub fn new() -> Self {
        Self::default()
    }

    // set_desired records a desired-side value under its own key.
    pub fn set_desired(&mut self, key: &str, value: TwinValue) {
        self.settings.insert(key.to_string(), value);
    }

    // set_reported records a reported-side value under the prefixed
    // key. Only called after the corresponding push to the hub
    // succeeded; the local reported view must never run ahead of the
    // hub.
    pub fn set_reported(&mut self, key: &str, value: TwinValue) {
        self.settings.insert(format!("{REPORTED_PREFIX}{key}"), value);
    }

    pub fn get(&self, key: &str) -> Option<&TwinValue> {
        self.settings.get(key)
    }

    // reported looks up the reported-side mirror of a key.
    pub fn reported(&self, key: &str) -> Option<&TwinValue> {
        self.settings.get(&format!("{REPORTED_PREFIX}{key}"))
    }

    // bool_setting reads a boolean setting with a fallback.
    pub fn bool_setting(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(TwinValue::as_bool).unwrap_or(default)
    }

    // int_setting reads an integer setting with a fallback.
    pub fn int_setting(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(TwinValue::as_i64).unwrap_or(default)
    }

    // merge_document folds a fetched twin into the local view:
    // desired keys verbatim, reported keys prefixed, system keys
    // dropped. Non-scalar values are logged and skipped.
    pub fn merge_document(&mut self, document: &TwinDocument) {
        for (key, raw) in &document.desired {
            if is_system_key(key) {
                continue;
            }
            let Some(value) = TwinValue::from_json(raw) else {
                debug!("Skipping non-scalar desired key '{key}'");
                continue;
            };
            if key.starts_with(REPORTED_PREFIX) && self.settings.contains_key(key) {
                warn!("Desired key '{key}' collides with a merged reported value; overwriting");
            }
            self.settings.insert(key.clone(), value);
        }
        for (key, raw) in &document.reported {
            if is_system_key(key) {
                continue;
            }
            let Some(value) = TwinValue::from_json(raw) else {
                debug!("Skipping non-scalar reported key '{key}'");
                continue;
            };
            let prefixed = format!("{REPORTED_PREFIX}{key}");
            if self.settings.contains_key(&prefixed) && document.desired.contains_key(&prefixed) {
                warn!("Reported key '{key}' collides with desired key '{prefixed}'; overwriting");
            }
            self.settings.insert(prefixed, value);
        }
    }

    // reported_view returns the reported-side settings with the
    // prefix stripped, the shape pushed to (and fetched from) the
    // hub.
    pub fn reported_view(&self) -> Map<String, Value> {
        self.settings
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(REPORTED_PREFIX)
                    .map(|stripped| (stripped.to_string(), Value::from(value)))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}
