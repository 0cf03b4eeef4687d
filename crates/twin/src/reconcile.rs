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

// src/reconcile.rs
// Twin reconciliation: desired patches in, reported state out.
//
// The invariant enforced here: for any key with a registered side
// effect, consuming its desired value and pushing the reported
// mirror happen in the same logical operation, in order -- desired
// stored, action run, reported pushed to the hub, reported stored
// locally. A failure at any step propagates; the local reported view
// is only updated after the hub acknowledged the push.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::actions::ActionRegistry;
use crate::errors::TwinError;
use crate::store::{TwinDocument, TwinStore};
use crate::value::TwinValue;

// TwinChannel is the seam to the hub: fetching the remote twin and
// pushing reported properties. The connected client implements it;
// tests substitute a recording fake.
#[async_trait]
pub trait TwinChannel: Send + Sync {
    async fn fetch_twin(&self) -> Result<TwinDocument, TwinError>;
    async fn push_reported(&self, properties: &Map<String, Value>) -> Result<(), TwinError>;
}

// TwinReconciler drives the store from hub-side events.
pub struct TwinReconciler {
    store: Arc<Mutex<TwinStore>>,
    actions: ActionRegistry,
    channel: Arc<dyn TwinChannel>,
}

impl TwinReconciler {
    pub fn new(store: Arc<Mutex<TwinStore>>, channel: Arc<dyn TwinChannel>) -> Self {
        Self {
            store,
            actions: ActionRegistry::new(),
            channel,
        }
    }

    // with_action registers a side effect for a desired key,
    // builder-style.
    pub fn with_action<F, Fut>(mut self, key: impl Into<String>, action: F) -> Self
    where
        F: Fn(TwinValue) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), TwinError>> + Send + 'static,
    {
        self.actions.register(key, action);
        self
    }

    pub fn store(&self) -> Arc<Mutex<TwinStore>> {
        self.store.clone()
    }

    // load_full_twin fetches the remote twin and merges both
    // namespaces into the local store.
    pub async fn load_full_twin(&self) -> Result<(), TwinError> {
        let document = self.channel.fetch_twin().await?;
        let mut store = self.store.lock().unwrap();
        store.merge_document(&document);
        info!(settings = store.len(), "Device twin loaded");
        Ok(())
    }

    // apply_desired_patch consumes one desired-property patch from
    // the hub. Per key: store the desired value, run the registered
    // side effect if any, then mirror the value back as reported.
    // Keys without an action are stored and nothing is pushed. A
    // malformed (non-scalar) value drops that single key and the
    // patch continues; a failed action or push aborts with an error.
    pub async fn apply_desired_patch(&self, patch: &Map<String, Value>) -> Result<(), TwinError> {
        for (key, raw) in patch {
            if key.starts_with('$') {
                continue;
            }
            let Some(value) = TwinValue::from_json(raw) else {
                warn!("Dropping non-scalar desired value for key '{key}'");
                continue;
            };

            self.store.lock().unwrap().set_desired(key, value.clone());
            debug!("Desired '{key}' updated");

            let Some(action) = self.actions.get(key) else {
                continue;
            };
            action(value.clone()).await?;

            let mut properties = Map::new();
            properties.insert(key.clone(), raw.clone());
            self.channel.push_reported(&properties).await?;
            self.store.lock().unwrap().set_reported(key, value);
            info!("Reported '{key}' mirrored to hub");
        }
        Ok(())
    }

    // push_reported sends explicit reported properties (initial
    // status pushes, command-driven updates) and records them
    // locally once the hub acknowledged.
    pub async fn push_reported(&self, properties: &Map<String, Value>) -> Result<(), TwinError> {
        self.channel.push_reported(properties).await?;
        let mut store = self.store.lock().unwrap();
        for (key, raw) in properties {
            if let Some(value) = TwinValue::from_json(raw) {
                store.set_reported(key, value);
            }
        }
        Ok(())
    }
}
