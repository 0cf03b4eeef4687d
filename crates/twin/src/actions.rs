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

// src/actions.rs
// Per-key side effects for desired-property patches.
//
// Registering an action for a key means two things: the action runs
// when the hub patches that key, and the key's new value is mirrored
// back as a reported property afterwards. Keys without an action are
// stored locally and nothing else happens -- that asymmetry is part
// of the twin contract, not an optimization.

use std::collections::HashMap;

use futures::future::BoxFuture;

use crate::errors::TwinError;
use crate::value::TwinValue;

// ErasedAction enables storing side effects for different keys in
// the same collection: type-erased function from the new value to a
// future.
pub type ErasedAction = Box<dyn Fn(TwinValue) -> BoxFuture<'static, Result<(), TwinError>> + Send + Sync>;

// ActionRegistry maps desired-property keys to their side effects.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, ErasedAction>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // register wires a side effect to a key. The closure is called
    // with the patched value each time the hub sends one.
    pub fn register<F, Fut>(&mut self, key: impl Into<String>, action: F)
    where
        F: Fn(TwinValue) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), TwinError>> + Send + 'static,
    {
        self.actions
            .insert(key.into(), Box::new(move |value| Box::pin(action(value))));
    }

    pub fn get(&self, key: &str) -> Option<&ErasedAction> {
        self.actions.get(key)
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.actions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("ActionRegistry").field("keys", &keys).finish()
    }
}
