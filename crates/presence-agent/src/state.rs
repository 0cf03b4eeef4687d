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

// src/state.rs
// Shared presence state.
//
// Written by exactly one task (the edge consumer), read by the
// heartbeat sampler and the status handler. The mutex is the
// translation of the source's single-scheduler guarantee into a
// preemptive runtime.

use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct PresenceState {
    present: Arc<Mutex<bool>>,
}

impl PresenceState {
    pub fn new(initial: bool) -> Self {
        Self {
            present: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn is_present(&self) -> bool {
        *self.present.lock().unwrap()
    }

    pub fn set(&self, present: bool) {
        *self.present.lock().unwrap() = present;
    }
}
