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

// src/consumer.rs
// The event-triggered publisher: consumes raw edges off the bounded
// channel, debounces them, and emits one presence_change message per
// confirmed transition.
//
// Gate order matters: while logging_enabled is false the edge is
// observed and discarded before it reaches the debouncer, so no
// message goes out and the pre-toggle presence value survives until
// logging resumes.

use std::sync::{Arc, Mutex};

use agent_core::TelemetrySink;
use hublink::TelemetryMessage;
use sensors::{Debouncer, EdgeEvent};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use twin::TwinStore;

use crate::state::PresenceState;

// run_presence_consumer processes edges until the close signal.
pub async fn run_presence_consumer(
    mut events: mpsc::Receiver<EdgeEvent>,
    mut debouncer: Debouncer,
    store: Arc<Mutex<TwinStore>>,
    presence: PresenceState,
    sink: Arc<dyn TelemetrySink>,
    device_id: String,
    mut close: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = close.changed() => break,
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else { break };

                let logging_enabled = store
                    .lock()
                    .unwrap()
                    .bool_setting("logging_enabled", true);
                if !logging_enabled {
                    debug!("Edge observed while logging disabled; ignored");
                    continue;
                }

                let Some(is_present) = debouncer.observe(event) else {
                    continue;
                };

                let status = if is_present { "present" } else { "absent" };
                info!("Presence changed: {status}");

                let message = TelemetryMessage::event(device_id.clone(), "presence_change")
                    .with_field("presence_status", status)
                    .with_field("is_present", is_present);
                if let Err(e) = sink.send(&message).await {
                    warn!("Presence update send failed: {e}");
                }
                presence.set(is_present);
            }
        }
    }
    debug!("Presence consumer stopped");
}
