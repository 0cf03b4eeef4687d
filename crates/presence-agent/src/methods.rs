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

// src/methods.rs
// Direct method handlers for the presence agent: get_status and
// shutdown_device.
//
// shutdown_device is the respond-then-wait-then-act case: the caller
// gets the schedule immediately, and only after that response is on
// the wire does the deferred action sleep out the delay, emit the
// final shutdown event, and pull the agent's close signal.

use std::sync::{Arc, Mutex};

use agent_core::TelemetrySink;
use chrono::Utc;
use commands::{CommandDispatcher, CommandOutcome, CommandResponse, i64_field};
use hublink::TelemetryMessage;
use serde_json::{Value, json};
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{info, warn};
use twin::TwinStore;

use crate::state::PresenceState;
use crate::DEFAULT_SENSOR_DELAY_SECONDS;

// The delay used when shutdown_device carries none.
pub const DEFAULT_SHUTDOWN_DELAY_SECONDS: i64 = 10;

// build_dispatcher wires the presence agent's command surface.
pub fn build_dispatcher(
    device_id: String,
    store: Arc<Mutex<TwinStore>>,
    presence: PresenceState,
    sink: Arc<dyn TelemetrySink>,
    close: Arc<watch::Sender<bool>>,
) -> CommandDispatcher {
    let mut dispatcher = CommandDispatcher::new();

    let status_store = store.clone();
    let status_presence = presence.clone();
    dispatcher.register("get_status", move |_payload: Value| {
        let store = status_store.clone();
        let presence = status_presence.clone();
        async move {
            let (logging_enabled, sensor_delay) = {
                let store = store.lock().unwrap();
                (
                    store.bool_setting("logging_enabled", true),
                    store.int_setting("sensor_delay", DEFAULT_SENSOR_DELAY_SECONDS),
                )
            };
            CommandResponse::ok(json!({
                "logging_enabled": logging_enabled,
                "presence_detected": presence.is_present(),
                "sensor_delay": sensor_delay,
                "current_time": Utc::now().to_rfc3339(),
            }))
        }
    });

    dispatcher.register_deferred("shutdown_device", move |payload: Value| {
        let device_id = device_id.clone();
        let sink = sink.clone();
        let close = close.clone();
        async move {
            let delay_seconds =
                i64_field(&payload, "delay_seconds").unwrap_or(DEFAULT_SHUTDOWN_DELAY_SECONDS);
            let delay_seconds = delay_seconds.max(0);
            let scheduled = Utc::now() + chrono::Duration::seconds(delay_seconds);
            info!("Device shutdown scheduled in {delay_seconds} seconds");

            let response = CommandResponse::ok(json!({
                "message": format!("Device shutting down in {delay_seconds} seconds"),
                "scheduled_shutdown_time": scheduled.to_rfc3339(),
                "shutdown_delay_seconds": delay_seconds,
            }));

            CommandOutcome::with_deferred(response, async move {
                tokio::time::sleep(Duration::from_secs(delay_seconds as u64)).await;
                info!("Shutting down now");

                let message = TelemetryMessage::event(device_id, "shutdown")
                    .with_field("message", "Device shutting down");
                if let Err(e) = sink.send(&message).await {
                    warn!("Final shutdown event failed: {e}");
                }
                // The main loop owns disconnect and process exit; the
                // OS-level power-off belongs to deployment.
                close.send(true).ok();
            })
        }
    });

    dispatcher
}
