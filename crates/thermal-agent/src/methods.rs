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
// Direct method handlers for the thermal agent: reboot_device,
// update_device, change_battery_level.

use std::sync::{Arc, Mutex};

use commands::{CommandDispatcher, CommandResponse, i64_field, str_field};
use serde_json::{Map, Value, json};
use tracing::{error, info};
use twin::{TwinReconciler, TwinStore, TwinValue};

// build_dispatcher wires the thermal agent's command surface.
pub fn build_dispatcher(
    store: Arc<Mutex<TwinStore>>,
    reconciler: Arc<TwinReconciler>,
) -> CommandDispatcher {
    let mut dispatcher = CommandDispatcher::new();

    dispatcher.register("reboot_device", |_payload: Value| async move {
        info!("Rebooting device");
        CommandResponse::message("Device reboot initiated")
    });

    dispatcher.register("update_device", |payload: Value| async move {
        match str_field(&payload, "version") {
            Some(version) => {
                info!("Updating device to version {version}");
                CommandResponse::message(format!("Update to version {version} initiated"))
            }
            None => CommandResponse::invalid_payload("version is required"),
        }
    });

    dispatcher.register("change_battery_level", move |payload: Value| {
        let store = store.clone();
        let reconciler = reconciler.clone();
        async move {
            let Some(level) = i64_field(&payload, "battery_level") else {
                return CommandResponse::invalid_payload("battery_level is required");
            };
            info!("Changing battery level to {level}%");

            let mut properties = Map::new();
            properties.insert("battery_level".to_string(), Value::from(level));
            if let Err(e) = reconciler.push_reported(&properties).await {
                error!("Battery level push failed: {e}");
                return CommandResponse {
                    status: 500,
                    payload: json!({"error": format!("Failed to update battery level: {e}")}),
                };
            }
            store
                .lock()
                .unwrap()
                .set_desired("battery_level", TwinValue::Integer(level));

            CommandResponse::message(format!("Battery level changed to {level}%"))
        }
    });

    dispatcher
}
