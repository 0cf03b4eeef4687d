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

// src/pumps.rs
// Inbound event pumps: desired patches into the reconciler, method
// requests through the dispatcher and back out as responses.

use std::sync::Arc;

use commands::{CommandDispatcher, CommandRequest};
use hublink::MethodRequest;
use serde_json::{Map, Value};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};
use twin::TwinReconciler;

use crate::channel::CommandLink;

// run_desired_patch_pump applies each desired-property patch from
// the hub. A failed patch (side effect or reported push) is an error
// worth shouting about -- the store is now desynchronized -- but the
// pump keeps consuming; the hub will re-deliver desired state on the
// next sync.
pub async fn run_desired_patch_pump(
    mut patches: mpsc::Receiver<Map<String, Value>>,
    reconciler: Arc<TwinReconciler>,
    mut close: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = close.changed() => break,
            maybe_patch = patches.recv() => {
                let Some(patch) = maybe_patch else { break };
                info!("Device twin update received");
                if let Err(e) = reconciler.apply_desired_patch(&patch).await {
                    error!("Desired patch failed: {e}");
                }
            }
        }
    }
    debug!("Desired patch pump stopped");
}

// run_method_pump answers direct method requests. Order per request
// is a contract: dispatch, send the response, and only then start
// any deferred action the handler scheduled. If the response could
// not be sent, the deferred action does not run -- acting without
// having acknowledged is worse than not acting.
pub async fn run_method_pump(
    mut requests: mpsc::Receiver<MethodRequest>,
    dispatcher: Arc<CommandDispatcher>,
    link: Arc<dyn CommandLink>,
    mut close: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = close.changed() => break,
            maybe_request = requests.recv() => {
                let Some(request) = maybe_request else { break };
                info!(command = %request.name, "Method request received");
                let outcome = dispatcher
                    .dispatch(CommandRequest::new(request.name.clone(), request.payload.clone()))
                    .await;
                match link
                    .respond(&request.rid, outcome.response.status, &outcome.response.payload)
                    .await
                {
                    Ok(()) => {
                        if let Some(deferred) = outcome.deferred {
                            tokio::spawn(deferred);
                        }
                    }
                    Err(e) => error!(command = %request.name, "Method response failed: {e}"),
                }
            }
        }
    }
    debug!("Method pump stopped");
}
