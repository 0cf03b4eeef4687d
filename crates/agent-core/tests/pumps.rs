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

// tests/pumps.rs
// Inbound pump behavior: method requests always get exactly one
// response, unknown names get the structured 400, deferred actions
// start only after the response went out, and desired patches drive
// the reconciler.

use std::sync::{Arc, Mutex as StdMutex};

use agent_core::{CommandLink, run_desired_patch_pump, run_method_pump};
use async_trait::async_trait;
use commands::{CommandDispatcher, CommandOutcome, CommandResponse};
use hublink::{HubLinkError, MethodRequest};
use serde_json::{Map, Value, json};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Duration;
use twin::{TwinChannel, TwinDocument, TwinError, TwinReconciler, TwinStore};

// RecordingLink captures every method response.
#[derive(Default)]
struct RecordingLink {
    responses: StdMutex<Vec<(String, u16, Value)>>,
}

#[async_trait]
impl CommandLink for RecordingLink {
    async fn respond(
        &self,
        rid: &str,
        status: u16,
        payload: &Value,
    ) -> Result<(), HubLinkError> {
        self.responses
            .lock()
            .unwrap()
            .push((rid.to_string(), status, payload.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct NullChannel {
    pushes: StdMutex<Vec<Map<String, Value>>>,
}

#[async_trait]
impl TwinChannel for NullChannel {
    async fn fetch_twin(&self) -> Result<TwinDocument, TwinError> {
        Ok(TwinDocument::default())
    }

    async fn push_reported(&self, properties: &Map<String, Value>) -> Result<(), TwinError> {
        self.pushes.lock().unwrap().push(properties.clone());
        Ok(())
    }
}

#[tokio::test]
async fn method_pump_answers_known_and_unknown_commands() {
    let mut dispatcher = CommandDispatcher::new();
    dispatcher.register("get_status", |_| async {
        CommandResponse::ok(json!({"presence_detected": true}))
    });

    let link = Arc::new(RecordingLink::default());
    let (requests_tx, requests_rx) = mpsc::channel(8);
    let (_close_tx, close_rx) = watch::channel(false);

    let task = tokio::spawn(run_method_pump(
        requests_rx,
        Arc::new(dispatcher),
        link.clone(),
        close_rx,
    ));

    requests_tx
        .send(MethodRequest {
            name: "get_status".to_string(),
            rid: "r-1".to_string(),
            payload: Value::Null,
        })
        .await
        .unwrap();
    requests_tx
        .send(MethodRequest {
            name: "open_pod_bay_doors".to_string(),
            rid: "r-2".to_string(),
            payload: Value::Null,
        })
        .await
        .unwrap();
    drop(requests_tx);
    task.await.unwrap();

    let responses = link.responses.lock().unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].0, "r-1");
    assert_eq!(responses[0].1, 200);
    assert_eq!(responses[1].0, "r-2");
    assert_eq!(responses[1].1, 400);
    assert!(
        responses[1].2["error"]
            .as_str()
            .unwrap()
            .contains("open_pod_bay_doors")
    );
}

#[tokio::test]
async fn deferred_action_starts_after_the_response() {
    let (acted_tx, acted_rx) = oneshot::channel::<()>();
    let acted_tx = Arc::new(StdMutex::new(Some(acted_tx)));

    let mut dispatcher = CommandDispatcher::new();
    dispatcher.register_deferred("shutdown_device", move |_| {
        let acted_tx = acted_tx.clone();
        async move {
            CommandOutcome::with_deferred(
                CommandResponse::message("Shutting down in 0 seconds"),
                async move {
                    if let Some(tx) = acted_tx.lock().unwrap().take() {
                        let _ = tx.send(());
                    }
                },
            )
        }
    });

    let link = Arc::new(RecordingLink::default());
    let (requests_tx, requests_rx) = mpsc::channel(8);
    let (_close_tx, close_rx) = watch::channel(false);
    let task = tokio::spawn(run_method_pump(
        requests_rx,
        Arc::new(dispatcher),
        link.clone(),
        close_rx,
    ));

    requests_tx
        .send(MethodRequest {
            name: "shutdown_device".to_string(),
            rid: "r-9".to_string(),
            payload: json!({"delay_seconds": 0}),
        })
        .await
        .unwrap();

    // The deferred action fires, and by the time it has, the
    // response is already recorded.
    tokio::time::timeout(Duration::from_secs(5), acted_rx)
        .await
        .expect("deferred action ran")
        .unwrap();
    assert_eq!(link.responses.lock().unwrap().len(), 1);

    drop(requests_tx);
    task.await.unwrap();
}

#[tokio::test]
async fn patch_pump_feeds_the_reconciler() {
    let channel = Arc::new(NullChannel::default());
    let reconciler = Arc::new(
        TwinReconciler::new(
            Arc::new(StdMutex::new(TwinStore::new())),
            channel.clone(),
        )
        .with_action("battery_level", |_| async { Ok(()) }),
    );

    let (patches_tx, patches_rx) = mpsc::channel(8);
    let (_close_tx, close_rx) = watch::channel(false);
    let task = tokio::spawn(run_desired_patch_pump(
        patches_rx,
        reconciler.clone(),
        close_rx,
    ));

    let patch = json!({"battery_level": 64}).as_object().cloned().unwrap();
    patches_tx.send(patch).await.unwrap();
    drop(patches_tx);
    task.await.unwrap();

    assert_eq!(channel.pushes.lock().unwrap().len(), 1);
    let store = reconciler.store();
    let store = store.lock().unwrap();
    assert_eq!(store.int_setting("battery_level", 0), 64);
    assert_eq!(store.int_setting("reported_battery_level", 0), 64);
}

#[tokio::test]
async fn close_signal_stops_the_pumps() {
    let link = Arc::new(RecordingLink::default());
    let (_requests_tx, requests_rx) = mpsc::channel::<MethodRequest>(8);
    let (close_tx, close_rx) = watch::channel(false);

    let task = tokio::spawn(run_method_pump(
        requests_rx,
        Arc::new(CommandDispatcher::new()),
        link,
        close_rx,
    ));

    close_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("pump stopped")
        .unwrap();
}
