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

// tests/methods.rs
// Direct method behavior: get_status reads shared state, and
// shutdown_device answers immediately, emits exactly one shutdown
// event after the delay, then pulls the close signal.

use std::sync::{Arc, Mutex as StdMutex};

use agent_core::TelemetrySink;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use commands::{CommandDispatcher, CommandRequest};
use hublink::{HubLinkError, TelemetryMessage};
use presence_agent::methods::build_dispatcher;
use presence_agent::state::PresenceState;
use serde_json::{Value, json};
use tokio::sync::watch;
use tokio::time::Duration;
use twin::{TwinStore, TwinValue};

#[derive(Default)]
struct RecordingSink {
    sent: StdMutex<Vec<TelemetryMessage>>,
}

#[async_trait]
impl TelemetrySink for RecordingSink {
    async fn send(&self, message: &TelemetryMessage) -> Result<(), HubLinkError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

struct Harness {
    dispatcher: CommandDispatcher,
    sink: Arc<RecordingSink>,
    store: Arc<StdMutex<TwinStore>>,
    presence: PresenceState,
    close_rx: watch::Receiver<bool>,
}

fn harness() -> Harness {
    let store = Arc::new(StdMutex::new(TwinStore::new()));
    let presence = PresenceState::new(false);
    let sink = Arc::new(RecordingSink::default());
    let (close_tx, close_rx) = watch::channel(false);

    let dispatcher = build_dispatcher(
        "PresenceDetector".to_string(),
        store.clone(),
        presence.clone(),
        sink.clone(),
        Arc::new(close_tx),
    );

    Harness {
        dispatcher,
        sink,
        store,
        presence,
        close_rx,
    }
}

#[tokio::test]
async fn get_status_reflects_shared_state() {
    let h = harness();
    h.store
        .lock()
        .unwrap()
        .set_desired("logging_enabled", TwinValue::Bool(false));
    h.store
        .lock()
        .unwrap()
        .set_desired("sensor_delay", TwinValue::Integer(15));
    h.presence.set(true);

    let outcome = h
        .dispatcher
        .dispatch(CommandRequest::new("get_status", Value::Null))
        .await;

    assert_eq!(outcome.response.status, 200);
    let payload = &outcome.response.payload;
    assert_eq!(payload["logging_enabled"], json!(false));
    assert_eq!(payload["presence_detected"], json!(true));
    assert_eq!(payload["sensor_delay"], json!(15));
    let current_time = payload["current_time"].as_str().unwrap();
    assert!(current_time.parse::<DateTime<Utc>>().is_ok());
    assert!(outcome.deferred.is_none());
}

// shutdown_device{delay_seconds: 5}: immediate 200 with the
// schedule, exactly one shutdown telemetry event 5 time-units later,
// then the close signal.
#[tokio::test(start_paused = true)]
async fn shutdown_responds_first_and_acts_after_the_delay() {
    let mut h = harness();

    let outcome = h
        .dispatcher
        .dispatch(CommandRequest::new(
            "shutdown_device",
            json!({"delay_seconds": 5}),
        ))
        .await;

    assert_eq!(outcome.response.status, 200);
    let payload = &outcome.response.payload;
    assert_eq!(payload["shutdown_delay_seconds"], json!(5));
    assert!(
        payload["message"]
            .as_str()
            .unwrap()
            .contains("5 seconds")
    );
    let scheduled = payload["scheduled_shutdown_time"].as_str().unwrap();
    assert!(scheduled.parse::<DateTime<Utc>>().is_ok());

    // Nothing has happened yet: no event, no close.
    assert!(h.sink.sent.lock().unwrap().is_empty());
    assert!(!*h.close_rx.borrow());

    let deferred = outcome.deferred.expect("shutdown defers the action");
    let task = tokio::spawn(deferred);

    // Just before the deadline: still nothing.
    tokio::time::sleep(Duration::from_millis(4_900)).await;
    assert!(h.sink.sent.lock().unwrap().is_empty());

    // Past the deadline: exactly one shutdown event, then teardown.
    tokio::time::sleep(Duration::from_millis(200)).await;
    task.await.unwrap();

    let sent = h.sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].fields["event_type"], json!("shutdown"));
    drop(sent);

    h.close_rx.changed().await.unwrap();
    assert!(*h.close_rx.borrow());
}

#[tokio::test(start_paused = true)]
async fn shutdown_without_payload_uses_the_default_delay() {
    let h = harness();
    let outcome = h
        .dispatcher
        .dispatch(CommandRequest::new("shutdown_device", Value::Null))
        .await;
    assert_eq!(outcome.response.payload["shutdown_delay_seconds"], json!(10));
}

#[tokio::test]
async fn unknown_method_is_a_400_naming_the_method() {
    let h = harness();
    let outcome = h
        .dispatcher
        .dispatch(CommandRequest::new("self_destruct", Value::Null))
        .await;
    assert_eq!(outcome.response.status, 400);
    assert!(
        outcome.response.payload["error"]
            .as_str()
            .unwrap()
            .contains("self_destruct")
    );
}
