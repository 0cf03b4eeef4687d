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

// tests/loops.rs
// Report loop behavior under a paused clock: cycles survive send
// failures, suppression sends nothing, the twin-driven cadence picks
// up patched delays on the next cycle, and the close signal stops
// the task.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use agent_core::{AgentError, Cadence, ReportLoop, Sampler, TelemetrySink};
use async_trait::async_trait;
use hublink::{HubLinkError, TelemetryMessage};
use tokio::sync::watch;
use tokio::time::{Duration, Instant};
use twin::{TwinStore, TwinValue};

// RecordingSink captures send instants; optionally fails the first
// N sends.
struct RecordingSink {
    sent: StdMutex<Vec<Instant>>,
    failures_left: AtomicUsize,
}

impl RecordingSink {
    fn new(failures: usize) -> Self {
        Self {
            sent: StdMutex::new(Vec::new()),
            failures_left: AtomicUsize::new(failures),
        }
    }

    fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl TelemetrySink for RecordingSink {
    async fn send(&self, _message: &TelemetryMessage) -> Result<(), HubLinkError> {
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(HubLinkError::report_push_error("broker unreachable"));
        }
        self.sent.lock().unwrap().push(Instant::now());
        Ok(())
    }
}

struct ConstSampler;

#[async_trait]
impl Sampler for ConstSampler {
    async fn sample(&self) -> Result<Option<TelemetryMessage>, AgentError> {
        Ok(Some(
            TelemetryMessage::new("test-device").with_field("temperature", 45.0),
        ))
    }
}

struct SuppressedSampler;

#[async_trait]
impl Sampler for SuppressedSampler {
    async fn sample(&self) -> Result<Option<TelemetryMessage>, AgentError> {
        Ok(None)
    }
}

#[tokio::test(start_paused = true)]
async fn send_failure_does_not_stop_the_loop() {
    let sink = Arc::new(RecordingSink::new(1));
    let (close_tx, close_rx) = watch::channel(false);

    let report_loop = ReportLoop::new(
        "telemetry",
        Cadence::Fixed(Duration::from_secs(10)),
        sink.clone(),
        Arc::new(ConstSampler),
    );
    let task = tokio::spawn(report_loop.run(close_rx));

    // First cycle fails, the next ones go through.
    tokio::time::sleep(Duration::from_secs(25)).await;
    close_tx.send(true).unwrap();
    task.await.unwrap();

    assert!(sink.send_count() >= 2, "loop died after the failed send");
}

#[tokio::test(start_paused = true)]
async fn suppressed_cycles_send_nothing() {
    let sink = Arc::new(RecordingSink::new(0));
    let (close_tx, close_rx) = watch::channel(false);

    let report_loop = ReportLoop::new(
        "heartbeat",
        Cadence::Fixed(Duration::from_secs(60)),
        sink.clone(),
        Arc::new(SuppressedSampler),
    );
    let task = tokio::spawn(report_loop.run(close_rx));

    tokio::time::sleep(Duration::from_secs(300)).await;
    close_tx.send(true).unwrap();
    task.await.unwrap();

    assert_eq!(sink.send_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn twin_cadence_applies_on_the_next_cycle() {
    let store = Arc::new(StdMutex::new(TwinStore::new()));
    let sink = Arc::new(RecordingSink::new(0));
    let (close_tx, close_rx) = watch::channel(false);

    let report_loop = ReportLoop::new(
        "telemetry",
        Cadence::TwinSeconds {
            store: store.clone(),
            key: "sensor_delay".to_string(),
            default_seconds: 2,
        },
        sink.clone(),
        Arc::new(ConstSampler),
    );
    let task = tokio::spawn(report_loop.run(close_rx));

    // Patch the delay; no extra telemetry fires for the patch
    // itself, but every following cycle uses the new period.
    store
        .lock()
        .unwrap()
        .set_desired("sensor_delay", TwinValue::Integer(5));

    tokio::time::sleep(Duration::from_secs(11)).await;
    close_tx.send(true).unwrap();
    task.await.unwrap();

    let sent = sink.sent.lock().unwrap();
    // t=0 immediately, then t=5 and t=10 on the patched cadence.
    assert_eq!(sent.len(), 3, "unexpected cycle count: {}", sent.len());
    let gap = sent[1].duration_since(sent[0]);
    assert_eq!(gap, Duration::from_secs(5));
}

#[test]
fn twin_cadence_falls_back_on_nonsense_values() {
    let store = Arc::new(StdMutex::new(TwinStore::new()));
    let cadence = Cadence::TwinSeconds {
        store: store.clone(),
        key: "sensor_delay".to_string(),
        default_seconds: 10,
    };

    assert_eq!(cadence.current(), Duration::from_secs(10));

    store
        .lock()
        .unwrap()
        .set_desired("sensor_delay", TwinValue::Integer(-3));
    assert_eq!(cadence.current(), Duration::from_secs(10));

    store
        .lock()
        .unwrap()
        .set_desired("sensor_delay", TwinValue::Integer(15));
    assert_eq!(cadence.current(), Duration::from_secs(15));
}
