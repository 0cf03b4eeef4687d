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

// tests/edge_watcher.rs
// Integration tests for the watcher half of edge detection: raw
// transitions flow into the bounded channel, the initial level is a
// baseline rather than an event, and the close signal stops the
// task.

use std::sync::Arc;

use sensors::{EdgeWatcher, SimulatedPin};
use tokio::sync::{mpsc, watch};
use tokio::time::Duration;

#[tokio::test(start_paused = true)]
async fn transitions_reach_the_channel() {
    let pin = SimulatedPin::new(false);
    let (events_tx, mut events_rx) = mpsc::channel(16);
    let (_close_tx, close_rx) = watch::channel(false);

    let watcher = EdgeWatcher::new(Arc::new(pin.clone()))
        .with_poll_interval(Duration::from_millis(10));
    let task = tokio::spawn(watcher.run(events_tx, close_rx));

    // Let the watcher establish its baseline before the first edge.
    tokio::time::sleep(Duration::from_millis(30)).await;

    pin.set(true);
    let event = events_rx.recv().await.expect("rising edge");
    assert!(event.level);

    pin.set(false);
    let event = events_rx.recv().await.expect("falling edge");
    assert!(!event.level);

    task.abort();
}

#[tokio::test(start_paused = true)]
async fn initial_level_is_a_baseline_not_an_event() {
    let pin = SimulatedPin::new(true);
    let (events_tx, mut events_rx) = mpsc::channel(16);
    let (_close_tx, close_rx) = watch::channel(false);

    let watcher = EdgeWatcher::new(Arc::new(pin.clone()))
        .with_poll_interval(Duration::from_millis(10));
    let task = tokio::spawn(watcher.run(events_tx, close_rx));

    // Plenty of polls at the initial level: nothing may come out.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(events_rx.try_recv().is_err());

    // The first actual change does.
    pin.set(false);
    let event = events_rx.recv().await.expect("falling edge");
    assert!(!event.level);

    task.abort();
}

#[tokio::test(start_paused = true)]
async fn close_signal_stops_the_watcher() {
    let pin = SimulatedPin::new(false);
    let (events_tx, _events_rx) = mpsc::channel(16);
    let (close_tx, close_rx) = watch::channel(false);

    let watcher = EdgeWatcher::new(Arc::new(pin)).with_poll_interval(Duration::from_millis(10));
    let task = tokio::spawn(watcher.run(events_tx, close_rx));

    close_tx.send(true).expect("watcher is listening");
    task.await.expect("watcher exits cleanly");
}
