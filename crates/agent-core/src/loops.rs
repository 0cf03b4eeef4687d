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

// src/loops.rs
// The periodic report loop: sample, build, send, sleep, repeat.
//
// One implementation serves both cadences -- the fast sensor cycle
// and the slow heartbeat -- which run as independent tasks sharing
// nothing but read access to the twin store. Nothing inside a cycle
// terminates the loop: a failed sample or a failed send is logged
// and the next cycle proceeds. Only the close signal ends it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hublink::TelemetryMessage;
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{debug, info, warn};
use twin::TwinStore;

use crate::channel::TelemetrySink;
use crate::errors::AgentError;

// Sampler builds one telemetry message per cycle. Returning None
// suppresses the cycle without stopping the loop (the logging gate,
// a probe that has nothing to say).
#[async_trait]
pub trait Sampler: Send + Sync {
    async fn sample(&self) -> Result<Option<TelemetryMessage>, AgentError>;
}

// Cadence decides how long a loop sleeps between cycles.
pub enum Cadence {
    // Fixed period, decided at wiring time.
    Fixed(Duration),
    // Period re-read from the twin store every cycle, so a desired
    // patch takes effect on the next cycle without any plumbing.
    TwinSeconds {
        store: Arc<Mutex<TwinStore>>,
        key: String,
        default_seconds: i64,
    },
}

impl Cadence {
    // current resolves the period for the upcoming sleep. Non-positive
    // twin values fall back to the default rather than spinning.
    pub fn current(&self) -> Duration {
        match self {
            Self::Fixed(period) => *period,
            Self::TwinSeconds {
                store,
                key,
                default_seconds,
            } => {
                let seconds = store.lock().unwrap().int_setting(key, *default_seconds);
                let seconds = if seconds > 0 { seconds } else { *default_seconds };
                Duration::from_secs(seconds as u64)
            }
        }
    }
}

// ReportLoop drives one sampler on one cadence.
pub struct ReportLoop {
    label: &'static str,
    cadence: Cadence,
    sink: Arc<dyn TelemetrySink>,
    sampler: Arc<dyn Sampler>,
}

impl ReportLoop {
    pub fn new(
        label: &'static str,
        cadence: Cadence,
        sink: Arc<dyn TelemetrySink>,
        sampler: Arc<dyn Sampler>,
    ) -> Self {
        Self {
            label,
            cadence,
            sink,
            sampler,
        }
    }

    // run cycles until the close signal. The first sample happens
    // immediately; the sleep comes after the send, matching the
    // source loop shape.
    pub async fn run(self, mut close: watch::Receiver<bool>) {
        info!(report_loop = self.label, "Report loop started");
        loop {
            match self.sampler.sample().await {
                Ok(Some(message)) => {
                    if let Err(e) = self.sink.send(&message).await {
                        warn!(report_loop = self.label, "Telemetry send failed: {e}");
                    }
                }
                Ok(None) => debug!(report_loop = self.label, "Cycle suppressed"),
                Err(e) => warn!(report_loop = self.label, "Sampling failed: {e}"),
            }

            let period = self.cadence.current();
            tokio::select! {
                _ = close.changed() => break,
                _ = tokio::time::sleep(period) => {}
            }
        }
        info!(report_loop = self.label, "Report loop stopped");
    }
}
