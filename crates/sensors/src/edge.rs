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

// src/edge.rs
// Edge detection split in two halves.
//
// The watcher does the interrupt-context half: poll the pin, and on
// any raw transition enqueue an event into a bounded channel with
// try_send -- it never suspends on a slow consumer and never does
// anything beyond enqueueing. The consumer half runs a Debouncer: a
// pure state machine enforcing the quiet period and discarding
// same-state re-fires, so exactly one confirmed transition comes out
// of any burst of chatter.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::gpio::PresenceInput;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(2);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

// EdgeEvent is one raw pin transition, stamped when observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    pub level: bool,
    pub at: Instant,
}

// EdgeWatcher polls a pin and forwards raw transitions.
pub struct EdgeWatcher {
    input: Arc<dyn PresenceInput>,
    poll_interval: Duration,
}

impl EdgeWatcher {
    pub fn new(input: Arc<dyn PresenceInput>) -> Self {
        Self {
            input,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    // run watches the pin until the close signal. The initial level
    // is the baseline; only changes from it produce events. A full
    // queue drops the event (the debouncer would have merged it into
    // the burst anyway).
    pub async fn run(self, events: mpsc::Sender<EdgeEvent>, mut close: watch::Receiver<bool>) {
        let mut last = self.input.is_high().ok();
        let mut ticker = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = close.changed() => {
                    debug!("Edge watcher stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match self.input.is_high() {
                        Ok(level) => {
                            if last != Some(level) {
                                last = Some(level);
                                let event = EdgeEvent { level, at: Instant::now() };
                                if events.try_send(event).is_err() {
                                    warn!("Edge queue full; dropping transition");
                                }
                            }
                        }
                        Err(e) => warn!("Pin read failed: {e}"),
                    }
                }
            }
        }
    }
}

// Debouncer turns raw edges into confirmed transitions. Pure state,
// no clocks of its own: callers hand it stamped events.
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    confirmed: bool,
    last_change: Option<Instant>,
}

impl Debouncer {
    pub fn new(initial: bool, quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            confirmed: initial,
            last_change: None,
        }
    }

    // state is the last confirmed level.
    pub fn state(&self) -> bool {
        self.confirmed
    }

    // observe consumes one raw edge. Returns the new confirmed level
    // for a real transition; None for a same-state re-fire or an
    // edge inside the quiet window.
    pub fn observe(&mut self, event: EdgeEvent) -> Option<bool> {
        if event.level == self.confirmed {
            return None;
        }
        if let Some(last) = self.last_change {
            if event.at.duration_since(last) < self.quiet_period {
                return None;
            }
        }
        self.confirmed = event.level;
        self.last_change = Some(event.at);
        Some(event.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    #[test]
    fn first_transition_is_confirmed() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(false, DEFAULT_QUIET_PERIOD);
        let confirmed = debouncer.observe(EdgeEvent {
            level: true,
            at: base,
        });
        assert_eq!(confirmed, Some(true));
        assert!(debouncer.state());
    }

    #[test]
    fn two_edges_inside_quiet_window_confirm_at_most_once() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(false, DEFAULT_QUIET_PERIOD);

        assert_eq!(
            debouncer.observe(EdgeEvent { level: true, at: base }),
            Some(true)
        );
        // Falls back within the window: chatter, suppressed.
        assert_eq!(
            debouncer.observe(EdgeEvent {
                level: false,
                at: at(base, 500)
            }),
            None
        );
        // State is still the confirmed one.
        assert!(debouncer.state());
    }

    #[test]
    fn same_state_refire_is_never_a_transition() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(true, DEFAULT_QUIET_PERIOD);
        assert_eq!(
            debouncer.observe(EdgeEvent { level: true, at: base }),
            None
        );
        assert_eq!(
            debouncer.observe(EdgeEvent {
                level: true,
                at: at(base, 5000)
            }),
            None
        );
    }

    #[test]
    fn transition_after_quiet_window_confirms() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(false, DEFAULT_QUIET_PERIOD);

        assert_eq!(
            debouncer.observe(EdgeEvent { level: true, at: base }),
            Some(true)
        );
        assert_eq!(
            debouncer.observe(EdgeEvent {
                level: false,
                at: at(base, 2500)
            }),
            Some(false)
        );
        assert!(!debouncer.state());
    }
}
