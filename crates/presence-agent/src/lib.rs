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

// src/lib.rs
// The presence detector agent.
//
// A PIR sensor on a GPIO pin feeds the edge watcher; confirmed
// transitions become presence_change telemetry. A heartbeat reports
// coarse state once a minute, direct methods expose status and a
// scheduled shutdown, and twin patches toggle the logging gate.

pub mod consumer;
pub mod heartbeat;
pub mod methods;
pub mod state;

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use agent_core::{Cadence, HubChannel, ReportLoop, run_desired_patch_pump, run_method_pump};
use clap::Parser;
use eyre::WrapErr;
use hublink::{ClientCredentials, ClientOptions, ClientTlsConfig, HubClient};
use sensors::{Debouncer, EdgeWatcher, PresenceInput, SimulatedPin, SysfsGpioPin,
    DEFAULT_QUIET_PERIOD};
use serde_json::{Map, Value};
use tokio::sync::{mpsc, watch};
use tokio::time::Duration;
use tracing::info;
use twin::{TwinReconciler, TwinStore, TwinValue};

use crate::heartbeat::HeartbeatSampler;
use crate::state::PresenceState;

pub const DEFAULT_SENSOR_DELAY_SECONDS: i64 = 5;
pub const HEARTBEAT_PERIOD: Duration = Duration::from_secs(60);
const EDGE_CHANNEL_CAPACITY: usize = 16;

#[derive(Parser, Debug)]
#[command(name = "presence-agent", about = "PIR presence detector agent")]
pub struct Options {
    #[arg(
        long,
        env = "HUB_CONNECTION_STRING",
        hide_env_values = true,
        help = "Hub device connection string (HostName=...;DeviceId=...;SharedAccessKey=...)"
    )]
    pub connection_string: String,

    #[arg(long, help = "Override the broker port")]
    pub port: Option<u16>,

    #[arg(long, help = "Path to the CA certificate for a TLS broker session")]
    pub ca_cert: Option<PathBuf>,

    #[arg(long, default_value_t = 17, help = "BCM pin the PIR sensor is wired to")]
    pub gpio_pin: u32,

    #[arg(long, help = "Read the pin from an explicit value file instead of sysfs")]
    pub gpio_value_path: Option<PathBuf>,

    #[arg(long, help = "Run without hardware (pin never fires)")]
    pub simulate: bool,

    #[arg(long, default_value_t = 1, help = "Connect attempts before giving up")]
    pub connect_attempts: u32,
}

impl Options {
    fn client_options(&self) -> eyre::Result<ClientOptions> {
        let mut options = ClientOptions::default().with_connect_attempts(self.connect_attempts);
        if let Some(port) = self.port {
            options = options.with_port(port);
        }
        if let Some(ca_cert) = &self.ca_cert {
            let ca_certificate = fs::read(ca_cert)
                .wrap_err_with(|| format!("Failed to read CA certificate {}", ca_cert.display()))?;
            options = options.with_tls_config(ClientTlsConfig { ca_certificate });
        }
        Ok(options)
    }

    fn pin(&self) -> Arc<dyn PresenceInput> {
        if self.simulate {
            return Arc::new(SimulatedPin::default());
        }
        match &self.gpio_value_path {
            Some(path) => Arc::new(SysfsGpioPin::with_path(path)),
            None => Arc::new(SysfsGpioPin::new(self.gpio_pin)),
        }
    }
}

// start runs the agent until ctrl-c or a scheduled shutdown fires.
pub async fn start(options: Options) -> eyre::Result<()> {
    let credentials = ClientCredentials::from_connection_string(&options.connection_string)
        .wrap_err("Invalid connection string")?;

    let (client, events) = HubClient::connect(&credentials, options.client_options()?)
        .await
        .wrap_err("Failed to connect to hub")?;
    let client = Arc::new(client);

    let result = run_connected(&options, client.clone(), events).await;

    // Unconditional cleanup, also on the error paths and after a
    // scheduled shutdown.
    client.disconnect().await.ok();
    result
}

async fn run_connected(
    options: &Options,
    client: Arc<HubClient>,
    events: hublink::HubEvents,
) -> eyre::Result<()> {
    let device_id = client.device_id().to_string();
    let channel = Arc::new(HubChannel::new(client.clone()));
    let store = Arc::new(Mutex::new(TwinStore::new()));
    let presence = PresenceState::new(false);

    // Local defaults the hub can override by patching.
    {
        let mut store = store.lock().unwrap();
        store.set_desired("logging_enabled", TwinValue::Bool(true));
        store.set_desired(
            "sensor_delay",
            TwinValue::Integer(DEFAULT_SENSOR_DELAY_SECONDS),
        );
    }

    let reconciler = Arc::new(
        TwinReconciler::new(store.clone(), channel.clone())
            // The gate change is the side effect; the store flip is
            // read by the consumer and the heartbeat on their next
            // cycle.
            .with_action("logging_enabled", |value| async move {
                let enabled = value.as_bool().unwrap_or(true);
                info!(
                    "Logging {}",
                    if enabled { "enabled" } else { "disabled" }
                );
                Ok(())
            }),
    );

    // Announce ourselves: current settings plus device_status.
    let mut initial = Map::new();
    initial.insert("logging_enabled".to_string(), Value::from(true));
    initial.insert(
        "sensor_delay".to_string(),
        Value::from(DEFAULT_SENSOR_DELAY_SECONDS),
    );
    initial.insert("device_status".to_string(), Value::from("online"));
    reconciler
        .push_reported(&initial)
        .await
        .wrap_err("Failed to push initial reported properties")?;

    let (close_tx, close_rx) = watch::channel(false);
    let close_tx = Arc::new(close_tx);

    let dispatcher = Arc::new(methods::build_dispatcher(
        device_id.clone(),
        store.clone(),
        presence.clone(),
        channel.clone(),
        close_tx.clone(),
    ));

    let (edge_tx, edge_rx) = mpsc::channel(EDGE_CHANNEL_CAPACITY);
    let watcher = EdgeWatcher::new(options.pin());
    let heartbeat_loop = ReportLoop::new(
        "heartbeat",
        Cadence::Fixed(HEARTBEAT_PERIOD),
        channel.clone(),
        Arc::new(HeartbeatSampler::new(
            device_id.clone(),
            store.clone(),
            presence.clone(),
        )),
    );

    let mut tasks = Vec::new();
    tasks.push(tokio::spawn(watcher.run(edge_tx, close_rx.clone())));
    tasks.push(tokio::spawn(consumer::run_presence_consumer(
        edge_rx,
        Debouncer::new(false, DEFAULT_QUIET_PERIOD),
        store.clone(),
        presence.clone(),
        channel.clone(),
        device_id.clone(),
        close_rx.clone(),
    )));
    tasks.push(tokio::spawn(heartbeat_loop.run(close_rx.clone())));
    tasks.push(tokio::spawn(run_desired_patch_pump(
        events.desired_patches,
        reconciler.clone(),
        close_rx.clone(),
    )));
    tasks.push(tokio::spawn(run_method_pump(
        events.method_requests,
        dispatcher,
        channel.clone(),
        close_rx.clone(),
    )));

    info!(device_id = %device_id, "Presence agent running; ctrl-c to stop");
    let mut close_watch = close_rx;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.wrap_err("Failed to listen for shutdown signal")?;
            info!("Shutdown signal received");
        }
        _ = close_watch.changed() => {
            info!("Shutdown requested remotely");
        }
    }

    close_tx.send(true).ok();
    for task in tasks {
        task.await.ok();
    }
    Ok(())
}
