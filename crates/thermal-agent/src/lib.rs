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
// The thermal monitor agent.
//
// Connects one Raspberry Pi class device to the hub, samples the SoC
// temperature every cycle (twin-adjustable cadence), answers the
// reboot / update / battery commands, and mirrors battery patches
// back as reported state.

pub mod methods;
pub mod sampler;

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use agent_core::{Cadence, HubChannel, ReportLoop, run_desired_patch_pump, run_method_pump};
use clap::Parser;
use eyre::WrapErr;
use hublink::{ClientCredentials, ClientOptions, ClientTlsConfig, HubClient};
use sensors::{CpuThermalZone, SimulatedProbe, TemperatureProbe};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{info, warn};
use twin::{TwinReconciler, TwinStore, TwinValue};

use crate::sampler::ThermalSampler;

// The battery level reported at startup before any patch arrives.
pub const INITIAL_BATTERY_LEVEL: i64 = 31;

// The telemetry cadence when the twin has no sensor_delay.
pub const DEFAULT_SENSOR_DELAY_SECONDS: i64 = 10;

#[derive(Parser, Debug)]
#[command(name = "thermal-agent", about = "Device agent reporting SoC temperature to the hub")]
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

    #[arg(
        long,
        help = "Thermal zone file to read",
        default_value = "/sys/class/thermal/thermal_zone0/temp"
    )]
    pub thermal_zone: PathBuf,

    #[arg(long, help = "Report simulated temperatures instead of reading hardware")]
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

    // probe picks the hardware probe, falling back to simulated data
    // when the thermal zone is not there (dev boxes, containers).
    fn probe(&self) -> Arc<dyn TemperatureProbe> {
        if self.simulate {
            return Arc::new(SimulatedProbe);
        }
        if self.thermal_zone.exists() {
            Arc::new(CpuThermalZone::with_path(&self.thermal_zone))
        } else {
            warn!(
                "Thermal zone {} not found; reporting simulated data",
                self.thermal_zone.display()
            );
            Arc::new(SimulatedProbe)
        }
    }
}

// start runs the agent until ctrl-c. Everything after a successful
// connect is non-fatal; the session is torn down on every exit path.
pub async fn start(options: Options) -> eyre::Result<()> {
    let credentials = ClientCredentials::from_connection_string(&options.connection_string)
        .wrap_err("Invalid connection string")?;

    // An unrecoverable connect failure propagates and ends the agent.
    let (client, events) = HubClient::connect(&credentials, options.client_options()?)
        .await
        .wrap_err("Failed to connect to hub")?;
    let client = Arc::new(client);

    let result = run_connected(&options, client.clone(), events).await;

    // Unconditional cleanup, also on the error paths.
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

    let reconciler = Arc::new(
        TwinReconciler::new(store.clone(), channel.clone())
            // battery_level is the one desired key with a reported
            // mirror; the "side effect" is the state change itself.
            .with_action("battery_level", |value| async move {
                info!("Battery level changed to {:?}", value.as_i64());
                Ok(())
            }),
    );

    reconciler
        .load_full_twin()
        .await
        .wrap_err("Failed to load device twin")?;
    {
        let store = store.lock().unwrap();
        info!("Initial reported properties: {:?}", store.reported_view());
    }

    // The hub sees a fresh battery figure as soon as we are up.
    let mut initial = Map::new();
    initial.insert("battery_level".to_string(), Value::from(INITIAL_BATTERY_LEVEL));
    reconciler
        .push_reported(&initial)
        .await
        .wrap_err("Failed to push initial battery status")?;
    store
        .lock()
        .unwrap()
        .set_desired("battery_level", TwinValue::Integer(INITIAL_BATTERY_LEVEL));

    let dispatcher = Arc::new(methods::build_dispatcher(
        store.clone(),
        reconciler.clone(),
    ));

    let (close_tx, close_rx) = watch::channel(false);

    let sampler = Arc::new(ThermalSampler::new(
        device_id.clone(),
        options.probe(),
        store.clone(),
    ));
    let telemetry_loop = ReportLoop::new(
        "telemetry",
        Cadence::TwinSeconds {
            store: store.clone(),
            key: "sensor_delay".to_string(),
            default_seconds: DEFAULT_SENSOR_DELAY_SECONDS,
        },
        channel.clone(),
        sampler,
    );

    let mut tasks = Vec::new();
    tasks.push(tokio::spawn(telemetry_loop.run(close_rx.clone())));
    tasks.push(tokio::spawn(run_desired_patch_pump(
        events.desired_patches,
        reconciler.clone(),
        close_rx.clone(),
    )));
    tasks.push(tokio::spawn(run_method_pump(
        events.method_requests,
        dispatcher,
        channel.clone(),
        close_rx,
    )));

    info!(device_id = %device_id, "Thermal agent running; ctrl-c to stop");
    tokio::signal::ctrl_c()
        .await
        .wrap_err("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    close_tx.send(true).ok();
    for task in tasks {
        task.await.ok();
    }
    Ok(())
}
