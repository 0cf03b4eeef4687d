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

use clap::Parser;
use eyre::WrapErr;
use presence_sink::PresenceLogStore;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::time::Duration;
use tracing::metadata::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "presence-sink", about = "Appends presence events to Postgres")]
pub struct Options {
    #[arg(
        long,
        env = "DATABASE_URL",
        hide_env_values = true,
        help = "Postgres connection URL"
    )]
    pub database_url: String,

    #[arg(long, default_value = "localhost", help = "MQTT broker host")]
    pub broker_host: String,

    #[arg(long, default_value_t = 1883, help = "MQTT broker port")]
    pub broker_port: u16,

    #[arg(
        long,
        default_value = "devices/+/messages/events/#",
        help = "Topic filter carrying device events"
    )]
    pub topic: String,

    #[arg(long, default_value = "presence-sink", help = "MQTT client id")]
    pub client_id: String,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let options = Options::parse();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
        .add_directive("rumqttc=warn".parse()?)
        .add_directive("sqlx=warn".parse()?);
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter)
        .try_init()?;

    let store = PresenceLogStore::connect(&options.database_url)
        .await
        .wrap_err("Failed to open presence log database")?;

    let mut mqtt_options = MqttOptions::new(
        options.client_id.clone(),
        options.broker_host.clone(),
        options.broker_port,
    );
    mqtt_options.set_keep_alive(Duration::from_secs(30));
    let (client, mut event_loop) = AsyncClient::new(mqtt_options, 32);
    client
        .subscribe(&options.topic, QoS::AtLeastOnce)
        .await
        .wrap_err("Failed to subscribe to events topic")?;

    info!(
        broker = %options.broker_host,
        topic = %options.topic,
        "Presence sink running; ctrl-c to stop"
    );

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.wrap_err("Failed to listen for shutdown signal")?;
                info!("Shutdown signal received");
                break;
            }
            event = event_loop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    // Subscriptions do not survive a reconnect.
                    if let Err(e) = client.subscribe(&options.topic, QoS::AtLeastOnce).await {
                        warn!("Re-subscribe failed: {e}");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    match store.process(&publish.payload).await {
                        Ok(()) => {}
                        // A bad event is dropped; the stream continues.
                        Err(e) if e.is_parse_error() => warn!("Dropping event: {e}"),
                        Err(e) => error!("Failed to log event: {e}"),
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Broker connection lost: {e}; reconnecting");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    }

    client.disconnect().await.ok();
    Ok(())
}
