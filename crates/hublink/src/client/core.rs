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

// src/client/core.rs
// The HubClient: one device session against the hub.
//
// connect() establishes the MQTT session (an unrecoverable failure
// propagates to the caller), subscribes to the twin and method
// topics, and hands back the client plus the inbound event channels.
// A background task owns the rumqttc event loop and routes inbound
// publishes: correlated twin responses complete their waiting
// oneshot, desired patches and method requests flow to the agent
// through bounded channels.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, Publish, QoS,
    TlsConfiguration, Transport,
};
use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::client::options::{
    ClientCredentials, ClientOptions, DEFAULT_CHANNEL_CAPACITY, DEFAULT_CONNECT_ATTEMPTS,
    DEFAULT_CONNECT_RETRY_DELAY, DEFAULT_KEEP_ALIVE, DEFAULT_OPERATION_TIMEOUT, DEFAULT_SAS_TTL,
};
use crate::client::topics::{self, InboundTopic};
use crate::errors::HubLinkError;
use crate::message::TelemetryMessage;
use crate::sas;

// TwinResponse is the raw correlated answer to a twin GET or
// reported PATCH.
#[derive(Debug)]
pub struct TwinResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

// MethodRequest is one direct method invocation from the hub. The
// rid is opaque and must be echoed back in the response topic.
#[derive(Debug, Clone)]
pub struct MethodRequest {
    pub name: String,
    pub rid: String,
    pub payload: Value,
}

// HubEvents carries the inbound channels for one session. Handed out
// once by connect(); the agent owns the receiving halves.
pub struct HubEvents {
    pub desired_patches: mpsc::Receiver<Map<String, Value>>,
    pub method_requests: mpsc::Receiver<MethodRequest>,
}

type PendingTwinRequests = Arc<Mutex<HashMap<u64, oneshot::Sender<TwinResponse>>>>;

// HubClient is a connected device session. All methods take &self;
// share it behind an Arc.
pub struct HubClient {
    device_id: String,
    client: AsyncClient,
    pending: PendingTwinRequests,
    next_rid: AtomicU64,
    closed: Arc<AtomicBool>,
    operation_timeout: Duration,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl HubClient {
    // connect establishes the session. The first connack decides the
    // outcome: a refused or unreachable broker is returned to the
    // caller (after the configured number of attempts), never
    // swallowed.
    pub async fn connect(
        credentials: &ClientCredentials,
        options: ClientOptions,
    ) -> Result<(Self, HubEvents), HubLinkError> {
        let keep_alive = options.keep_alive.unwrap_or(DEFAULT_KEEP_ALIVE);
        let capacity = options.channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY);
        let attempts = options
            .connect_attempts
            .unwrap_or(DEFAULT_CONNECT_ATTEMPTS)
            .max(1);
        let retry_delay = options
            .connect_retry_delay
            .unwrap_or(DEFAULT_CONNECT_RETRY_DELAY);
        let sas_ttl = options.sas_ttl.unwrap_or(DEFAULT_SAS_TTL);
        let operation_timeout = options
            .operation_timeout
            .unwrap_or(DEFAULT_OPERATION_TIMEOUT);

        let mut mqtt_options = MqttOptions::new(
            credentials.device_id.clone(),
            credentials.hostname.clone(),
            options.effective_port(),
        );
        mqtt_options.set_keep_alive(keep_alive);
        mqtt_options.set_credentials(
            sas::username(&credentials.hostname, &credentials.device_id),
            sas::generate_token(
                &credentials.hostname,
                &credentials.device_id,
                &credentials.shared_access_key,
                sas_ttl,
            )?,
        );
        if let Some(tls) = &options.tls_config {
            mqtt_options.set_transport(Transport::Tls(TlsConfiguration::Simple {
                ca: tls.ca_certificate.clone(),
                alpn: None,
                client_auth: None,
            }));
        }

        let (client, mut event_loop) = AsyncClient::new(mqtt_options, capacity);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match wait_for_connack(&mut event_loop).await {
                Ok(()) => break,
                Err(e) if attempt < attempts => {
                    warn!(
                        "Connect attempt {attempt}/{attempts} failed: {e}; retrying in {:?}",
                        retry_delay
                    );
                    tokio::time::sleep(retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
        info!(
            device_id = %credentials.device_id,
            host = %credentials.hostname,
            "Connected to hub"
        );

        subscribe_all(&client).await?;

        let (desired_tx, desired_rx) = mpsc::channel(capacity);
        let (method_tx, method_rx) = mpsc::channel(capacity);
        let pending: PendingTwinRequests = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let handle = tokio::spawn(run_event_loop(
            event_loop,
            client.clone(),
            pending.clone(),
            closed.clone(),
            retry_delay,
            desired_tx,
            method_tx,
        ));

        Ok((
            Self {
                device_id: credentials.device_id.clone(),
                client,
                pending,
                next_rid: AtomicU64::new(1),
                closed,
                operation_timeout,
                loop_handle: Mutex::new(Some(handle)),
            },
            HubEvents {
                desired_patches: desired_rx,
                method_requests: method_rx,
            },
        ))
    }

    // device_id this session authenticated as.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    // send_telemetry publishes one device-to-cloud event. The
    // message id, content type, and content encoding travel in the
    // topic property bag.
    pub async fn send_telemetry(&self, message: &TelemetryMessage) -> Result<(), HubLinkError> {
        let topic = topics::telemetry_topic(&self.device_id, &message.message_id.to_string());
        let payload = message.to_payload()?;
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await?;
        debug!(device_id = %self.device_id, "Telemetry sent");
        Ok(())
    }

    // get_twin fetches the full twin document:
    // {"desired": {...}, "reported": {...}}.
    pub async fn get_twin(&self) -> Result<Value, HubLinkError> {
        let response = self
            .twin_round_trip(|rid| (topics::twin_get_topic(rid), Vec::new()))
            .await?;
        if !(200..300).contains(&response.status) {
            return Err(HubLinkError::TwinRequestFailed {
                status: response.status,
            });
        }
        serde_json::from_slice(&response.body).map_err(HubLinkError::JsonDeserializationError)
    }

    // patch_reported pushes reported properties. Any failure along
    // the way (publish, timeout, non-success ack) surfaces as a
    // report-push error: a dropped push leaves the store
    // desynchronized from the hub and must never be silent.
    pub async fn patch_reported(&self, properties: &Map<String, Value>) -> Result<(), HubLinkError> {
        let body = serde_json::to_vec(properties)?;
        let response = self
            .twin_round_trip(|rid| (topics::twin_patch_reported_topic(rid), body))
            .await
            .map_err(|e| HubLinkError::report_push_error(e.to_string()))?;
        if !(200..300).contains(&response.status) {
            return Err(HubLinkError::report_push_error(format!(
                "hub answered status {}",
                response.status
            )));
        }
        debug!(device_id = %self.device_id, "Reported properties pushed");
        Ok(())
    }

    // respond_to_method answers one direct method request.
    pub async fn respond_to_method(
        &self,
        rid: &str,
        status: u16,
        payload: &Value,
    ) -> Result<(), HubLinkError> {
        let topic = topics::method_response_topic(status, rid);
        let body = serde_json::to_vec(payload)?;
        self.client
            .publish(topic, QoS::AtLeastOnce, false, body)
            .await?;
        Ok(())
    }

    // disconnect tears the session down. Idempotent: the second and
    // later calls are no-ops, and a session that already lost its
    // transport still reports success. Safe to call on every exit
    // path, including signal-triggered shutdown mid-send.
    pub async fn disconnect(&self) -> Result<(), HubLinkError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Err(e) = self.client.disconnect().await {
            // The request queue is already gone; that is what
            // disconnected looks like.
            debug!("Disconnect request after transport loss: {e}");
        }
        let handle = self.loop_handle.lock().unwrap().take();
        if let Some(handle) = handle {
            if tokio::time::timeout(Duration::from_secs(2), handle).await.is_err() {
                warn!("Event loop did not stop in time");
            }
        }
        info!(device_id = %self.device_id, "Disconnected from hub");
        Ok(())
    }

    // twin_round_trip publishes a correlated twin request and awaits
    // its response, with cleanup of the pending entry on timeout.
    async fn twin_round_trip(
        &self,
        build: impl FnOnce(u64) -> (String, Vec<u8>),
    ) -> Result<TwinResponse, HubLinkError> {
        let rid = self.next_rid.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(rid, tx);

        let (topic, body) = build(rid);
        if let Err(e) = self.client.publish(topic, QoS::AtLeastOnce, false, body).await {
            self.pending.lock().unwrap().remove(&rid);
            return Err(e.into());
        }

        match tokio::time::timeout(self.operation_timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(HubLinkError::channel_closed(format!(
                "twin response channel dropped (rid {rid})"
            ))),
            Err(_) => {
                self.pending.lock().unwrap().remove(&rid);
                Err(HubLinkError::TwinRequestTimeout { rid })
            }
        }
    }
}

// wait_for_connack drives the event loop until the broker answers
// the connect.
async fn wait_for_connack(event_loop: &mut EventLoop) -> Result<(), HubLinkError> {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return if ack.code == ConnectReturnCode::Success {
                    Ok(())
                } else {
                    Err(HubLinkError::ConnectionRefused(format!("{:?}", ack.code)))
                };
            }
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }
    }
}

// subscribe_all registers for everything the hub pushes at a device.
async fn subscribe_all(client: &AsyncClient) -> Result<(), HubLinkError> {
    for filter in [
        topics::TWIN_RESPONSE_FILTER,
        topics::DESIRED_PATCH_FILTER,
        topics::METHOD_REQUEST_FILTER,
    ] {
        client.subscribe(filter, QoS::AtLeastOnce).await?;
    }
    Ok(())
}

// run_event_loop owns the rumqttc event loop for the lifetime of the
// session: routes publishes, re-subscribes after a reconnect, and
// winds down once disconnect() has been requested.
#[allow(clippy::too_many_arguments)]
async fn run_event_loop(
    mut event_loop: EventLoop,
    client: AsyncClient,
    pending: PendingTwinRequests,
    closed: Arc<AtomicBool>,
    reconnect_delay: Duration,
    desired_tx: mpsc::Sender<Map<String, Value>>,
    method_tx: mpsc::Sender<MethodRequest>,
) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                // rumqttc reconnected under us; subscriptions do not
                // survive the new session.
                if let Err(e) = subscribe_all(&client).await {
                    warn!("Re-subscribe after reconnect failed: {e}");
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                route_publish(publish, &pending, &desired_tx, &method_tx);
            }
            Ok(_) => {}
            Err(e) => {
                if closed.load(Ordering::SeqCst) {
                    break;
                }
                warn!("Connection lost: {e}; reconnecting");
                tokio::time::sleep(reconnect_delay).await;
            }
        }
        if closed.load(Ordering::SeqCst) {
            break;
        }
    }
    debug!("Event loop stopped");
}

// route_publish classifies one inbound publish and hands it to the
// right consumer. Malformed payloads are logged and dropped; the
// session keeps processing subsequent messages.
fn route_publish(
    publish: Publish,
    pending: &PendingTwinRequests,
    desired_tx: &mpsc::Sender<Map<String, Value>>,
    method_tx: &mpsc::Sender<MethodRequest>,
) {
    match topics::parse_inbound(&publish.topic) {
        Ok(InboundTopic::TwinResponse { status, rid }) => {
            if let Some(tx) = pending.lock().unwrap().remove(&rid) {
                let _ = tx.send(TwinResponse {
                    status,
                    body: publish.payload.to_vec(),
                });
            } else {
                debug!("Twin response for unknown rid {rid}");
            }
        }
        Ok(InboundTopic::DesiredPatch { version }) => {
            match serde_json::from_slice::<Map<String, Value>>(&publish.payload) {
                Ok(patch) => {
                    debug!(?version, "Desired patch received");
                    if let Err(e) = desired_tx.try_send(patch) {
                        warn!("Desired patch dropped: {e}");
                    }
                }
                Err(e) => warn!("Unparseable desired patch dropped: {e}"),
            }
        }
        Ok(InboundTopic::MethodRequest { name, rid }) => {
            let payload = if publish.payload.is_empty() {
                Value::Null
            } else {
                match serde_json::from_slice(&publish.payload) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!("Method '{name}' carried unparseable payload: {e}");
                        Value::Null
                    }
                }
            };
            if let Err(e) = method_tx.try_send(MethodRequest { name, rid, payload }) {
                warn!("Method request dropped: {e}");
            }
        }
        Err(_) => {
            debug!("Ignoring message on unmatched topic '{}'", publish.topic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconnected_client() -> (HubClient, rumqttc::EventLoop) {
        // rumqttc connects lazily; as long as nothing polls the event
        // loop there is no network activity at all.
        let mqtt_options = MqttOptions::new("test-device", "localhost", 1883);
        let (client, event_loop) = AsyncClient::new(mqtt_options, 8);
        (
            HubClient {
                device_id: "test-device".to_string(),
                client,
                pending: Arc::new(Mutex::new(HashMap::new())),
                next_rid: AtomicU64::new(1),
                closed: Arc::new(AtomicBool::new(false)),
                operation_timeout: Duration::from_secs(1),
                loop_handle: Mutex::new(None),
            },
            event_loop,
        )
    }

    // Calling disconnect twice in succession produces no error on the
    // second call, and a never-opened session is safe to close.
    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let (hub, _event_loop) = unconnected_client();
        hub.disconnect().await.expect("first disconnect");
        hub.disconnect().await.expect("second disconnect");
        hub.disconnect().await.expect("still fine");
    }

    #[tokio::test]
    async fn rids_are_unique_and_increasing() {
        let (hub, _event_loop) = unconnected_client();
        let a = hub.next_rid.fetch_add(1, Ordering::SeqCst);
        let b = hub.next_rid.fetch_add(1, Ordering::SeqCst);
        assert!(b > a);
    }
}
