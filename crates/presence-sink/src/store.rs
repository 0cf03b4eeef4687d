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

// src/store.rs
// The presence_logs table: idempotent schema setup and append-only
// inserts. received_time is server-assigned; the index on event_time
// serves range queries over device history.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::errors::SinkError;
use crate::event::PresenceEvent;

const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS presence_logs (
    id BIGSERIAL PRIMARY KEY,
    device_id TEXT NOT NULL,
    presence_status TEXT NOT NULL,
    is_present BOOLEAN NOT NULL,
    event_type TEXT NOT NULL,
    event_time TIMESTAMPTZ NOT NULL,
    received_time TIMESTAMPTZ NOT NULL DEFAULT now(),
    additional_data JSONB
)";

const CREATE_EVENT_TIME_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS ix_presence_logs_event_time ON presence_logs (event_time)";

const INSERT_EVENT: &str = "
INSERT INTO presence_logs
    (device_id, presence_status, is_present, event_type, event_time, additional_data)
VALUES ($1, $2, $3, $4, $5, $6)";

pub struct PresenceLogStore {
    pool: PgPool,
}

impl PresenceLogStore {
    // connect opens a pool and makes sure the schema exists. Both
    // DDL statements are IF NOT EXISTS, so rerunning against an
    // initialized database is a no-op.
    pub async fn connect(database_url: &str) -> Result<Self, SinkError> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(database_url)
            .await
            .map_err(SinkError::Connect)?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), SinkError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| SinkError::query(CREATE_TABLE, e))?;
        sqlx::query(CREATE_EVENT_TIME_INDEX)
            .execute(&self.pool)
            .await
            .map_err(|e| SinkError::query(CREATE_EVENT_TIME_INDEX, e))?;
        info!("Presence log schema ready");
        Ok(())
    }

    // insert appends one event; received_time comes from the server
    // default.
    pub async fn insert(&self, event: &PresenceEvent) -> Result<(), SinkError> {
        sqlx::query(INSERT_EVENT)
            .bind(&event.device_id)
            .bind(&event.presence_status)
            .bind(event.is_present)
            .bind(&event.event_type)
            .bind(event.event_time)
            .bind(
                event
                    .additional_data
                    .as_ref()
                    .map(|data| sqlx::types::Json(data.clone())),
            )
            .execute(&self.pool)
            .await
            .map_err(|e| SinkError::query(INSERT_EVENT, e))?;
        Ok(())
    }

    // process appends one raw payload: parse, then insert. Callers
    // decide what each error class means (parse faults drop the
    // event, query faults are worth retrying the connection over).
    pub async fn process(&self, payload: &[u8]) -> Result<(), SinkError> {
        let event = PresenceEvent::parse(payload)?;
        self.insert(&event).await?;
        info!(
            device_id = %event.device_id,
            presence_status = %event.presence_status,
            "Presence event logged"
        );
        Ok(())
    }
}
