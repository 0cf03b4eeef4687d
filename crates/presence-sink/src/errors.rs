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

// src/errors.rs
// Error types for the presence sink: parse faults (drop the event,
// keep going) and database faults (the query is part of the error so
// logs are actionable).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Unparseable event JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Event is not a JSON object")]
    NotAnObject,

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Query failed: {query}: {source}")]
    Query {
        query: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database connection failed: {0}")]
    Connect(#[source] sqlx::Error),
}

impl SinkError {
    // query wraps a sqlx error with the statement that produced it.
    pub fn query(query: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Query {
            query: query.into(),
            source,
        }
    }

    // is_parse_error checks whether this is a drop-the-event fault
    // rather than a database fault.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::NotAnObject | Self::MissingField(_)
        )
    }
}
