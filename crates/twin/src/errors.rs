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
// Error types for twin reconciliation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwinError {
    // A reported-property push that did not reach the hub. This is
    // the invariant-breaking case: the local store now claims state
    // the hub never saw, so reconciliation surfaces it instead of
    // swallowing it.
    #[error("Failed to push reported properties: {0}")]
    ReportPush(String),

    // A full twin fetch that failed.
    #[error("Failed to fetch device twin: {0}")]
    TwinFetch(String),

    // A registered side effect that failed while consuming a desired
    // value.
    #[error("Side effect for key '{key}' failed: {message}")]
    Action { key: String, message: String },
}

impl TwinError {
    pub fn report_push(message: impl Into<String>) -> Self {
        Self::ReportPush(message.into())
    }

    pub fn twin_fetch(message: impl Into<String>) -> Self {
        Self::TwinFetch(message.into())
    }

    pub fn action(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Action {
            key: key.into(),
            message: message.into(),
        }
    }

    // is_transport_error checks whether this error came from the
    // hub round trip rather than a local side effect.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::ReportPush(_) | Self::TwinFetch(_))
    }
}
