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
// Error type for agent runtime operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Transport(#[from] hublink::HubLinkError),

    #[error(transparent)]
    Twin(#[from] twin::TwinError),

    #[error("Sampling failed: {0}")]
    Sample(String),
}

impl AgentError {
    pub fn sample(message: impl Into<String>) -> Self {
        Self::Sample(message.into())
    }
}
