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
// Main exports for the hublink device client library.

pub mod client;
pub mod errors;
pub mod message;
pub mod sas;

// Export some things for convenience.
pub use client::{
    ClientCredentials, ClientOptions, ClientTlsConfig, HubClient, HubEvents, MethodRequest,
};
pub use errors::HubLinkError;
pub use message::TelemetryMessage;
pub use rumqttc::QoS;
