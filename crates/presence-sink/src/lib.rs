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
// Main exports for the presence event sink.
//
// Subscribes to the device events topic and appends presence events
// to Postgres. A malformed event is logged and dropped; the stream
// keeps flowing. Schema creation is idempotent so the sink can start
// against a fresh or an existing database.

pub mod errors;
pub mod event;
pub mod store;

pub use errors::SinkError;
pub use event::PresenceEvent;
pub use store::PresenceLogStore;
