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
// Main exports for the shared device agent runtime.
//
// Every agent in this workspace is the same machine: a connected hub
// session, a twin store reconciled from desired patches, a command
// dispatcher answering direct methods, and one or more periodic
// report loops. This crate is that machine; the agent binaries only
// supply samplers, handlers, and wiring.

pub mod channel;
pub mod errors;
pub mod loops;
pub mod pumps;

pub use channel::{CommandLink, HubChannel, TelemetrySink};
pub use errors::AgentError;
pub use loops::{Cadence, ReportLoop, Sampler};
pub use pumps::{run_desired_patch_pump, run_method_pump};
