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
// Main exports for the remote command dispatch library.
//
// A command (direct method) is a remote-invoked, named action with a
// payload and exactly one structured response. This crate maps names
// to handlers and guarantees the response contract: one response per
// request, 400 for anything unknown or malformed, and destructive
// actions deferred until after the response has gone out.

mod dispatcher;
mod response;

pub use dispatcher::{CommandDispatcher, CommandOutcome, DeferredAction};
pub use response::{
    CommandRequest, CommandResponse, STATUS_BAD_REQUEST, STATUS_OK, i64_field, str_field,
};
