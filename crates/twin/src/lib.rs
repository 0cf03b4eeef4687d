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
// Main exports for the device twin library.
//
// A twin is the remote-held record of a device's desired and
// reported configuration, synchronized asynchronously. This crate
// owns the local view of it (TwinStore), the per-key side effects
// that run when the hub patches a desired value (ActionRegistry),
// and the reconciliation logic that keeps reported state honest
// (TwinReconciler).

pub mod actions;
pub mod errors;
pub mod reconcile;
pub mod store;
pub mod value;

pub use actions::ActionRegistry;
pub use errors::TwinError;
pub use reconcile::{TwinChannel, TwinReconciler};
pub use store::{REPORTED_PREFIX, TwinDocument, TwinStore};
pub use value::TwinValue;
