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

// src/dispatcher.rs
// Name-to-handler registry and dispatch.
//
// Handlers are type-erased async closures so different command
// shapes live in one collection. A handler produces a
// CommandOutcome: the response to send now, plus an optional
// deferred action the runtime must start only after the response has
// been delivered. That ordering is how a scheduled shutdown answers
// its caller immediately and acts later -- callers never block on
// the action itself.

use std::collections::HashMap;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::response::{CommandRequest, CommandResponse};

// DeferredAction is work that runs after the response is on the
// wire.
pub type DeferredAction = BoxFuture<'static, ()>;

// CommandOutcome pairs the immediate response with optional deferred
// work.
pub struct CommandOutcome {
    pub response: CommandResponse,
    pub deferred: Option<DeferredAction>,
}

impl CommandOutcome {
    // with_deferred schedules work to run once the response has been
    // sent.
    pub fn with_deferred(
        response: CommandResponse,
        deferred: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Self {
        Self {
            response,
            deferred: Some(Box::pin(deferred)),
        }
    }
}

impl From<CommandResponse> for CommandOutcome {
    fn from(response: CommandResponse) -> Self {
        Self {
            response,
            deferred: None,
        }
    }
}

// ErasedHandler enables storing handlers for different commands in
// the same collection: type-erased function from the request payload
// to a future outcome.
type ErasedHandler =
    Box<dyn Fn(serde_json::Value) -> BoxFuture<'static, CommandOutcome> + Send + Sync>;

// CommandDispatcher maps command names to handlers. Each agent gets
// its own dispatcher instance with exactly the commands it supports.
#[derive(Default)]
pub struct CommandDispatcher {
    handlers: HashMap<String, ErasedHandler>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    // register wires a plain handler: payload in, response out.
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = CommandResponse> + Send + 'static,
    {
        self.handlers.insert(
            name.into(),
            Box::new(move |payload| {
                let fut = handler(payload);
                Box::pin(async move { CommandOutcome::from(fut.await) })
            }),
        );
    }

    // register_deferred wires a handler that also schedules work to
    // run after its response is delivered.
    pub fn register_deferred<F, Fut>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = CommandOutcome> + Send + 'static,
    {
        self.handlers
            .insert(name.into(), Box::new(move |payload| Box::pin(handler(payload))));
    }

    // dispatch routes one request to its handler. Every request gets
    // exactly one outcome; an unrecognized name gets the structured
    // 400, never a panic.
    pub async fn dispatch(&self, request: CommandRequest) -> CommandOutcome {
        match self.handlers.get(&request.name) {
            Some(handler) => {
                debug!(command = %request.name, "Dispatching command");
                handler(request.payload).await
            }
            None => {
                warn!(command = %request.name, "Unknown command");
                CommandResponse::unknown_command(&request.name).into()
            }
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    // command_names lists the registered surface, sorted for stable
    // output.
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("commands", &self.command_names())
            .finish()
    }
}
