// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Request/response correlation over two pub/sub topics.
//!
//! # Overview
//!
//! The transport has no request/reply primitive. A service is carried by a
//! request topic and a response topic:
//! - **Clients** write stamped requests and filter the shared response topic
//!   for their own identity
//! - **Services** queue incoming requests and echo each request's identity
//!   on the response
//!
//! # Topic Naming
//!
//! For a service named "/add_two_ints":
//! - Request topic: `rq/add_two_intsRequest`
//! - Reply topic: `rr/add_two_intsReply`
//!
//! # Correlation
//!
//! Each request carries a [`RequestId`] (random client writer GUID +
//! sequence number). The response carries the same pair back.

mod client;
mod service;
mod types;

pub use client::Client;
pub use service::{RequestQueue, Service};
pub use types::{RequestEnvelope, RequestId, ServiceInfo, TakenRequest, TakenResponse};

use crate::qos::{BuiltinDurabilityKind, BuiltinReliabilityKind, BuiltinTopicQos};

/// QoS for request/response endpoints
///
/// - Reliable: requests/replies are not lost
/// - Volatile: no persistence needed for transient RPC calls
pub fn rpc_qos() -> BuiltinTopicQos {
    BuiltinTopicQos {
        reliability: BuiltinReliabilityKind::Reliable,
        durability: BuiltinDurabilityKind::Volatile,
        ..BuiltinTopicQos::default()
    }
}

#[cfg(test)]
mod tests;
