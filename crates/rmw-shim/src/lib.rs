// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # rmw-shim - ROS 2 graph and RPC over DDS pub/sub
//!
//! DDS gives ROS 2 neither a request/response primitive nor a synchronous
//! view of who is on the graph. This crate provides both on top of a
//! transport reached through the traits in [`transport`]:
//!
//! - a discovery graph cache fed by the built-in publication/subscription
//!   feeds ([`graph`])
//! - request/response correlation over a request topic and a response
//!   topic ([`rpc`])
//!
//! ## Quick Start
//!
//! ```rust
//! use rmw_shim::rpc::rpc_qos;
//! use rmw_shim::transport::memory::MemoryDomain;
//! use rmw_shim::{names, Context, FramedTypeSupport, InitOptions, NamingConfig, Node};
//!
//! # fn main() -> rmw_shim::Result<()> {
//! let domain = MemoryDomain::new();
//! let participant = domain.create_participant();
//! let context = Context::init(&InitOptions::new())?;
//! let node = Node::new(
//!     &context,
//!     "adder",
//!     "/",
//!     participant.guid(),
//!     participant.publications(),
//!     participant.subscriptions(),
//! )?;
//!
//! let naming = NamingConfig::default();
//! let request = names::request_topic_name("/add", false, &naming);
//! let response = names::response_topic_name("/add", false, &naming);
//! let ts = FramedTypeSupport::new("example_interfaces", "AddTwoInts");
//!
//! let service = node.create_service(
//!     "/add",
//!     ts.clone(),
//!     participant.create_reader(&request, "Req", rpc_qos()),
//!     participant.create_writer(&response, "Rep", rpc_qos()),
//! )?;
//! let client = node.create_client(
//!     "/add",
//!     ts,
//!     participant.create_writer(&request, "Req", rpc_qos()),
//!     participant.create_reader(&response, "Rep", rpc_qos()),
//! )?;
//! assert!(node.service_server_is_available(&client)?);
//!
//! let seq = client.send_request(&vec![2, 3])?;
//! if let Some(req) = service.take_request()? {
//!     let sum = req.request.iter().sum::<u8>();
//!     service.send_response(&req.request_id(), &vec![sum])?;
//! }
//! let reply = client.take_response()?.expect("reply");
//! assert_eq!(reply.sequence_number(), seq);
//! assert_eq!(reply.response, vec![5]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +----------------------------------------------------------------+
//! |                 Node (graph queries, factories)                |
//! +-------------------------------+--------------------------------+
//! |  graph: DiscoveryListener x2  |  rpc: Client / Service         |
//! |         TopicCache            |       RequestQueue             |
//! +-------------------------------+--------------------------------+
//! |  transport: DiscoveryReader | RawWriter | RawReader | Loan     |
//! +----------------------------------------------------------------+
//! ```

pub mod condition;
pub mod config;
pub mod error;
pub mod graph;
pub mod guid;
pub mod logging;
pub mod names;
pub mod node;
pub mod qos;
pub mod rpc;
pub mod transport;
pub mod typesupport;

pub use condition::{trigger_guard_condition, GuardCondition};
pub use config::{EnvConfig, NamingConfig};
pub use error::{Error, ErrorKind, Result};
pub use graph::{DiscoveryListener, EntityType, NamesAndTypes, TopicCache, TopicCacheEntry};
pub use guid::Guid;
pub use node::{Context, InitOptions, Node};
pub use qos::QosProfile;
pub use rpc::{Client, RequestId, ServiceInfo, Service};
pub use typesupport::{FramedTypeSupport, ServiceTypeSupport};

/// Identifier stamped on every handle created by this implementation.
pub const IMPLEMENTATION_IDENTIFIER: &str = "rmw_shim";
