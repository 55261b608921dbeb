// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ROS <-> DDS topic-name mangling.
//!
//! | ROS entity          | DDS topic                  |
//! |---------------------|----------------------------|
//! | topic `/chatter`    | `rt/chatter`               |
//! | service `/add` req  | `rq/addRequest`            |
//! | service `/add` rep  | `rr/addReply`              |
//!
//! With `avoid_ros_namespace_conventions` the prefix is dropped and only
//! the suffix is appended.

use crate::config::NamingConfig;

/// Which half of a service a topic carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceRole {
    Request,
    Response,
}

fn mangle(prefix: &str, name: &str, suffix: &str, avoid_ros_namespace_conventions: bool) -> String {
    if avoid_ros_namespace_conventions {
        format!("{name}{suffix}")
    } else if name.starts_with('/') {
        format!("{prefix}{name}{suffix}")
    } else {
        format!("{prefix}/{name}{suffix}")
    }
}

/// DDS topic carrying requests of `service_name`.
pub fn request_topic_name(
    service_name: &str,
    avoid_ros_namespace_conventions: bool,
    naming: &NamingConfig,
) -> String {
    mangle(
        &naming.request_prefix,
        service_name,
        &naming.request_suffix,
        avoid_ros_namespace_conventions,
    )
}

/// DDS topic carrying responses of `service_name`.
pub fn response_topic_name(
    service_name: &str,
    avoid_ros_namespace_conventions: bool,
    naming: &NamingConfig,
) -> String {
    mangle(
        &naming.response_prefix,
        service_name,
        &naming.response_suffix,
        avoid_ros_namespace_conventions,
    )
}

/// Strip `<prefix>` from `name` when it is followed by `/`.
fn strip_prefix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    name.strip_prefix(prefix).filter(|rest| rest.starts_with('/'))
}

/// `true` if `topic_name` belongs to a hidden ROS namespace (services, actions, parameters).
pub fn is_hidden_topic(topic_name: &str, naming: &NamingConfig) -> bool {
    naming
        .hidden_prefixes
        .iter()
        .any(|p| strip_prefix(topic_name, p).is_some())
}

/// ROS name of a plain topic: `rt/chatter` -> `/chatter`.
///
/// Returns `None` for names outside the plain topic namespace.
pub fn demangle_topic_name(topic_name: &str, naming: &NamingConfig) -> Option<String> {
    strip_prefix(topic_name, &naming.topic_prefix).map(str::to_string)
}

/// Service name and role of a service topic: `rq/addRequest` -> `(/add, Request)`.
pub fn demangle_service_topic(
    topic_name: &str,
    naming: &NamingConfig,
) -> Option<(String, ServiceRole)> {
    let candidates = [
        (
            &naming.request_prefix,
            &naming.request_suffix,
            ServiceRole::Request,
        ),
        (
            &naming.response_prefix,
            &naming.response_suffix,
            ServiceRole::Response,
        ),
    ];
    candidates.iter().find_map(|(prefix, suffix, role)| {
        let service = strip_prefix(topic_name, prefix)?.strip_suffix(suffix.as_str())?;
        // "rq/Request" has no service name left
        (service.len() > 1).then(|| (service.to_string(), *role))
    })
}

/// Service type from a request/response message type:
/// `pkg::srv::dds_::AddTwoInts_Request_` -> `pkg::srv::dds_::AddTwoInts`.
///
/// Type names without either suffix are returned unchanged.
pub fn demangle_service_type(type_name: &str, naming: &NamingConfig) -> String {
    type_name
        .strip_suffix(naming.request_type_suffix.as_str())
        .or_else(|| type_name.strip_suffix(naming.response_type_suffix.as_str()))
        .unwrap_or(type_name)
        .to_string()
}
