// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS snapshot reported through graph queries.
//!
//! Built-in discovery data only carries a subset of the DDS policies. The
//! snapshot is reconstructed from that subset; history is absent on the
//! wire and therefore always reported as [`HistoryPolicy::Unknown`] with a
//! system-default depth.

use std::time::Duration;

/// Depth value meaning "use the middleware default".
pub const DEPTH_SYSTEM_DEFAULT: usize = 0;

/// Duration reported for policies that never expire.
pub const DURATION_INFINITE: Duration = Duration::new(9_223_372_036, 854_775_807);

/// Duration reported for unset policies.
pub const DURATION_UNSPECIFIED: Duration = Duration::ZERO;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryPolicy {
    #[default]
    SystemDefault,
    KeepLast,
    KeepAll,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReliabilityPolicy {
    #[default]
    SystemDefault,
    Reliable,
    BestEffort,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurabilityPolicy {
    #[default]
    SystemDefault,
    TransientLocal,
    Volatile,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LivelinessPolicy {
    #[default]
    SystemDefault,
    Automatic,
    ManualByNode,
    ManualByTopic,
    Unknown,
}

/// QoS settings captured for a discovered endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QosProfile {
    pub history: HistoryPolicy,
    pub depth: usize,
    pub reliability: ReliabilityPolicy,
    pub durability: DurabilityPolicy,
    pub deadline: Duration,
    pub lifespan: Duration,
    pub liveliness: LivelinessPolicy,
    pub liveliness_lease_duration: Duration,
    pub avoid_ros_namespace_conventions: bool,
}

/// DDS reliability kind as carried by built-in topic data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuiltinReliabilityKind {
    #[default]
    BestEffort,
    Reliable,
}

/// DDS durability kind as carried by built-in topic data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuiltinDurabilityKind {
    #[default]
    Volatile,
    TransientLocal,
    Transient,
    Persistent,
}

/// DDS liveliness kind as carried by built-in topic data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuiltinLivelinessKind {
    #[default]
    Automatic,
    ManualByParticipant,
    ManualByTopic,
}

/// DDS `Duration_t` (seconds + nanoseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsDuration {
    pub sec: i32,
    pub nanosec: u32,
}

impl DdsDuration {
    /// `DURATION_INFINITE` as carried on the wire: `0x7fffffff` in both fields.
    pub const INFINITE: Self = Self {
        sec: 0x7fff_ffff,
        nanosec: 0x7fff_ffff,
    };

    pub const ZERO: Self = Self { sec: 0, nanosec: 0 };

    pub fn is_infinite(&self) -> bool {
        *self == Self::INFINITE
    }

    /// Convert to a std duration; negative values clamp to zero.
    pub fn to_std(self) -> Duration {
        if self.is_infinite() {
            return DURATION_INFINITE;
        }
        let secs = u64::try_from(self.sec).unwrap_or(0);
        Duration::new(secs, self.nanosec.min(999_999_999))
    }
}

impl Default for DdsDuration {
    fn default() -> Self {
        Self::INFINITE
    }
}

/// Policies present in publication/subscription built-in topic data.
///
/// `lifespan` is only present for publications.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuiltinTopicQos {
    pub reliability: BuiltinReliabilityKind,
    pub durability: BuiltinDurabilityKind,
    pub deadline: DdsDuration,
    pub lifespan: Option<DdsDuration>,
    pub liveliness: BuiltinLivelinessKind,
    pub liveliness_lease_duration: DdsDuration,
}

impl From<BuiltinReliabilityKind> for ReliabilityPolicy {
    fn from(kind: BuiltinReliabilityKind) -> Self {
        match kind {
            BuiltinReliabilityKind::BestEffort => Self::BestEffort,
            BuiltinReliabilityKind::Reliable => Self::Reliable,
        }
    }
}

impl From<BuiltinDurabilityKind> for DurabilityPolicy {
    fn from(kind: BuiltinDurabilityKind) -> Self {
        match kind {
            BuiltinDurabilityKind::Volatile => Self::Volatile,
            BuiltinDurabilityKind::TransientLocal => Self::TransientLocal,
            // No ROS equivalent for TRANSIENT / PERSISTENT.
            BuiltinDurabilityKind::Transient | BuiltinDurabilityKind::Persistent => Self::Unknown,
        }
    }
}

impl From<BuiltinLivelinessKind> for LivelinessPolicy {
    fn from(kind: BuiltinLivelinessKind) -> Self {
        match kind {
            BuiltinLivelinessKind::Automatic => Self::Automatic,
            BuiltinLivelinessKind::ManualByParticipant => Self::ManualByNode,
            BuiltinLivelinessKind::ManualByTopic => Self::ManualByTopic,
        }
    }
}

impl QosProfile {
    /// Rebuild a snapshot from discovery data.
    ///
    /// History is not part of built-in topic data and is reported as
    /// `Unknown`; it is never guessed.
    pub fn from_builtin(qos: &BuiltinTopicQos) -> Self {
        Self {
            history: HistoryPolicy::Unknown,
            depth: DEPTH_SYSTEM_DEFAULT,
            reliability: qos.reliability.into(),
            durability: qos.durability.into(),
            deadline: qos.deadline.to_std(),
            lifespan: qos.lifespan.map_or(DURATION_UNSPECIFIED, DdsDuration::to_std),
            liveliness: qos.liveliness.into(),
            liveliness_lease_duration: qos.liveliness_lease_duration.to_std(),
            avoid_ros_namespace_conventions: false,
        }
    }
}
