// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data-available handler for the built-in discovery feeds.

use super::{EntityType, NamesAndTypes, TopicCache};
use crate::condition::{trigger_guard_condition, GuardCondition};
use crate::config::{NamingConfig, DEFAULT_DISCOVERY_BATCH};
use crate::guid::Guid;
use crate::names::ServiceRole;
use crate::qos::{BuiltinTopicQos, QosProfile, DURATION_UNSPECIFIED};
use crate::transport::{BuiltinTopicData, DiscoveryReader, SampleInfo};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// State shared by a listener's callbacks and the node's graph queries.
///
/// The mutex serializes discovery callbacks against each other and against
/// queries; the cache is only reachable through it.
#[derive(Debug)]
pub struct ListenerContext {
    cache: Mutex<TopicCache>,
    graph_guard: Arc<GuardCondition>,
    implementation_identifier: &'static str,
}

impl ListenerContext {
    pub fn new(graph_guard: Arc<GuardCondition>) -> Self {
        Self {
            cache: Mutex::new(TopicCache::new()),
            graph_guard,
            implementation_identifier: crate::IMPLEMENTATION_IDENTIFIER,
        }
    }

    /// Lock the cache.
    pub fn lock(&self) -> MutexGuard<'_, TopicCache> {
        self.cache.lock()
    }

    pub fn graph_guard(&self) -> &Arc<GuardCondition> {
        &self.graph_guard
    }

    pub fn implementation_identifier(&self) -> &'static str {
        self.implementation_identifier
    }

    fn trigger(&self) {
        if let Err(e) = trigger_guard_condition(self.implementation_identifier, &self.graph_guard)
        {
            log::error!("[graph] failed to trigger graph guard condition: {}", e);
        }
    }
}

/// Publications keep their advertised lifespan.
fn publication_qos(qos: &BuiltinTopicQos) -> QosProfile {
    QosProfile::from_builtin(qos)
}

/// Lifespan is a writer-side policy; subscriptions report the default.
fn subscription_qos(qos: &BuiltinTopicQos) -> QosProfile {
    QosProfile {
        lifespan: DURATION_UNSPECIFIED,
        ..QosProfile::from_builtin(qos)
    }
}

/// Folds one discovery feed into a [`TopicCache`].
///
/// # Example
/// ```
/// use rmw_shim::graph::{DiscoveryListener, EntityType};
/// use rmw_shim::transport::memory::MemoryDomain;
/// use rmw_shim::qos::BuiltinTopicQos;
/// use rmw_shim::GuardCondition;
/// use std::sync::Arc;
///
/// let domain = MemoryDomain::new();
/// let participant = domain.create_participant();
/// let _writer = participant.create_writer("rt/chatter", "String_", BuiltinTopicQos::default());
///
/// let guard = Arc::new(GuardCondition::new());
/// let listener = DiscoveryListener::new(EntityType::Publisher, Arc::clone(&guard));
/// listener.on_data_available(&*participant.publications());
///
/// assert_eq!(listener.count_topic("rt/chatter"), 1);
/// assert!(guard.get_trigger_value());
/// ```
pub struct DiscoveryListener {
    entity_type: EntityType,
    context: ListenerContext,
    batch_size: usize,
    decode_qos: fn(&BuiltinTopicQos) -> QosProfile,
}

impl DiscoveryListener {
    pub fn new(entity_type: EntityType, graph_guard: Arc<GuardCondition>) -> Self {
        Self::with_batch_size(entity_type, graph_guard, DEFAULT_DISCOVERY_BATCH)
    }

    /// Listener taking at most `batch_size` samples per take (clamped to >= 1).
    pub fn with_batch_size(
        entity_type: EntityType,
        graph_guard: Arc<GuardCondition>,
        batch_size: usize,
    ) -> Self {
        let decode_qos: fn(&BuiltinTopicQos) -> QosProfile = match entity_type {
            EntityType::Publisher => publication_qos,
            EntityType::Subscriber => subscription_qos,
        };
        Self {
            entity_type,
            context: ListenerContext::new(graph_guard),
            batch_size: batch_size.max(1),
            decode_qos,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn context(&self) -> &ListenerContext {
        &self.context
    }

    /// Drain `reader` into the cache.
    ///
    /// Takes batches until the feed reports no data, then triggers the
    /// graph guard once if anything was taken. A take failure is logged and
    /// ends the drain; batches already applied stay applied and are still
    /// signalled. Returns the number of samples taken.
    pub fn on_data_available(&self, reader: &dyn DiscoveryReader) -> usize {
        let mut cache = self.context.lock();
        let mut taken = 0usize;

        loop {
            let loan = match reader.take(self.batch_size) {
                Ok(Some(loan)) => loan,
                Ok(None) => break,
                Err(e) => {
                    log::error!(
                        "[graph] failed to take from built-in {} reader: {}",
                        self.entity_type,
                        e
                    );
                    break;
                }
            };
            taken += loan.len();
            for (data, info) in loan.iter() {
                self.apply(&mut cache, data, info);
            }
        }

        if taken > 0 {
            log::debug!(
                "[graph] {} discovery batch: {} sample(s), {} entities cached",
                self.entity_type,
                taken,
                cache.len()
            );
            self.context.trigger();
        }
        taken
    }

    fn apply(&self, cache: &mut TopicCache, data: &BuiltinTopicData, info: &SampleInfo) {
        let Some(entity_guid) = info.instance_handle else {
            return;
        };
        if info.is_alive() {
            cache.add_topic(
                data.participant_key,
                entity_guid,
                data.topic_name.as_str(),
                data.type_name.as_str(),
                (self.decode_qos)(&data.qos),
            );
        } else {
            cache.remove_topic(&entity_guid);
        }
    }

    /// Record a locally created entity without waiting for discovery.
    pub fn add_information(
        &self,
        participant_guid: Guid,
        entity_guid: Guid,
        topic_name: &str,
        type_name: &str,
        qos: QosProfile,
    ) {
        self.context
            .lock()
            .add_topic(participant_guid, entity_guid, topic_name, type_name, qos);
    }

    /// Forget a locally destroyed entity.
    pub fn remove_information(&self, entity_guid: &Guid) {
        self.context.lock().remove_topic(entity_guid);
    }

    pub fn trigger_graph_guard_condition(&self) {
        self.context.trigger();
    }

    pub fn count_topic(&self, topic_name: &str) -> usize {
        self.context.lock().count_topic(topic_name)
    }

    pub fn topic_names_and_types(&self, demangle: bool, naming: &NamingConfig) -> NamesAndTypes {
        self.context.lock().topic_names_and_types(demangle, naming)
    }

    pub fn topic_names_and_types_by_participant(
        &self,
        participant_guid: &Guid,
        demangle: bool,
        naming: &NamingConfig,
    ) -> NamesAndTypes {
        self.context
            .lock()
            .topic_names_and_types_by_participant(participant_guid, demangle, naming)
    }

    pub fn service_names_and_types(&self, naming: &NamingConfig) -> NamesAndTypes {
        self.context.lock().service_names_and_types(naming)
    }

    pub fn service_names_and_types_by_participant(
        &self,
        participant_guid: &Guid,
        role: ServiceRole,
        naming: &NamingConfig,
    ) -> NamesAndTypes {
        self.context
            .lock()
            .service_names_and_types_by_participant(participant_guid, role, naming)
    }
}

impl std::fmt::Debug for DiscoveryListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryListener")
            .field("entity_type", &self.entity_type)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}
