// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entity GUID -> topic table for one discovery feed.

use super::NamesAndTypes;
use crate::config::NamingConfig;
use crate::guid::Guid;
use crate::names::{self, ServiceRole};
use crate::qos::QosProfile;
use std::collections::{BTreeSet, HashMap};

/// One discovered publication or subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicCacheEntry {
    pub participant_guid: Guid,
    pub topic_name: String,
    pub type_name: String,
    pub qos: QosProfile,
}

/// Table of discovered endpoints keyed by entity GUID.
///
/// Not synchronized: the owning [`DiscoveryListener`](super::DiscoveryListener)
/// holds it behind its mutex, and every query runs under that lock.
#[derive(Debug, Default)]
pub struct TopicCache {
    entries: HashMap<Guid, TopicCacheEntry>,
    /// participant GUID -> entity GUIDs it owns
    by_participant: HashMap<Guid, BTreeSet<Guid>>,
}

impl TopicCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the entry for `entity_guid`.
    pub fn get(&self, entity_guid: &Guid) -> Option<TopicCacheEntry> {
        self.entries.get(entity_guid).cloned()
    }

    /// Insert or overwrite the entry for `entity_guid`.
    ///
    /// Returns `true` if the entity was not known before.
    pub fn add_topic(
        &mut self,
        participant_guid: Guid,
        entity_guid: Guid,
        topic_name: impl Into<String>,
        type_name: impl Into<String>,
        qos: QosProfile,
    ) -> bool {
        let entry = TopicCacheEntry {
            participant_guid,
            topic_name: topic_name.into(),
            type_name: type_name.into(),
            qos,
        };
        log::trace!(
            "[graph] add {} topic='{}' type='{}' participant={}",
            entity_guid,
            entry.topic_name,
            entry.type_name,
            participant_guid
        );

        let previous = self.entries.insert(entity_guid, entry);
        if let Some(prev) = &previous {
            if prev.participant_guid != participant_guid {
                self.unlink(&prev.participant_guid, &entity_guid);
            }
        }
        self.by_participant
            .entry(participant_guid)
            .or_default()
            .insert(entity_guid);
        previous.is_none()
    }

    /// Erase the entry for `entity_guid`; unknown GUIDs are ignored.
    ///
    /// Returns `true` if an entry was removed.
    pub fn remove_topic(&mut self, entity_guid: &Guid) -> bool {
        let Some(entry) = self.entries.remove(entity_guid) else {
            log::trace!("[graph] remove of unknown entity {} ignored", entity_guid);
            return false;
        };
        log::trace!(
            "[graph] remove {} topic='{}'",
            entity_guid,
            entry.topic_name
        );
        self.unlink(&entry.participant_guid, entity_guid);
        true
    }

    fn unlink(&mut self, participant_guid: &Guid, entity_guid: &Guid) {
        if let Some(owned) = self.by_participant.get_mut(participant_guid) {
            owned.remove(entity_guid);
            if owned.is_empty() {
                self.by_participant.remove(participant_guid);
            }
        }
    }

    /// Number of entities on `topic_name` (exact match).
    pub fn count_topic(&self, topic_name: &str) -> usize {
        self.entries
            .values()
            .filter(|e| e.topic_name == topic_name)
            .count()
    }

    fn participant_entries<'a>(
        &'a self,
        participant_guid: &Guid,
    ) -> impl Iterator<Item = &'a TopicCacheEntry> + 'a {
        self.by_participant
            .get(participant_guid)
            .into_iter()
            .flatten()
            .filter_map(|guid| self.entries.get(guid))
    }

    fn collect_topics<'a>(
        entries: impl Iterator<Item = &'a TopicCacheEntry>,
        demangle: bool,
        naming: &NamingConfig,
    ) -> NamesAndTypes {
        let mut out = NamesAndTypes::new();
        for entry in entries {
            if demangle && names::is_hidden_topic(&entry.topic_name, naming) {
                continue;
            }
            out.entry(entry.topic_name.clone())
                .or_default()
                .insert(entry.type_name.clone());
        }
        out
    }

    /// Topic name -> type names over the whole cache.
    ///
    /// With `demangle`, names under a hidden prefix are left out; names
    /// themselves are never rewritten here.
    pub fn topic_names_and_types(&self, demangle: bool, naming: &NamingConfig) -> NamesAndTypes {
        Self::collect_topics(self.entries.values(), demangle, naming)
    }

    /// Same as [`topic_names_and_types`](Self::topic_names_and_types) for one participant.
    pub fn topic_names_and_types_by_participant(
        &self,
        participant_guid: &Guid,
        demangle: bool,
        naming: &NamingConfig,
    ) -> NamesAndTypes {
        Self::collect_topics(self.participant_entries(participant_guid), demangle, naming)
    }

    fn collect_services<'a>(
        entries: impl Iterator<Item = &'a TopicCacheEntry>,
        role: Option<ServiceRole>,
        naming: &NamingConfig,
    ) -> NamesAndTypes {
        let mut out = NamesAndTypes::new();
        for entry in entries {
            let Some((service, found)) = names::demangle_service_topic(&entry.topic_name, naming)
            else {
                continue;
            };
            if role.is_some_and(|r| r != found) {
                continue;
            }
            out.entry(service)
                .or_default()
                .insert(names::demangle_service_type(&entry.type_name, naming));
        }
        out
    }

    /// Service name -> service type names.
    ///
    /// Request and response topics of one service collapse onto the same
    /// service name.
    pub fn service_names_and_types(&self, naming: &NamingConfig) -> NamesAndTypes {
        Self::collect_services(self.entries.values(), None, naming)
    }

    /// Services of one participant whose topic in this cache plays `role`.
    pub fn service_names_and_types_by_participant(
        &self,
        participant_guid: &Guid,
        role: ServiceRole,
        naming: &NamingConfig,
    ) -> NamesAndTypes {
        Self::collect_services(self.participant_entries(participant_guid), Some(role), naming)
    }

    /// Iterate over (entity GUID, entry) pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&Guid, &TopicCacheEntry)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests;
