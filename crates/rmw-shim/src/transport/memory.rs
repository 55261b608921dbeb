// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process loopback transport.
//!
//! A [`MemoryDomain`] connects every participant created from it. Writers
//! deliver straight into matching readers on the writer's thread, and every
//! endpoint creation or removal is announced on each participant's built-in
//! publication/subscription feeds, the same way a DDS participant would see
//! it through SEDP.
//!
//! Loans handed out by readers and feeds are tracked so tests can check that
//! every take path returns its buffers. One-shot [`Fault`]s make the next
//! take or write fail.

use super::{
    BuiltinTopicData, DataAvailableCallback, DiscoveryReader, Loan, LoanOwner, RawReader,
    RawWriter, SampleInfo,
};
use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::qos::BuiltinTopicQos;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{SystemTime, UNIX_EPOCH};

/// Failure injected into the next transport operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Storage for samples/infos could not be handed out.
    OutOfResources,
    /// Generic non-OK transport return.
    Transport,
}

impl Fault {
    fn into_error(self, op: &str) -> Error {
        match self {
            Self::OutOfResources => Error::OutOfResources(format!("{op}: no loan available")),
            Self::Transport => Error::transport(format!("{op}: injected failure")),
        }
    }
}

fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndpointKind {
    Publication,
    Subscription,
}

#[derive(Default)]
struct LoanLedger {
    next_token: AtomicU64,
    outstanding: DashSet<u64>,
}

impl LoanLedger {
    fn lend(&self) -> u64 {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.outstanding.insert(token);
        token
    }

    fn give_back(&self, token: u64) {
        if self.outstanding.remove(&token).is_none() {
            log::warn!("[memory] loan {} returned twice", token);
        }
    }

    fn outstanding(&self) -> usize {
        self.outstanding.len()
    }
}

#[derive(Default)]
struct Callback(Mutex<Option<DataAvailableCallback>>);

impl Callback {
    fn set(&self, callback: Option<DataAvailableCallback>) {
        *self.0.lock() = callback;
    }

    fn fire(&self) {
        // Clone out so the callback may re-register or take without deadlock.
        let callback = self.0.lock().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}

#[derive(Default)]
struct TopicEndpoints {
    writers: Vec<Guid>,
    readers: Vec<(Guid, Weak<MemoryReader>)>,
}

struct ParticipantFeeds {
    publications: Arc<MemoryDiscoveryFeed>,
    subscriptions: Arc<MemoryDiscoveryFeed>,
}

#[derive(Default)]
struct DomainInner {
    topics: DashMap<String, TopicEndpoints>,
    participants: DashMap<Guid, ParticipantFeeds>,
    /// Live endpoints, replayed to participants that join late.
    endpoints: DashMap<Guid, (EndpointKind, BuiltinTopicData)>,
    next_participant: AtomicU32,
}

impl DomainInner {
    fn feeds(&self, kind: EndpointKind) -> Vec<Arc<MemoryDiscoveryFeed>> {
        self.participants
            .iter()
            .map(|p| match kind {
                EndpointKind::Publication => Arc::clone(&p.publications),
                EndpointKind::Subscription => Arc::clone(&p.subscriptions),
            })
            .collect()
    }

    fn announce(&self, guid: Guid, kind: EndpointKind, data: BuiltinTopicData) {
        self.endpoints.insert(guid, (kind, data.clone()));
        let info = SampleInfo::alive(Some(guid), now_nanos());
        for feed in self.feeds(kind) {
            feed.publish(data.clone(), info);
        }
    }

    fn dispose(&self, guid: Guid) {
        let Some((_, (kind, data))) = self.endpoints.remove(&guid) else {
            return;
        };
        let info = SampleInfo::disposed(Some(guid));
        for feed in self.feeds(kind) {
            feed.publish(data.clone(), info);
        }
    }

    fn live_readers(&self, topic_name: &str) -> Vec<Arc<MemoryReader>> {
        self.topics
            .get(topic_name)
            .map(|t| t.readers.iter().filter_map(|(_, r)| r.upgrade()).collect())
            .unwrap_or_default()
    }
}

/// Shared loopback domain.
#[derive(Clone, Default)]
pub struct MemoryDomain {
    inner: Arc<DomainInner>,
}

impl MemoryDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the domain. Endpoints that already exist are replayed on the
    /// new participant's discovery feeds.
    pub fn create_participant(&self) -> MemoryParticipant {
        let index = self.inner.next_participant.fetch_add(1, Ordering::Relaxed);
        let mut bytes = Guid::random().as_bytes();
        bytes[8..12].copy_from_slice(&index.to_be_bytes());
        bytes[12..].copy_from_slice(&[0, 0, 1, 0xc1]);
        let guid = Guid::from_bytes(bytes);

        let publications = Arc::new(MemoryDiscoveryFeed::new());
        let subscriptions = Arc::new(MemoryDiscoveryFeed::new());
        for entry in self.inner.endpoints.iter() {
            let (kind, data) = entry.value();
            let feed = match kind {
                EndpointKind::Publication => &publications,
                EndpointKind::Subscription => &subscriptions,
            };
            feed.push(data.clone(), SampleInfo::alive(Some(*entry.key()), now_nanos()));
        }

        self.inner.participants.insert(
            guid,
            ParticipantFeeds {
                publications: Arc::clone(&publications),
                subscriptions: Arc::clone(&subscriptions),
            },
        );
        log::debug!("[memory] participant {} joined", guid);

        MemoryParticipant {
            guid,
            domain: Arc::clone(&self.inner),
            next_entity: AtomicU32::new(1),
            publications,
            subscriptions,
        }
    }
}

/// Participant in a [`MemoryDomain`].
pub struct MemoryParticipant {
    guid: Guid,
    domain: Arc<DomainInner>,
    next_entity: AtomicU32,
    publications: Arc<MemoryDiscoveryFeed>,
    subscriptions: Arc<MemoryDiscoveryFeed>,
}

impl MemoryParticipant {
    pub fn guid(&self) -> Guid {
        self.guid
    }

    /// Built-in publication feed.
    pub fn publications(&self) -> Arc<MemoryDiscoveryFeed> {
        Arc::clone(&self.publications)
    }

    /// Built-in subscription feed.
    pub fn subscriptions(&self) -> Arc<MemoryDiscoveryFeed> {
        Arc::clone(&self.subscriptions)
    }

    fn endpoint_guid(&self, kind: u8) -> Guid {
        let entity = self.next_entity.fetch_add(1, Ordering::Relaxed);
        let mut bytes = self.guid.as_bytes();
        bytes[12..15].copy_from_slice(&entity.to_be_bytes()[1..]);
        bytes[15] = kind;
        Guid::from_bytes(bytes)
    }

    fn topic_data(
        &self,
        topic_name: &str,
        type_name: &str,
        qos: BuiltinTopicQos,
    ) -> BuiltinTopicData {
        BuiltinTopicData {
            participant_key: self.guid,
            topic_name: topic_name.to_string(),
            type_name: type_name.to_string(),
            qos,
        }
    }

    pub fn create_writer(
        &self,
        topic_name: &str,
        type_name: &str,
        qos: BuiltinTopicQos,
    ) -> Arc<MemoryWriter> {
        let guid = self.endpoint_guid(0x03);
        self.domain
            .topics
            .entry(topic_name.to_string())
            .or_default()
            .writers
            .push(guid);

        let mut qos = qos;
        qos.lifespan.get_or_insert(crate::qos::DdsDuration::INFINITE);
        self.domain.announce(
            guid,
            EndpointKind::Publication,
            self.topic_data(topic_name, type_name, qos),
        );

        Arc::new(MemoryWriter {
            guid,
            topic_name: topic_name.to_string(),
            domain: Arc::clone(&self.domain),
            fault: Mutex::new(None),
        })
    }

    pub fn create_reader(
        &self,
        topic_name: &str,
        type_name: &str,
        qos: BuiltinTopicQos,
    ) -> Arc<MemoryReader> {
        let guid = self.endpoint_guid(0x04);
        let reader = Arc::new(MemoryReader {
            guid,
            topic_name: topic_name.to_string(),
            domain: Arc::clone(&self.domain),
            queue: Mutex::new(VecDeque::new()),
            callback: Callback::default(),
            loans: LoanLedger::default(),
            fault: Mutex::new(None),
        });
        self.domain
            .topics
            .entry(topic_name.to_string())
            .or_default()
            .readers
            .push((guid, Arc::downgrade(&reader)));

        let mut qos = qos;
        qos.lifespan = None;
        self.domain.announce(
            guid,
            EndpointKind::Subscription,
            self.topic_data(topic_name, type_name, qos),
        );
        reader
    }
}

impl Drop for MemoryParticipant {
    fn drop(&mut self) {
        self.domain.participants.remove(&self.guid);
        log::debug!("[memory] participant {} left", self.guid);
    }
}

/// Loopback writer of pre-serialized samples.
pub struct MemoryWriter {
    guid: Guid,
    topic_name: String,
    domain: Arc<DomainInner>,
    fault: Mutex<Option<Fault>>,
}

impl MemoryWriter {
    pub fn guid(&self) -> Guid {
        self.guid
    }

    /// Make the next write or match query fail.
    pub fn inject_fault(&self, fault: Fault) {
        *self.fault.lock() = Some(fault);
    }
}

impl RawWriter for MemoryWriter {
    fn raw_write(&self, data: &[u8]) -> Result<()> {
        if let Some(fault) = self.fault.lock().take() {
            return Err(fault.into_error("write"));
        }
        let info = SampleInfo::alive(Some(self.guid), now_nanos());
        for reader in self.domain.live_readers(&self.topic_name) {
            reader.deliver(data.to_vec(), info);
        }
        Ok(())
    }

    fn matched_subscription_count(&self) -> Result<usize> {
        if let Some(fault) = self.fault.lock().take() {
            return Err(fault.into_error("matched subscriptions"));
        }
        Ok(self.domain.live_readers(&self.topic_name).len())
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        if let Some(mut topic) = self.domain.topics.get_mut(&self.topic_name) {
            topic.writers.retain(|g| *g != self.guid);
        }
        self.domain.dispose(self.guid);
    }
}

/// Loopback reader of pre-serialized samples.
pub struct MemoryReader {
    guid: Guid,
    topic_name: String,
    domain: Arc<DomainInner>,
    queue: Mutex<VecDeque<(Vec<u8>, SampleInfo)>>,
    callback: Callback,
    loans: LoanLedger,
    fault: Mutex<Option<Fault>>,
}

impl MemoryReader {
    pub fn guid(&self) -> Guid {
        self.guid
    }

    /// Enqueue a sample and fire the data-available callback.
    pub fn deliver(&self, data: Vec<u8>, info: SampleInfo) {
        self.queue.lock().push_back((data, info));
        self.callback.fire();
    }

    /// Samples waiting to be taken.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Loans handed out and not yet returned.
    pub fn outstanding_loans(&self) -> usize {
        self.loans.outstanding()
    }

    /// Make the next take or match query fail.
    pub fn inject_fault(&self, fault: Fault) {
        *self.fault.lock() = Some(fault);
    }
}

impl LoanOwner for MemoryReader {
    fn return_loan(&self, token: u64) {
        self.loans.give_back(token);
    }
}

impl RawReader for MemoryReader {
    fn raw_take(&self, max_samples: usize) -> Result<Option<Loan<'_, Vec<u8>>>> {
        if let Some(fault) = self.fault.lock().take() {
            return Err(fault.into_error("take"));
        }
        let (samples, infos): (Vec<_>, Vec<_>) = {
            let mut queue = self.queue.lock();
            let count = max_samples.max(1).min(queue.len());
            queue.drain(..count).unzip()
        };
        if samples.is_empty() {
            return Ok(None);
        }
        Ok(Some(Loan::new(self, self.loans.lend(), samples, infos)))
    }

    fn matched_publication_count(&self) -> Result<usize> {
        if let Some(fault) = self.fault.lock().take() {
            return Err(fault.into_error("matched publications"));
        }
        Ok(self
            .domain
            .topics
            .get(&self.topic_name)
            .map_or(0, |t| t.writers.len()))
    }

    fn set_on_data_available(&self, callback: Option<DataAvailableCallback>) {
        self.callback.set(callback);
    }
}

impl Drop for MemoryReader {
    fn drop(&mut self) {
        if let Some(mut topic) = self.domain.topics.get_mut(&self.topic_name) {
            topic.readers.retain(|(g, _)| *g != self.guid);
        }
        self.domain.dispose(self.guid);
    }
}

/// Built-in discovery feed of one participant.
///
/// Also usable on its own to script arbitrary discovery traffic: samples
/// without an instance handle, dispose notifications, invalid data.
#[derive(Default)]
pub struct MemoryDiscoveryFeed {
    queue: Mutex<VecDeque<(BuiltinTopicData, SampleInfo)>>,
    callback: Callback,
    loans: LoanLedger,
    fault: Mutex<Option<Fault>>,
}

impl MemoryDiscoveryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a sample without notifying.
    pub fn push(&self, data: BuiltinTopicData, info: SampleInfo) {
        self.queue.lock().push_back((data, info));
    }

    /// Enqueue a sample and fire the data-available callback.
    pub fn publish(&self, data: BuiltinTopicData, info: SampleInfo) {
        self.push(data, info);
        self.notify();
    }

    /// Fire the data-available callback.
    pub fn notify(&self) {
        self.callback.fire();
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn outstanding_loans(&self) -> usize {
        self.loans.outstanding()
    }

    /// Make the next take fail.
    pub fn inject_fault(&self, fault: Fault) {
        *self.fault.lock() = Some(fault);
    }
}

impl LoanOwner for MemoryDiscoveryFeed {
    fn return_loan(&self, token: u64) {
        self.loans.give_back(token);
    }
}

impl DiscoveryReader for MemoryDiscoveryFeed {
    fn take(&self, max_samples: usize) -> Result<Option<Loan<'_, BuiltinTopicData>>> {
        if let Some(fault) = self.fault.lock().take() {
            return Err(fault.into_error("discovery take"));
        }
        let (samples, infos): (Vec<_>, Vec<_>) = {
            let mut queue = self.queue.lock();
            let count = max_samples.max(1).min(queue.len());
            queue.drain(..count).unzip()
        };
        if samples.is_empty() {
            return Ok(None);
        }
        Ok(Some(Loan::new(self, self.loans.lend(), samples, infos)))
    }

    fn set_on_data_available(&self, callback: Option<DataAvailableCallback>) {
        self.callback.set(callback);
    }
}
