// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service (replier).
//!
//! Requests are moved off the transport on its callback thread into a FIFO
//! owned by the service. The service's guard condition is set exactly while
//! that queue is non-empty; both are updated under the queue lock, so a
//! waiter never sees the flag and the queue disagree.

use crate::condition::GuardCondition;
use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::rpc::types::{RequestEnvelope, RequestId, ServiceInfo, TakenRequest};
use crate::transport::{RawReader, RawWriter};
use crate::typesupport::ServiceTypeSupport;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};

/// Batch size used when draining the request reader.
const REQUEST_DRAIN_BATCH: usize = 16;

/// FIFO of received requests plus its "non-empty" guard condition.
#[derive(Debug, Default)]
pub struct RequestQueue {
    queue: Mutex<VecDeque<RequestEnvelope>>,
    guard: Arc<GuardCondition>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and raise the guard inside the same critical section.
    pub fn push(&self, envelope: RequestEnvelope) {
        let mut queue = self.queue.lock();
        queue.push_back(envelope);
        self.guard.set_trigger_value(true);
    }

    /// Remove the oldest envelope; clears the guard when the queue empties.
    pub fn pop(&self) -> Option<RequestEnvelope> {
        let mut queue = self.queue.lock();
        let envelope = queue.pop_front();
        if queue.is_empty() {
            self.guard.set_trigger_value(false);
        }
        envelope
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub fn guard_condition(&self) -> &Arc<GuardCondition> {
        &self.guard
    }

    /// Move everything readable from `reader` into the queue.
    ///
    /// Runs on the transport callback thread; failures are logged. The queue
    /// lock is held across take and append, so concurrent callbacks on one
    /// reader queue requests in the order the reader handed them out.
    pub fn on_data_available(&self, reader: &dyn RawReader) {
        let mut queue = self.queue.lock();
        let before = queue.len();
        loop {
            match reader.raw_take(REQUEST_DRAIN_BATCH) {
                Ok(Some(mut loan)) => {
                    queue.extend(
                        loan.drain()
                            .map(|(payload, info)| RequestEnvelope::new(payload, info)),
                    );
                }
                Ok(None) => break,
                Err(e) => {
                    log::error!("[rpc] failed to take request: {}", e);
                    break;
                }
            }
        }
        if queue.len() > before {
            self.guard.set_trigger_value(true);
        }
    }
}

/// Server side of one service.
pub struct Service<T: ServiceTypeSupport> {
    service_name: String,
    participant_guid: Guid,
    request_reader: Arc<dyn RawReader>,
    response_writer: Arc<dyn RawWriter>,
    queue: Arc<RequestQueue>,
    type_support: T,
    graph_guard: Option<Arc<GuardCondition>>,
}

impl<T: ServiceTypeSupport> Service<T> {
    /// Create a service and start queueing requests from `request_reader`.
    ///
    /// Requests already waiting on the reader are queued immediately.
    pub fn new(
        service_name: &str,
        participant_guid: Guid,
        type_support: T,
        request_reader: Arc<dyn RawReader>,
        response_writer: Arc<dyn RawWriter>,
    ) -> Result<Self> {
        if service_name.is_empty() {
            return Err(Error::invalid_argument("service name is empty"));
        }

        let queue = Arc::new(RequestQueue::new());
        let sink = Arc::clone(&queue);
        let source: Weak<dyn RawReader> = Arc::downgrade(&request_reader);
        request_reader.set_on_data_available(Some(Arc::new(move || {
            if let Some(reader) = source.upgrade() {
                sink.on_data_available(&*reader);
            }
        })));
        queue.on_data_available(&*request_reader);

        log::debug!("[rpc] service '{}' created", service_name);
        Ok(Self {
            service_name: service_name.to_string(),
            participant_guid,
            request_reader,
            response_writer,
            queue,
            type_support,
            graph_guard: None,
        })
    }

    /// Trigger `guard` now and again when the service is dropped.
    pub(crate) fn with_graph_guard(mut self, guard: Arc<GuardCondition>) -> Self {
        guard.set_trigger_value(true);
        self.graph_guard = Some(guard);
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn participant_guid(&self) -> Guid {
        self.participant_guid
    }

    pub fn type_support(&self) -> &T {
        &self.type_support
    }

    /// Set exactly while requests are waiting.
    pub fn guard_condition(&self) -> &Arc<GuardCondition> {
        self.queue.guard_condition()
    }

    /// Requests waiting to be taken.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Take the oldest request without blocking.
    ///
    /// `Ok(None)` when the queue is empty or the envelope carried no valid
    /// data. A decode failure affects this envelope only; later ones stay
    /// queued.
    pub fn take_request(&self) -> Result<Option<TakenRequest<T::Request>>> {
        let Some(envelope) = self.queue.pop() else {
            return Ok(None);
        };
        if !envelope.info.valid_data {
            log::trace!("[rpc] '{}' skipped invalid request sample", self.service_name);
            return Ok(None);
        }

        let (request, sequence_number, writer_guid) =
            self.type_support.deserialize_request(&envelope.payload)?;

        Ok(Some(TakenRequest {
            info: ServiceInfo {
                source_timestamp: envelope.info.source_timestamp,
                received_timestamp: 0,
                request_id: RequestId::new(writer_guid, sequence_number),
            },
            request,
        }))
    }

    /// Serialize `response` stamped with `request_id` and write it.
    pub fn send_response(&self, request_id: &RequestId, response: &T::Response) -> Result<()> {
        let mut buffer = vec![0u8; self.type_support.response_serialized_size(response)];
        self.type_support.serialize_response(
            response,
            &mut buffer,
            request_id.sequence_number,
            &request_id.writer_guid,
        )?;
        self.response_writer.raw_write(&buffer)?;
        log::trace!(
            "[rpc] '{}' sent response {}",
            self.service_name,
            request_id
        );
        Ok(())
    }
}

impl<T: ServiceTypeSupport> Drop for Service<T> {
    fn drop(&mut self) {
        self.request_reader.set_on_data_available(None);
        if let Some(guard) = &self.graph_guard {
            guard.set_trigger_value(true);
        }
        log::debug!("[rpc] service '{}' destroyed", self.service_name);
    }
}

impl<T: ServiceTypeSupport> std::fmt::Debug for Service<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("service_name", &self.service_name)
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}
