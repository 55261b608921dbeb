// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service client (requester).
//!
//! Requests are stamped with a random per-client writer GUID and a strictly
//! increasing sequence number. Every client of a service reads the same
//! response topic, so responses for other clients show up here too: they
//! are consumed and reported as not taken.

use crate::condition::GuardCondition;
use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::rpc::types::{RequestId, ServiceInfo, TakenResponse};
use crate::transport::{RawReader, RawWriter};
use crate::typesupport::ServiceTypeSupport;
use parking_lot::Mutex;
use std::sync::Arc;

/// Client side of one service.
pub struct Client<T: ServiceTypeSupport> {
    service_name: String,
    participant_guid: Guid,
    /// Random identity stamped on every request.
    writer_guid: Guid,
    /// Last sequence number sent; the lock also serializes the send path.
    sequence_number: Mutex<i64>,
    request_writer: Arc<dyn RawWriter>,
    response_reader: Arc<dyn RawReader>,
    type_support: T,
    graph_guard: Option<Arc<GuardCondition>>,
}

impl<T: ServiceTypeSupport> Client<T> {
    /// Create a client over existing request/response endpoints.
    pub fn new(
        service_name: &str,
        participant_guid: Guid,
        type_support: T,
        request_writer: Arc<dyn RawWriter>,
        response_reader: Arc<dyn RawReader>,
    ) -> Result<Self> {
        if service_name.is_empty() {
            return Err(Error::invalid_argument("service name is empty"));
        }
        let writer_guid = Guid::random();
        log::debug!(
            "[rpc] client for '{}' created with writer {}",
            service_name,
            writer_guid
        );
        Ok(Self {
            service_name: service_name.to_string(),
            participant_guid,
            writer_guid,
            sequence_number: Mutex::new(0),
            request_writer,
            response_reader,
            type_support,
            graph_guard: None,
        })
    }

    /// Trigger `guard` now and again when the client is dropped.
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

    /// Identity stamped on this client's requests.
    pub fn writer_guid(&self) -> Guid {
        self.writer_guid
    }

    pub fn type_support(&self) -> &T {
        &self.type_support
    }

    /// Serialize and write `request`; returns its sequence number.
    ///
    /// The first request carries 1. A failed write still consumes its
    /// number, so sequence numbers are never reused.
    pub fn send_request(&self, request: &T::Request) -> Result<i64> {
        let mut last = self.sequence_number.lock();
        *last += 1;
        let sequence_number = *last;

        let mut buffer = vec![0u8; self.type_support.request_serialized_size(request)];
        self.type_support
            .serialize_request(request, &mut buffer, sequence_number, &self.writer_guid)?;
        self.request_writer.raw_write(&buffer)?;

        log::trace!(
            "[rpc] '{}' sent request {}",
            self.service_name,
            RequestId::new(self.writer_guid, sequence_number)
        );
        Ok(sequence_number)
    }

    /// Take one response without blocking.
    ///
    /// `Ok(None)` when nothing is available or when the sample answered
    /// another client (it is consumed either way). Decode failures are
    /// errors; the sample is consumed and its loan returned.
    pub fn take_response(&self) -> Result<Option<TakenResponse<T::Response>>> {
        let Some(loan) = self.response_reader.raw_take(1)? else {
            return Ok(None);
        };
        let Some((buffer, info)) = loan.iter().next() else {
            return Ok(None);
        };
        if !info.valid_data {
            return Ok(None);
        }

        let (response, sequence_number, writer_guid) =
            self.type_support.deserialize_response(buffer)?;

        if writer_guid != self.writer_guid {
            log::trace!(
                "[rpc] '{}' dropped response {} for another client",
                self.service_name,
                RequestId::new(writer_guid, sequence_number)
            );
            return Ok(None);
        }

        Ok(Some(TakenResponse {
            info: ServiceInfo {
                source_timestamp: info.source_timestamp,
                received_timestamp: 0,
                request_id: RequestId::new(writer_guid, sequence_number),
            },
            response,
        }))
    }

    /// `true` iff a server is matched on both the request and response topic.
    ///
    /// Queried fresh every call. With no matched subscription on the request
    /// writer the response reader is not consulted.
    pub fn is_service_available(&self) -> Result<bool> {
        if self.request_writer.matched_subscription_count()? == 0 {
            return Ok(false);
        }
        Ok(self.response_reader.matched_publication_count()? > 0)
    }
}

impl<T: ServiceTypeSupport> Drop for Client<T> {
    fn drop(&mut self) {
        if let Some(guard) = &self.graph_guard {
            guard.set_trigger_value(true);
        }
        log::debug!("[rpc] client for '{}' destroyed", self.service_name);
    }
}

impl<T: ServiceTypeSupport> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("service_name", &self.service_name)
            .field("writer_guid", &self.writer_guid)
            .field("sequence_number", &*self.sequence_number.lock())
            .finish_non_exhaustive()
    }
}
