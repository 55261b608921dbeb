// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Correlation types shared by clients and services.

use crate::guid::Guid;
use crate::transport::SampleInfo;
use std::fmt;

/// Correlation token: who sent a request and which one it was.
///
/// Services echo it back unchanged so the client can recognise its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RequestId {
    pub writer_guid: Guid,
    pub sequence_number: i64,
}

impl RequestId {
    pub fn new(writer_guid: Guid, sequence_number: i64) -> Self {
        Self {
            writer_guid,
            sequence_number,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.writer_guid, self.sequence_number)
    }
}

/// Metadata returned with a taken request or response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceInfo {
    /// Source timestamp (ns) from the transport sample info.
    pub source_timestamp: i64,
    /// Always 0: the transport metadata carries no reception time.
    pub received_timestamp: i64,
    pub request_id: RequestId,
}

/// Raw request captured on the transport callback thread.
///
/// Owned by the service queue until an application take moves it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEnvelope {
    pub payload: Vec<u8>,
    pub info: SampleInfo,
}

impl RequestEnvelope {
    pub fn new(payload: Vec<u8>, info: SampleInfo) -> Self {
        Self { payload, info }
    }

    /// Serialized length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// A request handed to the application.
#[derive(Debug, Clone, PartialEq)]
pub struct TakenRequest<T> {
    pub info: ServiceInfo,
    pub request: T,
}

impl<T> TakenRequest<T> {
    /// Token to pass back to `send_response`.
    pub fn request_id(&self) -> RequestId {
        self.info.request_id
    }
}

/// A response matched to this client.
#[derive(Debug, Clone, PartialEq)]
pub struct TakenResponse<T> {
    pub info: ServiceInfo,
    pub response: T,
}

impl<T> TakenResponse<T> {
    pub fn sequence_number(&self) -> i64 {
        self.info.request_id.sequence_number
    }
}
