// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-service serialization hooks.
//!
//! A type support turns a request or response plus its correlation pair
//! (sequence number, writer GUID) into a flat buffer and back. The shim
//! sizes the buffer with `*_serialized_size`, serializes into it and hands
//! the bytes to the raw writer untouched.

use crate::error::{Error, Result};
use crate::guid::{Guid, GUID_SIZE};

/// Serialization hooks for one service type.
pub trait ServiceTypeSupport: Send + Sync {
    type Request;
    type Response;

    /// DDS type name of the request topic.
    fn request_type_name(&self) -> &str;

    /// DDS type name of the response topic.
    fn response_type_name(&self) -> &str;

    /// Bytes needed to serialize `request`.
    fn request_serialized_size(&self, request: &Self::Request) -> usize;

    fn serialize_request(
        &self,
        request: &Self::Request,
        buffer: &mut [u8],
        sequence_number: i64,
        writer_guid: &Guid,
    ) -> Result<()>;

    fn deserialize_request(&self, buffer: &[u8]) -> Result<(Self::Request, i64, Guid)>;

    /// Bytes needed to serialize `response`.
    fn response_serialized_size(&self, response: &Self::Response) -> usize;

    fn serialize_response(
        &self,
        response: &Self::Response,
        buffer: &mut [u8],
        sequence_number: i64,
        writer_guid: &Guid,
    ) -> Result<()>;

    fn deserialize_response(&self, buffer: &[u8]) -> Result<(Self::Response, i64, Guid)>;
}

/// Size of the correlation header written by [`FramedTypeSupport`].
pub const FRAME_HEADER_SIZE: usize = GUID_SIZE + 8;

/// Opaque byte payloads behind a fixed correlation header.
///
/// # Wire Format
/// ```text
/// +----------------------+------------------+-------------+
/// | writer_guid (16)     | sequence (i64 LE) | payload ... |
/// +----------------------+------------------+-------------+
/// ```
///
/// Same layout as the DDS-RPC sample identity prepended to a request.
#[derive(Debug, Clone)]
pub struct FramedTypeSupport {
    request_type_name: String,
    response_type_name: String,
}

impl FramedTypeSupport {
    /// Type support for `<package>::srv::dds_::<Service>_Request_/_Response_`.
    pub fn new(package: &str, service: &str) -> Self {
        Self {
            request_type_name: format!("{package}::srv::dds_::{service}_Request_"),
            response_type_name: format!("{package}::srv::dds_::{service}_Response_"),
        }
    }

    fn encode(payload: &[u8], buffer: &mut [u8], sequence_number: i64, guid: &Guid) -> Result<()> {
        let needed = FRAME_HEADER_SIZE + payload.len();
        if buffer.len() < needed {
            return Err(Error::Serialization(format!(
                "buffer too small: {} < {}",
                buffer.len(),
                needed
            )));
        }
        buffer[..GUID_SIZE].copy_from_slice(guid.as_ref());
        buffer[GUID_SIZE..FRAME_HEADER_SIZE].copy_from_slice(&sequence_number.to_le_bytes());
        buffer[FRAME_HEADER_SIZE..needed].copy_from_slice(payload);
        Ok(())
    }

    fn decode(buffer: &[u8]) -> Result<(Vec<u8>, i64, Guid)> {
        if buffer.len() < FRAME_HEADER_SIZE {
            return Err(Error::Deserialization(format!(
                "frame too short: {} bytes (need at least {})",
                buffer.len(),
                FRAME_HEADER_SIZE
            )));
        }
        let guid = Guid::from_slice(&buffer[..GUID_SIZE])
            .ok_or_else(|| Error::Deserialization("truncated writer guid".into()))?;
        let mut seq = [0u8; 8];
        seq.copy_from_slice(&buffer[GUID_SIZE..FRAME_HEADER_SIZE]);
        Ok((
            buffer[FRAME_HEADER_SIZE..].to_vec(),
            i64::from_le_bytes(seq),
            guid,
        ))
    }
}

impl ServiceTypeSupport for FramedTypeSupport {
    type Request = Vec<u8>;
    type Response = Vec<u8>;

    fn request_type_name(&self) -> &str {
        &self.request_type_name
    }

    fn response_type_name(&self) -> &str {
        &self.response_type_name
    }

    fn request_serialized_size(&self, request: &Vec<u8>) -> usize {
        FRAME_HEADER_SIZE + request.len()
    }

    fn serialize_request(
        &self,
        request: &Vec<u8>,
        buffer: &mut [u8],
        sequence_number: i64,
        writer_guid: &Guid,
    ) -> Result<()> {
        Self::encode(request, buffer, sequence_number, writer_guid)
    }

    fn deserialize_request(&self, buffer: &[u8]) -> Result<(Vec<u8>, i64, Guid)> {
        Self::decode(buffer)
    }

    fn response_serialized_size(&self, response: &Vec<u8>) -> usize {
        FRAME_HEADER_SIZE + response.len()
    }

    fn serialize_response(
        &self,
        response: &Vec<u8>,
        buffer: &mut [u8],
        sequence_number: i64,
        writer_guid: &Guid,
    ) -> Result<()> {
        Self::encode(response, buffer, sequence_number, writer_guid)
    }

    fn deserialize_response(&self, buffer: &[u8]) -> Result<(Vec<u8>, i64, Guid)> {
        Self::decode(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn frame_layout() {
        let ts = FramedTypeSupport::new("example_interfaces", "AddTwoInts");
        let guid = Guid::from_bytes([0xab; 16]);
        let request = vec![1, 2, 3];

        let mut buffer = vec![0u8; ts.request_serialized_size(&request)];
        ts.serialize_request(&request, &mut buffer, 7, &guid)
            .expect("serialize");

        assert_eq!(buffer.len(), 27);
        assert_eq!(&buffer[..16], &[0xab; 16]);
        assert_eq!(&buffer[16..24], &7i64.to_le_bytes());
        assert_eq!(&buffer[24..], &[1, 2, 3]);

        let (payload, seq, writer) = ts.deserialize_request(&buffer).expect("deserialize");
        assert_eq!(payload, request);
        assert_eq!(seq, 7);
        assert_eq!(writer, guid);
    }

    #[test]
    fn type_names() {
        let ts = FramedTypeSupport::new("example_interfaces", "AddTwoInts");
        assert_eq!(
            ts.request_type_name(),
            "example_interfaces::srv::dds_::AddTwoInts_Request_"
        );
        assert_eq!(
            ts.response_type_name(),
            "example_interfaces::srv::dds_::AddTwoInts_Response_"
        );
    }

    #[test]
    fn short_frame_is_decode_error() {
        let ts = FramedTypeSupport::new("pkg", "Svc");
        let err = ts.deserialize_response(&[0u8; 10]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn undersized_buffer_is_encode_error() {
        let ts = FramedTypeSupport::new("pkg", "Svc");
        let mut buffer = [0u8; 8];
        let err = ts
            .serialize_response(&vec![1], &mut buffer, 1, &Guid::zero())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
    }
}
