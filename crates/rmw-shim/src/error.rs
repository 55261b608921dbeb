// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by the graph and RPC layers.
//!
//! "Nothing available" is never an error: takes return `Ok(None)`, counts
//! return `0` and the availability probe returns `Ok(false)`.

use thiserror::Error;

/// Result type for shim operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors emitted by the shim.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or empty required argument; nothing was changed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Handle was created by another middleware implementation.
    #[error("incorrect rmw implementation: expected '{expected}', got '{found}'")]
    IncorrectImplementation {
        expected: &'static str,
        found: String,
    },

    /// Transport could not hand out sample, info or handle storage.
    #[error("transport out of resources: {0}")]
    OutOfResources(String),

    /// Non-OK return from a transport take/write/match query.
    #[error("transport operation failed: {0}")]
    Transport(String),

    /// Outgoing payload could not be serialized.
    #[error("failed to serialize message: {0}")]
    Serialization(String),

    /// Incoming payload could not be deserialized.
    #[error("failed to deserialize message: {0}")]
    Deserialization(String),

    /// Context was shut down.
    #[error("context has been shut down")]
    Shutdown,
}

/// Coarse classification of [`Error`], used to map onto return codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    IdentityMismatch,
    ResourceExhausted,
    TransportFailure,
    Decode,
    Encode,
    Shutdown,
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::IncorrectImplementation { .. } => ErrorKind::IdentityMismatch,
            Self::OutOfResources(_) => ErrorKind::ResourceExhausted,
            Self::Transport(_) => ErrorKind::TransportFailure,
            Self::Serialization(_) => ErrorKind::Encode,
            Self::Deserialization(_) => ErrorKind::Decode,
            Self::Shutdown => ErrorKind::Shutdown,
        }
    }
}

/// Reject handles stamped with a different implementation identifier.
pub(crate) fn check_identifier(found: &str) -> Result<()> {
    if found == crate::IMPLEMENTATION_IDENTIFIER {
        Ok(())
    } else {
        Err(Error::IncorrectImplementation {
            expected: crate::IMPLEMENTATION_IDENTIFIER,
            found: found.to_string(),
        })
    }
}
