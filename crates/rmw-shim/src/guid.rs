// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! 16-byte entity identity used for discovery keys and RPC correlation.

use rand::Rng;
use std::fmt;

/// Size of a GUID in bytes.
pub const GUID_SIZE: usize = 16;

/// Opaque 16-byte identity naming a participant, reader or writer.
///
/// No internal structure is interpreted: two GUIDs are equal iff their bytes
/// are equal, and ordering is lexicographic over the bytes.
///
/// # Display Format
/// Hex with dots: "01.0f.ac.10.00.00.00.00.00.00.00.01.00.00.01.c1"
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Guid([u8; GUID_SIZE]);

impl Guid {
    /// Create a GUID from raw bytes.
    ///
    /// # Examples
    /// ```
    /// use rmw_shim::Guid;
    ///
    /// let bytes = [1, 15, 172, 16, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1, 193];
    /// let guid = Guid::from_bytes(bytes);
    /// assert_eq!(guid.as_bytes(), bytes);
    /// ```
    pub const fn from_bytes(bytes: [u8; GUID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Copy a GUID out of an instance handle or key buffer.
    ///
    /// Returns `None` when fewer than 16 bytes are available.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; GUID_SIZE] = bytes.get(..GUID_SIZE)?.try_into().ok()?;
        Some(Self(raw))
    }

    /// Build a GUID from two 64-bit halves (high half first, little-endian bytes).
    pub fn from_halves(high: u64, low: u64) -> Self {
        let mut bytes = [0u8; GUID_SIZE];
        bytes[..8].copy_from_slice(&high.to_le_bytes());
        bytes[8..].copy_from_slice(&low.to_le_bytes());
        Self(bytes)
    }

    /// Draw a fresh writer identity from two independent uniform `u64` values.
    ///
    /// Collisions are unlikely but possible: this is not a cryptographic id.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let high: u64 = rng.gen();
        let low: u64 = rng.gen();
        Self::from_halves(high, low)
    }

    /// GUID bytes.
    pub const fn as_bytes(&self) -> [u8; GUID_SIZE] {
        self.0
    }

    /// All-zero GUID (placeholder).
    pub const fn zero() -> Self {
        Self([0; GUID_SIZE])
    }

    /// Check if GUID is zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl From<[u8; GUID_SIZE]> for Guid {
    fn from(bytes: [u8; GUID_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Guid {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self)
    }
}
