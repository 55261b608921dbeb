// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Boundary to the underlying pub/sub transport.
//!
//! The shim never creates DDS entities itself. It consumes three kinds of
//! endpoint through the traits below:
//!
//! - [`DiscoveryReader`]: built-in publication/subscription feeds
//! - [`RawWriter`]: pre-serialized writes plus matched-subscription count
//! - [`RawReader`]: pre-serialized takes plus matched-publication count
//!
//! Takes hand out a [`Loan`]; dropping it returns the borrowed buffers to
//! the transport on every exit path.

pub mod memory;

use crate::error::Result;
use crate::guid::Guid;
use crate::qos::BuiltinTopicQos;
use std::sync::Arc;

/// Instance lifecycle state attached to a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstanceState {
    #[default]
    Alive,
    NotAliveDisposed,
    NotAliveNoWriters,
}

/// Metadata delivered with every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleInfo {
    /// `false` for pure lifecycle notifications (dispose/unregister).
    pub valid_data: bool,
    pub instance_state: InstanceState,
    /// Instance identity; `None` for malformed or transient samples.
    pub instance_handle: Option<Guid>,
    /// Source timestamp in nanoseconds since the epoch.
    pub source_timestamp: i64,
}

impl SampleInfo {
    /// Metadata for a live data sample.
    pub fn alive(instance_handle: Option<Guid>, source_timestamp: i64) -> Self {
        Self {
            valid_data: true,
            instance_state: InstanceState::Alive,
            instance_handle,
            source_timestamp,
        }
    }

    /// Metadata for an instance that was disposed by its writer.
    pub fn disposed(instance_handle: Option<Guid>) -> Self {
        Self {
            valid_data: false,
            instance_state: InstanceState::NotAliveDisposed,
            instance_handle,
            source_timestamp: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.valid_data && self.instance_state == InstanceState::Alive
    }
}

/// Publication or subscription built-in topic data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuiltinTopicData {
    pub participant_key: Guid,
    pub topic_name: String,
    pub type_name: String,
    pub qos: BuiltinTopicQos,
}

/// Receiver of returned loans.
pub trait LoanOwner: Send + Sync {
    /// Give back the buffers handed out under `token`.
    fn return_loan(&self, token: u64);
}

/// Samples and metadata borrowed from a reader.
///
/// The loan goes back to its owner when dropped, including on early
/// returns and `?` propagation.
pub struct Loan<'a, T> {
    owner: &'a dyn LoanOwner,
    token: u64,
    samples: Vec<T>,
    infos: Vec<SampleInfo>,
}

impl<'a, T> Loan<'a, T> {
    /// Wrap a batch. `samples` and `infos` must have the same length.
    pub fn new(
        owner: &'a dyn LoanOwner,
        token: u64,
        samples: Vec<T>,
        infos: Vec<SampleInfo>,
    ) -> Self {
        debug_assert_eq!(samples.len(), infos.len());
        Self {
            owner,
            token,
            samples,
            infos,
        }
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &SampleInfo)> {
        self.samples.iter().zip(self.infos.iter())
    }

    /// Move the samples out of the loan (the loan itself is still returned on drop).
    pub fn drain(&mut self) -> impl Iterator<Item = (T, SampleInfo)> + '_ {
        self.samples.drain(..).zip(self.infos.drain(..))
    }
}

impl<T> Drop for Loan<'_, T> {
    fn drop(&mut self) {
        self.owner.return_loan(self.token);
    }
}

/// Callback fired by the transport when new samples are available.
///
/// Runs on a transport-owned thread, concurrently with application calls.
pub type DataAvailableCallback = Arc<dyn Fn() + Send + Sync>;

/// Built-in discovery feed (publications or subscriptions).
pub trait DiscoveryReader: LoanOwner {
    /// Take up to `max_samples` samples. `Ok(None)` means no data.
    fn take(&self, max_samples: usize) -> Result<Option<Loan<'_, BuiltinTopicData>>>;

    /// Install or clear the data-available callback.
    fn set_on_data_available(&self, callback: Option<DataAvailableCallback>);
}

/// Writer of pre-serialized samples.
pub trait RawWriter: Send + Sync {
    fn raw_write(&self, data: &[u8]) -> Result<()>;

    /// Number of subscriptions currently matched with this writer.
    fn matched_subscription_count(&self) -> Result<usize>;
}

/// Reader of pre-serialized samples.
pub trait RawReader: LoanOwner {
    /// Take up to `max_samples` raw samples. `Ok(None)` means no data.
    fn raw_take(&self, max_samples: usize) -> Result<Option<Loan<'_, Vec<u8>>>>;

    /// Number of publications currently matched with this reader.
    fn matched_publication_count(&self) -> Result<usize>;

    /// Install or clear the data-available callback.
    fn set_on_data_available(&self, callback: Option<DataAvailableCallback>);
}
