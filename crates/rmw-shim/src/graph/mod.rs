// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discovery graph: who publishes and subscribes to what.
//!
//! Built-in discovery samples arrive asynchronously on transport threads.
//! A [`DiscoveryListener`] per feed folds them into a [`TopicCache`] under
//! its mutex and signals the node's graph guard condition once per batch.
//!
//! ```text
//! publications feed  --> DiscoveryListener(Publisher)  --> TopicCache --+
//!                                                                       +--> graph guard
//! subscriptions feed --> DiscoveryListener(Subscriber) --> TopicCache --+
//! ```

mod listener;
mod topic_cache;

pub use listener::{DiscoveryListener, ListenerContext};
pub use topic_cache::{TopicCache, TopicCacheEntry};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Topic name -> set of type names, sorted for stable output.
pub type NamesAndTypes = BTreeMap<String, BTreeSet<String>>;

/// Which discovery feed an entry came from.
///
/// Publications and subscriptions live in separate caches; the same GUID
/// never appears in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Publisher,
    Subscriber,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Publisher => write!(f, "publisher"),
            Self::Subscriber => write!(f, "subscriber"),
        }
    }
}

/// Merge `other` into `into`, unioning type sets of shared names.
pub(crate) fn merge_names_and_types(into: &mut NamesAndTypes, other: NamesAndTypes) {
    for (name, types) in other {
        into.entry(name).or_default().extend(types);
    }
}
