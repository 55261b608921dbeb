// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Context and node handles.
//!
//! A [`Context`] is the init/shutdown scope. A [`Node`] binds a participant's
//! two built-in discovery feeds to a pair of [`DiscoveryListener`]s and owns
//! the graph guard condition they signal. Graph queries run against the
//! listeners' caches; clients and services created through the node signal
//! the same guard when they come and go.

use crate::condition::GuardCondition;
use crate::config::{EnvConfig, NamingConfig};
use crate::error::{check_identifier, Error, Result};
use crate::graph::{merge_names_and_types, DiscoveryListener, EntityType, NamesAndTypes};
use crate::guid::Guid;
use crate::names::{self, ServiceRole};
use crate::rpc::{Client, Service};
use crate::transport::{DiscoveryReader, RawReader, RawWriter};
use crate::typesupport::ServiceTypeSupport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Options passed to [`Context::init`].
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub instance_id: u64,
    /// Middleware that produced these options.
    pub implementation_identifier: String,
    pub config: EnvConfig,
    pub naming: NamingConfig,
}

impl InitOptions {
    /// Options stamped with this implementation, configured from the environment.
    pub fn new() -> Self {
        Self {
            instance_id: 0,
            implementation_identifier: crate::IMPLEMENTATION_IDENTIFIER.to_string(),
            config: EnvConfig::from_env(),
            naming: NamingConfig::default(),
        }
    }
}

impl Default for InitOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Init/shutdown scope shared by the nodes created from it.
#[derive(Debug)]
pub struct Context {
    instance_id: u64,
    config: EnvConfig,
    naming: NamingConfig,
    shutdown: AtomicBool,
}

impl Context {
    /// Validate `options` and open a context.
    ///
    /// The configured log level is exported as `RUST_LOG` unless the
    /// environment already carries one.
    pub fn init(options: &InitOptions) -> Result<Self> {
        check_identifier(&options.implementation_identifier)?;

        // RUST_LOG wins when the host already set it
        options.config.apply_log_level();
        if options.config.is_custom() {
            log::debug!(
                "[rmw] environment config: domain_id={}, log_level={}, discovery_batch={}",
                options.config.domain_id,
                options.config.log_level,
                options.config.discovery_batch
            );
        }

        if options.config.init_log {
            log::info!(
                "[rmw] {} initialized (instance {}, domain {})",
                crate::IMPLEMENTATION_IDENTIFIER,
                options.instance_id,
                options.config.domain_id
            );
        }

        Ok(Self {
            instance_id: options.instance_id,
            config: options.config.clone(),
            naming: options.naming.clone(),
            shutdown: AtomicBool::new(false),
        })
    }

    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    pub fn implementation_identifier(&self) -> &'static str {
        crate::IMPLEMENTATION_IDENTIFIER
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    /// Mark the context shut down; later node creation fails.
    pub fn shutdown(&self) -> Result<()> {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            log::debug!("[rmw] context {} already shut down", self.instance_id);
        }
        Ok(())
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

/// Wire `listener` to `reader`'s data-available callback.
fn attach(listener: &Arc<DiscoveryListener>, reader: &Arc<dyn DiscoveryReader>) {
    let handler = Arc::clone(listener);
    let source = Arc::downgrade(reader);
    reader.set_on_data_available(Some(Arc::new(move || {
        if let Some(reader) = source.upgrade() {
            handler.on_data_available(&*reader);
        }
    })));
    // Catch up on anything announced before the callback was installed.
    listener.on_data_available(&**reader);
}

fn intersect(left: NamesAndTypes, mut right: NamesAndTypes) -> NamesAndTypes {
    left.into_iter()
        .filter_map(|(name, mut types)| {
            let other = right.remove(&name)?;
            types.extend(other);
            Some((name, types))
        })
        .collect()
}

/// A ROS node: discovery graph view plus factory for clients and services.
pub struct Node {
    name: String,
    namespace: String,
    participant_guid: Guid,
    graph_guard: Arc<GuardCondition>,
    publications: Arc<DiscoveryListener>,
    subscriptions: Arc<DiscoveryListener>,
    publication_reader: Arc<dyn DiscoveryReader>,
    subscription_reader: Arc<dyn DiscoveryReader>,
    naming: NamingConfig,
}

impl Node {
    /// Create a node over a participant's built-in discovery feeds.
    pub fn new(
        context: &Context,
        name: &str,
        namespace: &str,
        participant_guid: Guid,
        publication_reader: Arc<dyn DiscoveryReader>,
        subscription_reader: Arc<dyn DiscoveryReader>,
    ) -> Result<Self> {
        if context.is_shutdown() {
            return Err(Error::Shutdown);
        }
        if name.is_empty() {
            return Err(Error::invalid_argument("node name is empty"));
        }
        let namespace = if namespace.is_empty() { "/" } else { namespace };
        if !namespace.starts_with('/') {
            return Err(Error::invalid_argument(format!(
                "node namespace '{namespace}' must be absolute"
            )));
        }

        let graph_guard = Arc::new(GuardCondition::new());
        let batch = context.config().discovery_batch;
        let publications = Arc::new(DiscoveryListener::with_batch_size(
            EntityType::Publisher,
            Arc::clone(&graph_guard),
            batch,
        ));
        let subscriptions = Arc::new(DiscoveryListener::with_batch_size(
            EntityType::Subscriber,
            Arc::clone(&graph_guard),
            batch,
        ));
        attach(&publications, &publication_reader);
        attach(&subscriptions, &subscription_reader);

        log::debug!(
            "[rmw] node '{}' in '{}' created on participant {}",
            name,
            namespace,
            participant_guid
        );

        Ok(Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            participant_guid,
            graph_guard,
            publications,
            subscriptions,
            publication_reader,
            subscription_reader,
            naming: context.naming().clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `/ns/name`, or `/name` in the root namespace.
    pub fn fully_qualified_name(&self) -> String {
        if self.namespace.ends_with('/') {
            format!("{}{}", self.namespace, self.name)
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }

    pub fn participant_guid(&self) -> Guid {
        self.participant_guid
    }

    pub fn graph_guard_condition(&self) -> &Arc<GuardCondition> {
        &self.graph_guard
    }

    pub fn publications(&self) -> &DiscoveryListener {
        &self.publications
    }

    pub fn subscriptions(&self) -> &DiscoveryListener {
        &self.subscriptions
    }

    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    pub fn count_publishers(&self, topic_name: &str) -> usize {
        self.publications.count_topic(topic_name)
    }

    pub fn count_subscribers(&self, topic_name: &str) -> usize {
        self.subscriptions.count_topic(topic_name)
    }

    /// With `demangle`, hidden names are dropped and `rt/x` is reported as `/x`.
    fn render(&self, topics: NamesAndTypes, demangle: bool) -> NamesAndTypes {
        if !demangle {
            return topics;
        }
        let mut out = NamesAndTypes::new();
        for (name, types) in topics {
            let name = names::demangle_topic_name(&name, &self.naming).unwrap_or(name);
            out.entry(name).or_default().extend(types);
        }
        out
    }

    /// Every discovered topic with the types it is used with.
    pub fn get_topic_names_and_types(&self, demangle: bool) -> NamesAndTypes {
        let mut topics = self.publications.topic_names_and_types(demangle, &self.naming);
        merge_names_and_types(
            &mut topics,
            self.subscriptions.topic_names_and_types(demangle, &self.naming),
        );
        self.render(topics, demangle)
    }

    /// Topics published or subscribed by one participant.
    pub fn get_topic_names_and_types_by_participant(
        &self,
        participant_guid: &Guid,
        demangle: bool,
    ) -> NamesAndTypes {
        let mut topics = self.publications.topic_names_and_types_by_participant(
            participant_guid,
            demangle,
            &self.naming,
        );
        merge_names_and_types(
            &mut topics,
            self.subscriptions.topic_names_and_types_by_participant(
                participant_guid,
                demangle,
                &self.naming,
            ),
        );
        self.render(topics, demangle)
    }

    pub fn get_publisher_names_and_types_by_participant(
        &self,
        participant_guid: &Guid,
        demangle: bool,
    ) -> NamesAndTypes {
        let topics = self.publications.topic_names_and_types_by_participant(
            participant_guid,
            demangle,
            &self.naming,
        );
        self.render(topics, demangle)
    }

    pub fn get_subscriber_names_and_types_by_participant(
        &self,
        participant_guid: &Guid,
        demangle: bool,
    ) -> NamesAndTypes {
        let topics = self.subscriptions.topic_names_and_types_by_participant(
            participant_guid,
            demangle,
            &self.naming,
        );
        self.render(topics, demangle)
    }

    /// Every service seen on the graph, from either side.
    pub fn get_service_names_and_types(&self) -> NamesAndTypes {
        let mut services = self.publications.service_names_and_types(&self.naming);
        merge_names_and_types(
            &mut services,
            self.subscriptions.service_names_and_types(&self.naming),
        );
        services
    }

    /// Services served by one participant: it subscribes to the request
    /// topic and publishes the response topic.
    pub fn get_service_names_and_types_by_participant(
        &self,
        participant_guid: &Guid,
    ) -> NamesAndTypes {
        intersect(
            self.subscriptions.service_names_and_types_by_participant(
                participant_guid,
                ServiceRole::Request,
                &self.naming,
            ),
            self.publications.service_names_and_types_by_participant(
                participant_guid,
                ServiceRole::Response,
                &self.naming,
            ),
        )
    }

    /// Services called by one participant: it publishes the request topic
    /// and subscribes to the response topic.
    pub fn get_client_names_and_types_by_participant(
        &self,
        participant_guid: &Guid,
    ) -> NamesAndTypes {
        intersect(
            self.publications.service_names_and_types_by_participant(
                participant_guid,
                ServiceRole::Request,
                &self.naming,
            ),
            self.subscriptions.service_names_and_types_by_participant(
                participant_guid,
                ServiceRole::Response,
                &self.naming,
            ),
        )
    }

    /// Create a client over endpoints the caller created on
    /// [`request_topic_name`](names::request_topic_name) /
    /// [`response_topic_name`](names::response_topic_name).
    pub fn create_client<T: ServiceTypeSupport>(
        &self,
        service_name: &str,
        type_support: T,
        request_writer: Arc<dyn RawWriter>,
        response_reader: Arc<dyn RawReader>,
    ) -> Result<Client<T>> {
        let client = Client::new(
            service_name,
            self.participant_guid,
            type_support,
            request_writer,
            response_reader,
        )?;
        log::debug!(
            "[rmw] node '{}' created client for '{}'",
            self.fully_qualified_name(),
            service_name
        );
        Ok(client.with_graph_guard(Arc::clone(&self.graph_guard)))
    }

    pub fn create_service<T: ServiceTypeSupport>(
        &self,
        service_name: &str,
        type_support: T,
        request_reader: Arc<dyn RawReader>,
        response_writer: Arc<dyn RawWriter>,
    ) -> Result<Service<T>> {
        let service = Service::new(
            service_name,
            self.participant_guid,
            type_support,
            request_reader,
            response_writer,
        )?;
        log::debug!(
            "[rmw] node '{}' created service '{}'",
            self.fully_qualified_name(),
            service_name
        );
        Ok(service.with_graph_guard(Arc::clone(&self.graph_guard)))
    }

    /// Whether a server for `client` is currently matched on both topics.
    pub fn service_server_is_available<T: ServiceTypeSupport>(
        &self,
        client: &Client<T>,
    ) -> Result<bool> {
        if client.participant_guid() != self.participant_guid {
            return Err(Error::invalid_argument(format!(
                "client for '{}' belongs to another participant",
                client.service_name()
            )));
        }
        client.is_service_available()
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.publication_reader.set_on_data_available(None);
        self.subscription_reader.set_on_data_available(None);
        log::debug!("[rmw] node '{}' destroyed", self.fully_qualified_name());
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("participant_guid", &self.participant_guid)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
