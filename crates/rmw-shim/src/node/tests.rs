// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::error::ErrorKind;
use crate::qos::BuiltinTopicQos;
use crate::rpc::rpc_qos;
use crate::transport::memory::{MemoryDomain, MemoryParticipant};
use crate::typesupport::FramedTypeSupport;

fn context() -> Context {
    let options = InitOptions {
        config: EnvConfig::default(),
        ..InitOptions::new()
    };
    Context::init(&options).expect("context")
}

fn node_on(context: &Context, participant: &MemoryParticipant, name: &str) -> Node {
    Node::new(
        context,
        name,
        "/",
        participant.guid(),
        participant.publications(),
        participant.subscriptions(),
    )
    .expect("node")
}

#[test]
fn init_rejects_foreign_implementation() {
    let options = InitOptions {
        implementation_identifier: "rmw_other".to_string(),
        ..InitOptions::new()
    };
    let err = Context::init(&options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IdentityMismatch);
}

#[test]
fn shutdown_blocks_node_creation() {
    let domain = MemoryDomain::new();
    let participant = domain.create_participant();
    let context = context();
    context.shutdown().unwrap();
    context.shutdown().unwrap();
    assert!(context.is_shutdown());

    let err = Node::new(
        &context,
        "talker",
        "/",
        participant.guid(),
        participant.publications(),
        participant.subscriptions(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shutdown);
}

#[test]
fn node_name_validation() {
    let domain = MemoryDomain::new();
    let participant = domain.create_participant();
    let context = context();

    let err = Node::new(
        &context,
        "",
        "/",
        participant.guid(),
        participant.publications(),
        participant.subscriptions(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = Node::new(
        &context,
        "n",
        "relative",
        participant.guid(),
        participant.publications(),
        participant.subscriptions(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let node = Node::new(
        &context,
        "talker",
        "/robot",
        participant.guid(),
        participant.publications(),
        participant.subscriptions(),
    )
    .unwrap();
    assert_eq!(node.fully_qualified_name(), "/robot/talker");
    assert_eq!(node_on(&context, &participant, "x").fully_qualified_name(), "/x");
}

#[test]
fn discovery_updates_counts_and_triggers_guard() {
    let domain = MemoryDomain::new();
    let local = domain.create_participant();
    let remote = domain.create_participant();
    let context = context();
    let node = node_on(&context, &local, "listener");
    let guard = Arc::clone(node.graph_guard_condition());
    let before = guard.trigger_count();

    let type_name = "std_msgs::msg::dds_::String_";
    let writer = remote.create_writer("rt/chatter", type_name, BuiltinTopicQos::default());
    let _reader = remote.create_reader("rt/chatter", type_name, BuiltinTopicQos::default());

    assert_eq!(node.count_publishers("rt/chatter"), 1);
    assert_eq!(node.count_subscribers("rt/chatter"), 1);
    assert!(guard.trigger_count() >= before + 2);

    drop(writer);
    assert_eq!(node.count_publishers("rt/chatter"), 0);
    assert_eq!(node.count_subscribers("rt/chatter"), 1);
}

#[test]
fn endpoints_announced_before_node_are_visible() {
    let domain = MemoryDomain::new();
    let participant = domain.create_participant();
    let _writer = participant.create_writer("rt/early", "T", BuiltinTopicQos::default());

    let node = node_on(&context(), &participant, "late");
    assert_eq!(node.count_publishers("rt/early"), 1);
}

#[test]
fn topic_names_demangled_and_filtered() {
    let domain = MemoryDomain::new();
    let participant = domain.create_participant();
    let node = node_on(&context(), &participant, "n");
    let _a = participant.create_writer("rt/chatter", "A", BuiltinTopicQos::default());
    let _b = participant.create_reader("rt/chatter", "B", BuiltinTopicQos::default());
    let _c = participant.create_writer("rq/addRequest", "pkg::srv::dds_::Add_Request_", rpc_qos());
    let _d = participant.create_writer("plain_dds_topic", "X", BuiltinTopicQos::default());

    let raw = node.get_topic_names_and_types(false);
    assert_eq!(raw.len(), 3);
    assert!(raw.contains_key("rt/chatter"));

    let demangled = node.get_topic_names_and_types(true);
    assert_eq!(
        demangled.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["/chatter", "plain_dds_topic"]
    );
    assert_eq!(demangled["/chatter"].len(), 2);
}

#[test]
fn by_participant_queries_are_scoped() {
    let domain = MemoryDomain::new();
    let one = domain.create_participant();
    let two = domain.create_participant();
    let node = node_on(&context(), &one, "n");
    let _a = one.create_writer("rt/a", "A", BuiltinTopicQos::default());
    let _b = two.create_reader("rt/b", "B", BuiltinTopicQos::default());

    let mine = node.get_topic_names_and_types_by_participant(&one.guid(), true);
    assert_eq!(mine.keys().collect::<Vec<_>>(), vec!["/a"]);

    let theirs = node.get_subscriber_names_and_types_by_participant(&two.guid(), false);
    assert_eq!(theirs.keys().collect::<Vec<_>>(), vec!["rt/b"]);
    assert!(node
        .get_publisher_names_and_types_by_participant(&two.guid(), false)
        .is_empty());
}

#[test]
fn service_pairing_by_role() {
    let domain = MemoryDomain::new();
    let server = domain.create_participant();
    let caller = domain.create_participant();
    let node = node_on(&context(), &server, "n");
    let naming = NamingConfig::default();
    let request = names::request_topic_name("/add", false, &naming);
    let response = names::response_topic_name("/add", false, &naming);
    let ts = FramedTypeSupport::new("pkg", "Add");

    let _srv_req = server.create_reader(&request, ts.request_type_name(), rpc_qos());
    let _srv_rep = server.create_writer(&response, ts.response_type_name(), rpc_qos());
    let _cli_req = caller.create_writer(&request, ts.request_type_name(), rpc_qos());
    // caller has no response reader yet: not a complete client

    let all = node.get_service_names_and_types();
    assert_eq!(
        all["/add"].iter().collect::<Vec<_>>(),
        vec!["pkg::srv::dds_::Add"]
    );

    let served = node.get_service_names_and_types_by_participant(&server.guid());
    assert!(served.contains_key("/add"));
    assert!(node
        .get_client_names_and_types_by_participant(&server.guid())
        .is_empty());
    assert!(node
        .get_client_names_and_types_by_participant(&caller.guid())
        .is_empty());

    let _cli_rep = caller.create_reader(&response, ts.response_type_name(), rpc_qos());
    assert!(node
        .get_client_names_and_types_by_participant(&caller.guid())
        .contains_key("/add"));
}

#[test]
fn client_and_service_lifecycle_trigger_graph_guard() {
    let domain = MemoryDomain::new();
    let participant = domain.create_participant();
    let node = node_on(&context(), &participant, "n");
    let guard = Arc::clone(node.graph_guard_condition());

    let reader = participant.create_reader("rq/sRequest", "Req", rpc_qos());
    let writer = participant.create_writer("rr/sReply", "Rep", rpc_qos());
    let before = guard.trigger_count();
    let service = node
        .create_service(
            "/s",
            FramedTypeSupport::new("pkg", "S"),
            Arc::clone(&reader) as Arc<dyn crate::transport::RawReader>,
            Arc::clone(&writer) as Arc<dyn crate::transport::RawWriter>,
        )
        .unwrap();
    assert_eq!(guard.trigger_count(), before + 1);
    drop(service);
    assert_eq!(guard.trigger_count(), before + 2);

    let err = node
        .create_client(
            "",
            FramedTypeSupport::new("pkg", "S"),
            participant.create_writer("rq/sRequest", "Req", rpc_qos()),
            participant.create_reader("rr/sReply", "Rep", rpc_qos()),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn availability_through_node_checks_participant() {
    let domain = MemoryDomain::new();
    let one = domain.create_participant();
    let two = domain.create_participant();
    let context = context();
    let node_one = node_on(&context, &one, "a");
    let node_two = node_on(&context, &two, "b");

    let client = node_one
        .create_client(
            "/s",
            FramedTypeSupport::new("pkg", "S"),
            one.create_writer("rq/sRequest", "Req", rpc_qos()),
            one.create_reader("rr/sReply", "Rep", rpc_qos()),
        )
        .unwrap();

    assert!(!node_one.service_server_is_available(&client).unwrap());
    let err = node_two.service_server_is_available(&client).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}
