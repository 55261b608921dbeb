// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client/service tests over the loopback transport.

use super::*;
use crate::guid::Guid;
use crate::transport::memory::MemoryDomain;
use crate::typesupport::FramedTypeSupport;
use std::sync::Arc;
use std::thread;

#[test]
fn test_rpc_qos_profile() {
    let qos = rpc_qos();

    assert!(matches!(
        qos.reliability,
        crate::qos::BuiltinReliabilityKind::Reliable
    ));
    assert!(matches!(
        qos.durability,
        crate::qos::BuiltinDurabilityKind::Volatile
    ));
}

#[test]
fn test_request_id_hash() {
    use std::collections::HashSet;

    let id1 = RequestId::new(Guid::zero(), 1);
    let id2 = RequestId::new(Guid::zero(), 2);
    let id1_clone = RequestId::new(Guid::zero(), 1);

    let mut set = HashSet::new();
    set.insert(id1);
    set.insert(id2);

    assert_eq!(set.len(), 2);
    assert!(set.contains(&id1_clone));
}

#[test]
fn test_concurrent_sends_get_distinct_sequence_numbers() {
    let domain = MemoryDomain::new();
    let participant = domain.create_participant();
    let writer = participant.create_writer("rq/cRequest", "Req", rpc_qos());
    let reader = participant.create_reader("rr/cReply", "Rep", rpc_qos());
    let client = Arc::new(
        Client::new(
            "/c",
            participant.guid(),
            FramedTypeSupport::new("pkg", "C"),
            writer,
            reader,
        )
        .expect("client"),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = Arc::clone(&client);
            thread::spawn(move || {
                (0..25)
                    .map(|_| client.send_request(&vec![0]).expect("send"))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all: Vec<i64> = handles
        .into_iter()
        .flat_map(|h| h.join().expect("join"))
        .collect();
    all.sort_unstable();
    assert_eq!(all, (1..=100).collect::<Vec<_>>());
}
