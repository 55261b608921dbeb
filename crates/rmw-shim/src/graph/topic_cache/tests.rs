// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use std::collections::HashMap;

fn guid(n: u8) -> Guid {
    Guid::from_bytes([n; 16])
}

fn add(cache: &mut TopicCache, participant: u8, entity: u8, topic: &str, ty: &str) -> bool {
    cache.add_topic(guid(participant), guid(entity), topic, ty, QosProfile::default())
}

#[test]
fn add_then_remove_leaves_remaining_entity() {
    let mut cache = TopicCache::new();
    assert!(add(&mut cache, 1, 10, "rt/chatter", "String_"));
    assert!(add(&mut cache, 1, 11, "rt/chatter", "String_"));
    assert_eq!(cache.count_topic("rt/chatter"), 2);

    assert!(cache.remove_topic(&guid(10)));
    assert_eq!(cache.count_topic("rt/chatter"), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.get(&guid(11)).is_some());
}

#[test]
fn remove_unknown_and_double_remove_are_noops() {
    let mut cache = TopicCache::new();
    assert!(!cache.remove_topic(&guid(9)));

    add(&mut cache, 1, 10, "rt/a", "A");
    assert!(cache.remove_topic(&guid(10)));
    assert!(!cache.remove_topic(&guid(10)));
    assert!(cache.is_empty());
}

#[test]
fn overwrite_moves_entity_between_participants() {
    let mut cache = TopicCache::new();
    let naming = NamingConfig::default();
    add(&mut cache, 1, 10, "rt/a", "A");
    assert!(!add(&mut cache, 2, 10, "rt/b", "B"));

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.count_topic("rt/a"), 0);
    assert!(cache
        .topic_names_and_types_by_participant(&guid(1), false, &naming)
        .is_empty());
    let by_two = cache.topic_names_and_types_by_participant(&guid(2), false, &naming);
    assert_eq!(by_two.keys().collect::<Vec<_>>(), vec!["rt/b"]);
}

#[test]
fn count_is_exact_match() {
    let mut cache = TopicCache::new();
    add(&mut cache, 1, 10, "rt/chatter", "A");
    add(&mut cache, 1, 11, "rt/chatter2", "A");
    assert_eq!(cache.count_topic("rt/chatter"), 1);
    assert_eq!(cache.count_topic("rt/chat"), 0);
}

#[test]
fn names_and_types_union_types_and_filter_hidden() {
    let mut cache = TopicCache::new();
    let naming = NamingConfig::default();
    add(&mut cache, 1, 10, "rt/chatter", "A");
    add(&mut cache, 2, 11, "rt/chatter", "B");
    add(&mut cache, 1, 12, "rq/addRequest", "pkg::srv::dds_::Add_Request_");

    let raw = cache.topic_names_and_types(false, &naming);
    assert_eq!(raw.len(), 2);
    assert_eq!(
        raw["rt/chatter"].iter().collect::<Vec<_>>(),
        vec!["A", "B"]
    );

    let visible = cache.topic_names_and_types(true, &naming);
    assert_eq!(visible.keys().collect::<Vec<_>>(), vec!["rt/chatter"]);

    let by_one = cache.topic_names_and_types_by_participant(&guid(1), true, &naming);
    assert_eq!(by_one["rt/chatter"].len(), 1);
    assert!(by_one["rt/chatter"].contains("A"));
}

#[test]
fn service_names_collapse_request_and_response() {
    let mut cache = TopicCache::new();
    let naming = NamingConfig::default();
    add(&mut cache, 1, 10, "rq/addRequest", "pkg::srv::dds_::Add_Request_");
    add(&mut cache, 1, 11, "rr/addReply", "pkg::srv::dds_::Add_Response_");
    add(&mut cache, 2, 12, "rt/chatter", "A");

    let services = cache.service_names_and_types(&naming);
    assert_eq!(services.len(), 1);
    assert_eq!(
        services["/add"].iter().collect::<Vec<_>>(),
        vec!["pkg::srv::dds_::Add"]
    );

    let requests =
        cache.service_names_and_types_by_participant(&guid(1), ServiceRole::Request, &naming);
    assert!(requests.contains_key("/add"));
    assert!(cache
        .service_names_and_types_by_participant(&guid(2), ServiceRole::Request, &naming)
        .is_empty());
}

// Random add/remove replay checked against a plain model of the table.
#[test]
fn randomized_replay_matches_model() {
    let mut rng = fastrand::Rng::with_seed(0x5eed_cafe);
    let topics = ["rt/a", "rt/b", "rq/xRequest"];

    for _ in 0..20 {
        let mut cache = TopicCache::new();
        let mut model: HashMap<u8, (u8, &str)> = HashMap::new();

        for _ in 0..200 {
            let entity = rng.u8(0..24);
            if rng.bool() {
                let participant = rng.u8(100..104);
                let topic = topics[rng.usize(..topics.len())];
                add(&mut cache, participant, entity, topic, "T");
                model.insert(entity, (participant, topic));
            } else {
                let removed = cache.remove_topic(&guid(entity));
                assert_eq!(removed, model.remove(&entity).is_some());
            }
        }

        assert_eq!(cache.len(), model.len());
        for topic in topics {
            let expected = model.values().filter(|(_, t)| *t == topic).count();
            assert_eq!(cache.count_topic(topic), expected);
        }
        let naming = NamingConfig::default();
        for participant in 100..104u8 {
            let expected: BTreeSet<&str> = model
                .values()
                .filter(|(p, _)| *p == participant)
                .map(|(_, t)| *t)
                .collect();
            let got =
                cache.topic_names_and_types_by_participant(&guid(participant), false, &naming);
            assert_eq!(
                got.keys().map(String::as_str).collect::<BTreeSet<_>>(),
                expected
            );
        }
    }
}
