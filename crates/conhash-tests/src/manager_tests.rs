use conhash_core::{Node, NodeId, RingConfig, RingError};
use conhash_ring::{RingManager, moved_keys, stats};

use crate::helpers::{owners, ring_with, sample_keys};

#[test]
fn test_empty_ring_has_no_owner() {
    let ring = RingManager::default();
    assert!(ring.resolve("").is_none());
    assert!(ring.resolve("user:123").is_none());
    assert_eq!(ring.node_count(), 0);
}

#[test]
fn test_null_key_is_invalid_argument() {
    let ring = ring_with(&["A"]);
    let err = ring.try_resolve(None).unwrap_err();
    assert!(matches!(err, RingError::InvalidArgument(_)));

    let empty = RingManager::default();
    assert!(empty.try_resolve(None).is_err());
}

#[test]
fn test_try_resolve_with_key_matches_resolve() {
    let ring = ring_with(&["A", "B"]);
    let via_try = ring.try_resolve(Some("user:123")).unwrap();
    assert_eq!(via_try, ring.resolve("user:123"));
    assert!(RingManager::default().try_resolve(Some("")).unwrap().is_none());
}

#[test]
fn test_empty_string_key_resolves() {
    let ring = ring_with(&["A", "B", "C"]);
    assert!(ring.resolve("").is_some());
}

#[test]
fn test_zero_virtual_nodes_rejected() {
    let err = RingManager::with_virtual_nodes(0).unwrap_err();
    assert!(matches!(err, RingError::InvalidArgument(_)));
    assert!(RingManager::new(RingConfig::with_virtual_nodes(1)).is_ok());
}

#[test]
fn test_concrete_scenario() {
    let ring = ring_with(&["A", "B", "C"]);

    let info = ring.ring_info();
    assert_eq!(info.physical_node_count, 3);
    assert_eq!(info.virtual_node_count, 450);

    let owner = ring.resolve("user:123").expect("owner");
    assert!(["A", "B", "C"].contains(&owner.id().as_str()));
    for _ in 0..10 {
        assert_eq!(ring.resolve("user:123").unwrap().id(), owner.id());
    }

    assert!(ring.deregister_node("B"));
    assert_eq!(ring.ring_info().physical_node_count, 2);
    for key in sample_keys("after-removal", 2000) {
        let owner = ring.resolve(&key).unwrap();
        assert_ne!(owner.id().as_str(), "B", "{key} resolved to removed node");
    }
}

#[test]
fn test_deterministic() {
    let ring = ring_with(&["alpha", "beta", "gamma"]);
    for key in sample_keys("k", 500) {
        assert_eq!(ring.resolve(&key), ring.resolve(&key));
    }
}

#[test]
fn test_independent_rings_agree() {
    let a = ring_with(&["n1", "n2", "n3", "n4"]);
    let b = ring_with(&["n4", "n3", "n2", "n1"]);
    let keys = sample_keys("agree", 1000);
    assert_eq!(owners(&a, &keys), owners(&b, &keys));
}

#[test]
fn test_single_node_owns_all_keys() {
    let ring = ring_with(&["only"]);
    for key in sample_keys("key", 200) {
        assert_eq!(ring.resolve(&key).unwrap().id().as_str(), "only");
    }
}

#[test]
fn test_duplicate_registration_is_idempotent() {
    let ring = RingManager::default();
    assert!(ring.register_node(Node::new("A", "first.example.com", 1)));
    let keys = sample_keys("dup", 500);
    let before = owners(&ring, &keys);

    assert!(!ring.register_node(Node::new("A", "second.example.com", 2)));
    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.ring_info().virtual_node_count, 150);
    assert_eq!(owners(&ring, &keys), before);

    // The address of the first registration wins.
    assert_eq!(ring.node("A").unwrap().host(), "first.example.com");
}

#[test]
fn test_deregister_unknown_is_noop() {
    let ring = ring_with(&["A", "B"]);
    let keys = sample_keys("noop", 300);
    let before = owners(&ring, &keys);

    assert!(!ring.deregister_node("ghost"));
    assert_eq!(ring.node_count(), 2);
    assert_eq!(owners(&ring, &keys), before);
}

#[test]
fn test_deregister_last_node_empties_ring() {
    let ring = ring_with(&["A"]);
    ring.deregister_node("A");
    assert!(ring.resolve("anything").is_none());
    let info = ring.ring_info();
    assert_eq!(info.virtual_node_count, 0);
    assert!(info.data_distribution.is_empty());
}

#[test]
fn test_reregister_restores_mapping() {
    let ring = ring_with(&["A", "B", "C"]);
    let keys = sample_keys("restore", 1000);
    let before = owners(&ring, &keys);

    ring.deregister_node("C");
    ring.register_node(Node::with_id("C"));
    assert_eq!(owners(&ring, &keys), before);
}

#[test]
fn test_growth_moves_bounded_share_to_new_node() {
    let ring = ring_with(&["A", "B", "C"]);
    let keys = sample_keys("growth", 2000);
    let before = owners(&ring, &keys);

    ring.register_node(Node::with_id("D"));
    let after = owners(&ring, &keys);
    let moves = moved_keys(&before, &after);

    let fraction = moves.len() as f64 / keys.len() as f64;
    assert!(
        fraction > 0.05 && fraction < 0.45,
        "moved fraction {fraction} outside (0.05, 0.45)"
    );
    for m in &moves {
        assert_eq!(
            m.to,
            Some(NodeId::from("D")),
            "{} moved to a node other than the new one",
            m.key
        );
    }
}

#[test]
fn test_removal_only_moves_keys_of_removed_node() {
    let ring = ring_with(&["A", "B", "C", "D", "E"]);
    let keys = sample_keys("locality", 3000);
    let before = owners(&ring, &keys);

    ring.deregister_node("C");
    let after = owners(&ring, &keys);

    let removed = Some(NodeId::from("C"));
    let mut moved_from_others = 0;
    for key in &keys {
        if before[key] == removed {
            assert_ne!(after[key], removed);
            assert!(after[key].is_some());
        } else if before[key] != after[key] {
            moved_from_others += 1;
        }
    }
    assert_eq!(moved_from_others, 0, "keys of surviving nodes changed owner");

    let moves = moved_keys(&before, &after);
    assert!(moves.iter().all(|m| m.from == removed));
    assert!(!moves.is_empty());
}

#[test]
fn test_more_virtual_nodes_lower_variance() {
    let ids: Vec<String> = (0..10).map(|i| format!("node-{i}")).collect();
    let keys = sample_keys("variance", 20_000);

    let variance_for = |virtual_nodes: usize| {
        let ring = RingManager::with_virtual_nodes(virtual_nodes).unwrap();
        for id in &ids {
            ring.register_node(Node::with_id(id.as_str()));
        }
        let mut counts = std::collections::BTreeMap::<NodeId, usize>::new();
        for owner in owners(&ring, &keys).into_values().flatten() {
            *counts.entry(owner).or_insert(0) += 1;
        }
        let counts: Vec<usize> = ids
            .iter()
            .map(|id| counts.get(&NodeId::from(id.as_str())).copied().unwrap_or(0))
            .collect();
        stats::variance(&counts)
    };

    let coarse = variance_for(10);
    let fine = variance_for(200);
    assert!(
        fine < coarse,
        "variance with 200 vnodes ({fine}) should be below 10 vnodes ({coarse})"
    );
}

#[test]
fn test_virtual_node_count_scales_with_config() {
    let ring = RingManager::with_virtual_nodes(10).unwrap();
    for id in ["a", "b", "c", "d"] {
        ring.register_node(Node::with_id(id));
    }
    assert_eq!(ring.virtual_nodes_per_node(), 10);
    assert_eq!(ring.ring_info().virtual_node_count, 40);
}

#[test]
fn test_ring_info_samples_thousand_keys() {
    let ring = ring_with(&["B", "A", "C"]);
    let info = ring.ring_info();

    let ids: Vec<&str> = info.node_list.iter().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(info.data_distribution.values().sum::<usize>(), 1000);
    assert!((info.average_keys_per_node - 1000.0 / 3.0).abs() < 1e-9);
    assert!(info.distribution_uniformity > 0.0 && info.distribution_uniformity <= 100.0);
}

#[test]
fn test_ring_info_matches_sample_key_lookups() {
    let ring = ring_with(&["A", "B", "C"]);
    let info = ring.ring_info();

    let mut expected = std::collections::BTreeMap::<NodeId, usize>::new();
    for i in 0..1000 {
        let owner = ring.resolve(&format!("key_{i}")).unwrap();
        *expected.entry(owner.id().clone()).or_insert(0) += 1;
    }
    for (id, count) in &expected {
        assert_eq!(info.data_distribution.get(id), Some(count));
    }
}

#[test]
fn test_empty_ring_info() {
    let info = RingManager::default().ring_info();
    assert_eq!(info.physical_node_count, 0);
    assert_eq!(info.virtual_node_count, 0);
    assert!(info.node_list.is_empty());
    assert!(info.data_distribution.is_empty());
    assert_eq!(info.average_keys_per_node, 0.0);
}

#[test]
fn test_single_node_uniformity_is_perfect() {
    let info = ring_with(&["solo"]).ring_info();
    assert_eq!(info.distribution_uniformity, 100.0);
    assert_eq!(info.data_distribution.get(&NodeId::from("solo")), Some(&1000));
}

#[test]
fn test_reset() {
    let ring = ring_with(&["A", "B", "C"]);
    ring.reset();

    assert_eq!(ring.node_count(), 0);
    assert!(ring.resolve("user:123").is_none());
    assert_eq!(ring.ring_info().virtual_node_count, 0);

    // Usable again after a reset.
    ring.register_node(Node::with_id("A"));
    assert_eq!(ring.resolve("user:123").unwrap().id().as_str(), "A");
}

#[test]
fn test_distribution_report() {
    let ring = ring_with(&["A", "B", "C", "D"]);
    let report = ring.distribution("testkey", 4000);

    assert_eq!(report.total_key_count, 4000);
    assert_eq!(report.node_distribution.len(), 4);
    assert_eq!(report.node_distribution.values().sum::<usize>(), 4000);
    let pct: f64 = report.distribution_percentages.values().sum();
    assert!((pct - 100.0).abs() < 1e-6);
    assert_eq!(report.statistics.expected_keys_per_node, 1000.0);
    assert!(report.statistics.min_keys_per_node <= report.statistics.max_keys_per_node);
    assert!(report.uniformity_score > 50.0, "score {}", report.uniformity_score);
}

#[test]
fn test_distribution_on_empty_ring() {
    let report = RingManager::default().distribution("testkey", 100);
    assert_eq!(report.total_key_count, 100);
    assert!(report.node_distribution.is_empty());
    assert_eq!(report.uniformity_score, 0.0);
}

#[test]
fn test_clones_share_state() {
    let ring = RingManager::default();
    let handle = ring.clone();
    handle.register_node(Node::with_id("shared"));
    assert_eq!(ring.node_count(), 1);
    assert!(ring.contains("shared"));
}
