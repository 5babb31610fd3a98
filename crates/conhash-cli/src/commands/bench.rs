use std::io::Write;
use std::time::Instant;

use anyhow::Result;
use conhash_core::Node;
use conhash_ring::RingManager;
use tracing::info;

const UNIFORMITY_KEYS: usize = 1000;

#[derive(Debug, Clone)]
pub struct ScaleResult {
    pub node_count: usize,
    pub register_ms: f64,
    pub avg_lookup_us: f64,
    pub uniformity_score: f64,
}

pub fn measure(virtual_nodes: usize, node_count: usize, lookups: usize) -> Result<ScaleResult> {
    let ring = RingManager::with_virtual_nodes(virtual_nodes)?;

    let started = Instant::now();
    for i in 1..=node_count {
        ring.register_node(Node::new(
            format!("node_{i}"),
            format!("host{i}.example.com"),
            8080,
        ));
    }
    let register_ms = started.elapsed().as_secs_f64() * 1000.0;

    let started = Instant::now();
    for i in 0..lookups {
        ring.resolve(&format!("test_key_{i}"));
    }
    let avg_lookup_us = if lookups > 0 {
        started.elapsed().as_secs_f64() * 1_000_000.0 / lookups as f64
    } else {
        0.0
    };

    let uniformity_score = ring
        .distribution("uniform_test", UNIFORMITY_KEYS)
        .uniformity_score;

    Ok(ScaleResult {
        node_count,
        register_ms,
        avg_lookup_us,
        uniformity_score,
    })
}

pub fn run(
    virtual_nodes: usize,
    node_counts: &[usize],
    lookups: usize,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(
        out,
        "{:<10} {:<16} {:<14} {:<12}",
        "nodes", "avg lookup", "uniformity", "register"
    )?;
    writeln!(out, "{}", "-".repeat(56))?;

    for &count in node_counts {
        info!(node_count = count, virtual_nodes, lookups, "Measuring ring size");
        let result = measure(virtual_nodes, count, lookups)?;
        info!(
            node_count = count,
            avg_lookup_us = result.avg_lookup_us,
            uniformity = result.uniformity_score,
            "Ring size measured"
        );
        writeln!(
            out,
            "{:<10} {:<16} {:<14.1} {:<12}",
            result.node_count,
            format!("{:.3}us", result.avg_lookup_us),
            result.uniformity_score,
            format!("{:.1}ms", result.register_ms),
        )?;
    }

    writeln!(out, "{}", "-".repeat(56))?;
    writeln!(
        out,
        "lookup time averaged over {lookups} lookups, uniformity over {UNIFORMITY_KEYS} keys"
    )?;
    Ok(())
}
