use std::io::Write;

use anyhow::Result;
use conhash_ring::{DistributionReport, KeyMove, RingManager};

/// Movement above this share of sampled keys is flagged in the walkthrough.
const EXPECTED_MAX_MOVE_PCT: f64 = 30.0;

pub fn print_ring_status(ring: &RingManager, out: &mut impl Write) -> Result<()> {
    let info = ring.ring_info();
    let ids: Vec<&str> = info.node_list.iter().map(|id| id.as_str()).collect();

    writeln!(out, "Ring status:")?;
    writeln!(out, "  physical nodes: {}", info.physical_node_count)?;
    writeln!(out, "  virtual nodes:  {}", info.virtual_node_count)?;
    writeln!(out, "  nodes:          [{}]", ids.join(", "))?;
    if !info.data_distribution.is_empty() {
        writeln!(out, "  sampled distribution:")?;
        for (id, count) in &info.data_distribution {
            writeln!(out, "    {id}: {count}")?;
        }
        writeln!(out, "  uniformity:     {:.2}/100", info.distribution_uniformity)?;
    }
    Ok(())
}

pub fn print_distribution(report: &DistributionReport, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Distribution of {} keys:", report.total_key_count)?;
    for (id, count) in &report.node_distribution {
        let pct = report
            .distribution_percentages
            .get(id)
            .copied()
            .unwrap_or(0.0);
        writeln!(out, "  {id}: {count} ({pct:.1}%)")?;
    }
    let stats = &report.statistics;
    writeln!(
        out,
        "  expected/node: {:.1}  min: {}  max: {}  stddev: {:.2}",
        stats.expected_keys_per_node,
        stats.min_keys_per_node,
        stats.max_keys_per_node,
        stats.standard_deviation
    )?;
    writeln!(
        out,
        "  uniformity: {:.2}/100 (grade {})",
        report.uniformity_score, report.uniformity_grade
    )?;
    Ok(())
}

pub fn print_movement(
    operation: &str,
    total_keys: usize,
    moves: &[KeyMove],
    out: &mut impl Write,
) -> Result<()> {
    let pct = if total_keys > 0 {
        moves.len() as f64 / total_keys as f64 * 100.0
    } else {
        0.0
    };

    writeln!(out, "Impact of {operation}:")?;
    writeln!(out, "  sampled keys: {total_keys}")?;
    writeln!(out, "  moved keys:   {}", moves.len())?;
    writeln!(out, "  moved share:  {pct:.2}%")?;
    if pct < EXPECTED_MAX_MOVE_PCT {
        writeln!(out, "  only a small share of keys changed owner")?;
    } else {
        writeln!(out, "  more keys moved than expected")?;
    }
    Ok(())
}
