//! Summary statistics over sampled key ownership.

use std::collections::BTreeMap;
use std::fmt;

use conhash_core::NodeId;
use serde::{Deserialize, Serialize};

/// Snapshot of ring membership plus a sampled ownership distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingInfo {
    pub physical_node_count: usize,
    /// Stored positions; below `physical * virtual_nodes_per_node` only on collision.
    pub virtual_node_count: usize,
    pub node_list: Vec<NodeId>,
    pub data_distribution: BTreeMap<NodeId, usize>,
    pub average_keys_per_node: f64,
    pub distribution_uniformity: f64,
}

impl RingInfo {
    pub(crate) fn new(
        virtual_node_count: usize,
        node_list: Vec<NodeId>,
        data_distribution: BTreeMap<NodeId, usize>,
    ) -> Self {
        let physical_node_count = node_list.len();
        let sampled: usize = data_distribution.values().sum();
        let counts: Vec<usize> = data_distribution.values().copied().collect();

        let average_keys_per_node = if physical_node_count > 0 {
            sampled as f64 / physical_node_count as f64
        } else {
            0.0
        };
        let distribution_uniformity = match physical_node_count {
            0 => 0.0,
            1 => 100.0,
            _ => uniformity_score(&counts),
        };

        Self {
            physical_node_count,
            virtual_node_count,
            node_list,
            data_distribution,
            average_keys_per_node,
            distribution_uniformity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UniformityGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl UniformityGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 95.0 {
            Self::APlus
        } else if score >= 90.0 {
            Self::A
        } else if score >= 80.0 {
            Self::B
        } else if score >= 70.0 {
            Self::C
        } else if score >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for UniformityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DistributionStats {
    pub expected_keys_per_node: f64,
    pub min_keys_per_node: usize,
    pub max_keys_per_node: usize,
    pub standard_deviation: f64,
    /// `max / min`, or 0 when some node received no keys.
    pub imbalance_ratio: f64,
}

impl DistributionStats {
    pub fn from_counts(counts: &[usize]) -> Self {
        if counts.is_empty() {
            return Self::default();
        }
        let min = counts.iter().copied().min().unwrap_or(0);
        let max = counts.iter().copied().max().unwrap_or(0);
        let total: usize = counts.iter().sum();
        Self {
            expected_keys_per_node: total as f64 / counts.len() as f64,
            min_keys_per_node: min,
            max_keys_per_node: max,
            standard_deviation: standard_deviation(counts),
            imbalance_ratio: if min > 0 {
                max as f64 / min as f64
            } else {
                0.0
            },
        }
    }
}

/// Result of resolving a synthetic key sequence against the ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub total_key_count: usize,
    pub node_distribution: BTreeMap<NodeId, usize>,
    pub distribution_percentages: BTreeMap<NodeId, f64>,
    pub uniformity_score: f64,
    pub uniformity_grade: UniformityGrade,
    pub statistics: DistributionStats,
}

impl DistributionReport {
    pub fn new(total_key_count: usize, node_distribution: BTreeMap<NodeId, usize>) -> Self {
        let counts: Vec<usize> = node_distribution.values().copied().collect();
        let distribution_percentages = node_distribution
            .iter()
            .map(|(id, count)| {
                let pct = if total_key_count > 0 {
                    *count as f64 / total_key_count as f64 * 100.0
                } else {
                    0.0
                };
                (id.clone(), pct)
            })
            .collect();
        let uniformity_score = uniformity_score(&counts);

        Self {
            total_key_count,
            node_distribution,
            distribution_percentages,
            uniformity_score,
            uniformity_grade: UniformityGrade::from_score(uniformity_score),
            statistics: DistributionStats::from_counts(&counts),
        }
    }
}

/// Population variance of per-node counts around their mean.
pub fn variance(counts: &[usize]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    let n = counts.len() as f64;
    let mean = counts.iter().sum::<usize>() as f64 / n;
    counts
        .iter()
        .map(|c| {
            let d = *c as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n
}

pub fn standard_deviation(counts: &[usize]) -> f64 {
    variance(counts).sqrt()
}

/// `100 - CV * 100`, floored at zero. Empty or all-zero input scores 0.
pub fn uniformity_score(counts: &[usize]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let cv = standard_deviation(counts) / mean;
    (100.0 - cv * 100.0).max(0.0)
}
