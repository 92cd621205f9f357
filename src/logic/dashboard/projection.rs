//! Dashboard projections
//!
//! Chart-ready data and summary cards derived from a `StatisticsSnapshot`.

use serde::Serialize;

use crate::logic::model::{RiskLevel, StatisticsSnapshot};

/// One pie slice of the risk distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskSlice {
    pub name: RiskLevel,
    pub value: u64,
    pub fill: &'static str,
}

/// One bar of the per-system distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemBar {
    pub name: String,
    pub count: u64,
}

/// Headline numbers; all zero until a snapshot arrives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryCards {
    pub total_decisions: u64,
    pub low_risk: u64,
    pub medium_risk: u64,
    /// high + critical
    pub high_risk: u64,
}

impl SummaryCards {
    pub fn from_snapshot(stats: Option<&StatisticsSnapshot>) -> Self {
        match stats {
            Some(stats) => Self {
                total_decisions: stats.total_decisions,
                low_risk: stats.risk_count(RiskLevel::Low),
                medium_risk: stats.risk_count(RiskLevel::Medium),
                high_risk: stats.risk_count(RiskLevel::High) + stats.risk_count(RiskLevel::Critical),
            },
            None => Self::default(),
        }
    }
}

/// One slice per level the store reported, in the store's order
pub fn risk_distribution(stats: &StatisticsSnapshot) -> Vec<RiskSlice> {
    stats
        .by_risk_level
        .iter()
        .map(|(level, count)| RiskSlice {
            name: *level,
            value: *count,
            fill: level.color(),
        })
        .collect()
}

/// One bar per source system, in the store's order
pub fn system_distribution(stats: &StatisticsSnapshot) -> Vec<SystemBar> {
    stats
        .by_source_system
        .iter()
        .map(|(system, count)| SystemBar {
            name: system.clone(),
            count: *count,
        })
        .collect()
}
