//! Daily Snapshot (§3, C8): end-of-day aggregate view, keyed by
//! `(simulation_id, day)` and idempotent under re-write.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshotStats {
    pub n_accounts: u32,
    pub balance_total: f64,
    pub avg_roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub total_accounts: u32,
    pub balance_total: f64,
    pub avg_roi: f64,
    pub avg_win_rate: f64,
    /// Keyed by agent_id; `BTreeMap` so serialized output is deterministic.
    pub distribution: BTreeMap<String, AgentSnapshotStats>,
}
