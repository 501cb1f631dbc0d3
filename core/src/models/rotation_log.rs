//! Rotation Log Entry (§3, C5): an append-only audit trail of cohort
//! rotations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationReason {
    StopLoss,
    ThreeDaysFall,
    RankingDisplacement,
    DailyRotation,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationLogEntry {
    pub date: NaiveDate,
    pub agent_out: Option<String>,
    pub agent_in: Option<String>,
    pub reason: RotationReason,
    pub roi_window_out: f64,
    pub roi_total_out: f64,
    pub roi_window_in: f64,
    pub n_accounts: u32,
    pub total_aum: f64,
    pub window_days: u32,
}
