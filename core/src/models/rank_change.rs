//! Rank-Change Entry (§3): emitted when an agent stays in cohort but its
//! rank moves (S5).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankChangeEntry {
    pub date: NaiveDate,
    pub agent_id: String,
    pub rank_yesterday: u32,
    pub rank_today: u32,
    pub rank_change: i32,
}
