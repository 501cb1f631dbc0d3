//! TopN Entry (§3): the day's ranked output of the Ranking & Expulsion
//! Engine (C4).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopNEntry {
    pub rank: u32,
    pub agent_id: String,
    pub roi_window: f64,
    pub n_accounts: u32,
    pub total_aum: f64,
    pub is_in_casterly: bool,
}
