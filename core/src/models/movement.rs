//! Movement / EOD Balance source data (C1) and the derived Daily / Window
//! ROI rows (C2, C3).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An immutable record of one closed trade. Source of truth for realized
/// PnL; written by ingestion, read-only to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub agent_id: String,
    pub date: NaiveDate,
    pub closed_pnl: f64,
    pub symbol: String,
    pub side: String,
}

/// An immutable per-(agent, date) balance after close. Source of truth for
/// ROI denominators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EodBalance {
    pub balance: f64,
}

/// Derived (agent, day) row, memoized (§4.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRoi {
    pub agent_id: String,
    pub date: NaiveDate,
    pub roi: f64,
    pub pnl: f64,
    pub prior_balance: f64,
    pub trade_count: u32,
}

/// Compounded ROI over a trailing window of W calendar days (§4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRoi {
    pub agent_id: String,
    pub window_days: u32,
    pub roi_window_total: f64,
    pub total_pnl_window: f64,
    pub positive_days: u32,
    pub negative_days: u32,
    pub total_trades_window: u32,
    pub balance_current: f64,
    /// Daily ROIs that fed the compounding, oldest first.
    pub daily_rois: Vec<f64>,
}

impl WindowRoi {
    pub fn zero_days(&self) -> u32 {
        self.window_days
            .saturating_sub(self.positive_days + self.negative_days)
    }
}
