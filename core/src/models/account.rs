//! Client Account (§3, C6/C7): a fixed roster member whose balance is
//! advanced by its currently-assigned agent's daily ROI.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientAccount {
    pub account_id: String,
    /// Constant after creation, including across resets (I7).
    pub initial_balance: f64,
    pub current_balance: f64,
    pub cumulative_roi: f64,
    pub current_agent_id: Option<String>,
    pub assigned_at: Option<NaiveDate>,
    pub roi_at_assignment: f64,
    /// Running fraction of days with `r > 0` since creation.
    pub win_rate: f64,
    pub change_count: u32,

    days_observed: u32,
    winning_days: u32,
}

impl ClientAccount {
    pub fn new(account_id: impl Into<String>, initial_balance: f64) -> Self {
        Self {
            account_id: account_id.into(),
            initial_balance,
            current_balance: initial_balance,
            cumulative_roi: 0.0,
            current_agent_id: None,
            assigned_at: None,
            roi_at_assignment: 0.0,
            win_rate: 0.0,
            change_count: 0,
            days_observed: 0,
            winning_days: 0,
        }
    }

    /// Reassign this account to a different cohort member (C6 `transfer`).
    pub fn assign(&mut self, agent_id: impl Into<String>, date: NaiveDate) {
        self.current_agent_id = Some(agent_id.into());
        self.assigned_at = Some(date);
        self.roi_at_assignment = self.cumulative_roi;
        self.change_count += 1;
    }

    /// Advance one day using the currently-assigned agent's daily ROI
    /// (C7 steps 1-4).
    pub fn advance_day(&mut self, daily_roi: f64) {
        self.current_balance *= 1.0 + daily_roi;
        self.cumulative_roi = (self.current_balance / self.initial_balance) - 1.0;

        self.days_observed += 1;
        if daily_roi > 0.0 {
            self.winning_days += 1;
        }
        self.win_rate = self.winning_days as f64 / self.days_observed as f64;
    }

    /// Reset semantics: preserve `initial_balance`, revert everything else
    /// to day-0 values (§4.7 Reset semantics, I7).
    pub fn reset(&mut self) {
        let initial_balance = self.initial_balance;
        let account_id = self.account_id.clone();
        *self = Self::new(account_id, initial_balance);
    }
}
