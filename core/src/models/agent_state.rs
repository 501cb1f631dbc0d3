//! Agent State (§3): per (simulation, agent, day) cohort-membership record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub agent_id: String,
    pub is_in_casterly: bool,
    pub entry_date: Option<NaiveDate>,
    pub roi_since_entry: f64,
    pub roi_day: f64,
    /// Consecutive days held in the cohort since `entry_date`, used by the
    /// minimum-tenure rotation gate (§4.5 supplement).
    pub tenure_days: u32,
}

impl AgentState {
    pub fn new_cold(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            is_in_casterly: false,
            entry_date: None,
            roi_since_entry: 0.0,
            roi_day: 0.0,
            tenure_days: 0,
        }
    }

    /// Reset membership bookkeeping on (re-)entry to the cohort.
    pub fn enter_cohort(&mut self, date: NaiveDate) {
        self.is_in_casterly = true;
        self.entry_date = Some(date);
        self.roi_since_entry = 0.0;
        self.tenure_days = 0;
    }

    pub fn exit_cohort(&mut self) {
        self.is_in_casterly = false;
        self.entry_date = None;
        self.tenure_days = 0;
    }

    /// Compound today's daily ROI into `roi_since_entry` (I3) and advance
    /// tenure by one day.
    pub fn accrue_day(&mut self, roi_day: f64) {
        self.roi_day = roi_day;
        if self.is_in_casterly {
            self.roi_since_entry = (1.0 + self.roi_since_entry) * (1.0 + roi_day) - 1.0;
            self.tenure_days += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compounding_since_entry() {
        let mut state = AgentState::new_cold("agent-1");
        state.enter_cohort(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        state.accrue_day(0.10);
        state.accrue_day(-0.05);
        let expected = 1.10 * 0.95 - 1.0;
        assert!((state.roi_since_entry - expected).abs() < 1e-12);
        assert_eq!(state.tenure_days, 2);
    }

    #[test]
    fn test_exit_resets_tenure_and_entry() {
        let mut state = AgentState::new_cold("agent-1");
        state.enter_cohort(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        state.accrue_day(0.01);
        state.exit_cohort();
        assert!(!state.is_in_casterly);
        assert_eq!(state.tenure_days, 0);
        assert!(state.entry_date.is_none());
    }
}
