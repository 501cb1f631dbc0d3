//! Account Advancer (C7, §4.7): apply each assigned agent's Daily ROI to
//! every account in the roster for one simulated day.

use std::collections::HashMap;

use crate::models::account::ClientAccount;
use crate::models::movement::DailyRoi;

/// Advance every account by the Daily ROI of its currently-assigned
/// agent. An account whose agent has no Daily ROI row for the day (not
/// yet a cohort member, or missing source data) is left unchanged for
/// that day rather than defaulted to zero growth.
pub fn advance_all(accounts: &mut [ClientAccount], daily_rois: &HashMap<String, DailyRoi>) {
    for account in accounts.iter_mut() {
        let Some(agent_id) = account.current_agent_id.as_deref() else {
            continue;
        };
        if let Some(row) = daily_rois.get(agent_id) {
            account.advance_day(row.roi);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_advance_all_applies_assigned_agents_roi() {
        let mut accounts = vec![ClientAccount::new("CL0001", 1000.0), ClientAccount::new("CL0002", 1000.0)];
        accounts[0].assign("agent-a", d("2024-01-01"));
        accounts[1].assign("agent-b", d("2024-01-01"));

        let mut daily_rois = HashMap::new();
        daily_rois.insert(
            "agent-a".to_string(),
            DailyRoi { agent_id: "agent-a".into(), date: d("2024-01-02"), roi: 0.10, pnl: 100.0, prior_balance: 1000.0, trade_count: 1 },
        );

        advance_all(&mut accounts, &daily_rois);
        assert!((accounts[0].current_balance - 1100.0).abs() < 1e-9);
        // agent-b has no row this day: unassigned account is untouched.
        assert_eq!(accounts[1].current_balance, 1000.0);
    }

    #[test]
    fn test_unassigned_accounts_are_skipped() {
        let mut accounts = vec![ClientAccount::new("CL0001", 1000.0)];
        let daily_rois = HashMap::new();
        advance_all(&mut accounts, &daily_rois);
        assert_eq!(accounts[0].current_balance, 1000.0);
    }
}
