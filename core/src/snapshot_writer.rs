//! Snapshot Writer (C8, §4.8): aggregate a day's roster into a
//! `DailySnapshot`. Idempotent: calling it twice for the same day with the
//! same roster state produces byte-identical output.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::account::ClientAccount;
use crate::models::snapshot::{AgentSnapshotStats, DailySnapshot};

pub fn build_snapshot(date: NaiveDate, accounts: &[ClientAccount]) -> DailySnapshot {
    let mut distribution: BTreeMap<String, AgentSnapshotStats> = BTreeMap::new();
    let mut balance_total = 0.0;
    let mut roi_sum = 0.0;
    let mut win_rate_sum = 0.0;

    for account in accounts {
        balance_total += account.current_balance;
        roi_sum += account.cumulative_roi;
        win_rate_sum += account.win_rate;

        let Some(agent_id) = account.current_agent_id.clone() else {
            continue;
        };
        let entry = distribution.entry(agent_id).or_insert(AgentSnapshotStats {
            n_accounts: 0,
            balance_total: 0.0,
            avg_roi: 0.0,
        });
        let prior_total_roi = entry.avg_roi * entry.n_accounts as f64;
        entry.n_accounts += 1;
        entry.balance_total += account.current_balance;
        entry.avg_roi = (prior_total_roi + account.cumulative_roi) / entry.n_accounts as f64;
    }

    let total_accounts = accounts.len() as u32;
    let avg_roi = if total_accounts == 0 { 0.0 } else { roi_sum / total_accounts as f64 };
    let avg_win_rate = if total_accounts == 0 { 0.0 } else { win_rate_sum / total_accounts as f64 };

    DailySnapshot {
        date,
        total_accounts,
        balance_total,
        avg_roi,
        avg_win_rate,
        distribution,
    }
}
