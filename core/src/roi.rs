//! Daily-ROI Calculator (C2, §4.2) and Window-ROI Calculator (C3, §4.3).

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::movement::{DailyRoi, WindowRoi};
use crate::store::MarketDataStore;

/// Memoization table for Daily ROI rows. A plain growing map, not an LRU:
/// correctness here depends on idempotent recompute, not on eviction
/// (§9 design note).
#[derive(Debug, Default)]
pub struct DailyRoiCache {
    rows: HashMap<(String, NaiveDate), DailyRoi>,
}

impl DailyRoiCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, agent: &str, day: NaiveDate) -> Option<&DailyRoi> {
        self.rows.get(&(agent.to_string(), day))
    }

    /// Compute and memoize the Daily ROI for `(agent, day)` (§4.2 steps
    /// 1-5). Idempotent: a second call for the same key returns the
    /// memoized row untouched.
    pub fn daily_roi(&mut self, store: &impl MarketDataStore, agent: &str, day: NaiveDate) -> DailyRoi {
        let key = (agent.to_string(), day);
        if let Some(row) = self.rows.get(&key) {
            return row.clone();
        }

        let movements = store.movements_in_range(day, day, Some(agent));
        let pnl: f64 = movements.iter().map(|m| m.closed_pnl).sum();
        let trade_count = movements.len() as u32;

        let prior_day = day.pred_opt().expect("date underflow");
        let prior_balance = store.eod_balance(agent, prior_day).unwrap_or(0.0);

        let roi = if prior_balance <= 0.0 || movements.is_empty() {
            0.0
        } else {
            pnl / prior_balance
        };

        let row = DailyRoi {
            agent_id: agent.to_string(),
            date: day,
            roi,
            pnl,
            prior_balance,
            trade_count,
        };
        self.rows.insert(key, row.clone());
        row
    }

    /// Clear all memoized rows for a simulation reset.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    fn rows_insert(&mut self, row: DailyRoi) {
        self.rows.insert((row.agent_id.clone(), row.date), row);
    }
}

/// Compute Window ROI for every agent in `agents`, covering the W calendar
/// days `[day_T - W + 1, day_T]`.
///
/// Bulk path: this performs exactly one `movements_in_range` scan and one
/// `eod_balances_on` call per day of the window (not per agent), folding
/// the results into a per-(agent, day) in-memory grid before compounding —
/// the O(1)-range-scans contract in §4.3.
pub fn window_roi_bulk(
    store: &impl MarketDataStore,
    daily_cache: &mut DailyRoiCache,
    agents: &[String],
    day_t: NaiveDate,
    window_days: u32,
) -> HashMap<String, WindowRoi> {
    let window_start = day_t - chrono::Duration::days(window_days as i64 - 1);

    // One range scan over the whole window, not one per agent.
    let movements = store.movements_in_range(window_start, day_t, None);
    let mut pnl_by_agent_day: HashMap<(&str, NaiveDate), f64> = HashMap::new();
    let mut trades_by_agent_day: HashMap<(&str, NaiveDate), u32> = HashMap::new();
    for movement in movements {
        *pnl_by_agent_day
            .entry((movement.agent_id.as_str(), movement.date))
            .or_insert(0.0) += movement.closed_pnl;
        *trades_by_agent_day
            .entry((movement.agent_id.as_str(), movement.date))
            .or_insert(0) += 1;
    }

    let mut days = Vec::with_capacity(window_days as usize);
    let mut cursor = window_start;
    while cursor <= day_t {
        days.push(cursor);
        cursor = cursor.succ_opt().expect("date overflow");
    }

    let mut results = HashMap::with_capacity(agents.len());
    for agent in agents {
        let mut daily_rois = Vec::with_capacity(days.len());
        let mut positive_days = 0u32;
        let mut negative_days = 0u32;
        let mut total_trades = 0u32;
        let mut total_pnl = 0.0;
        let mut roi_window_total = 1.0;

        for &day in &days {
            // Reuse the memoized Daily ROI row if present so C2 and C3
            // agree on every value; otherwise derive it from the grid
            // built above rather than issuing a fresh point query.
            let roi = if let Some(cached) = daily_cache.get(agent, day) {
                cached.roi
            } else {
                let pnl = pnl_by_agent_day.get(&(agent.as_str(), day)).copied().unwrap_or(0.0);
                let trade_count = trades_by_agent_day.get(&(agent.as_str(), day)).copied().unwrap_or(0);
                let prior_balance = store.eod_balance(agent, day.pred_opt().expect("date underflow")).unwrap_or(0.0);
                let roi = if prior_balance <= 0.0 || trade_count == 0 {
                    0.0
                } else {
                    pnl / prior_balance
                };
                daily_cache.rows_insert(DailyRoi {
                    agent_id: agent.clone(),
                    date: day,
                    roi,
                    pnl,
                    prior_balance,
                    trade_count,
                });
                roi
            };

            daily_rois.push(roi);
            if roi > 0.0 {
                positive_days += 1;
            } else if roi < 0.0 {
                negative_days += 1;
            }
            total_trades += trades_by_agent_day.get(&(agent.as_str(), day)).copied().unwrap_or(0);
            total_pnl += pnl_by_agent_day.get(&(agent.as_str(), day)).copied().unwrap_or(0.0);
            roi_window_total *= 1.0 + roi;
        }

        let balance_current = store.eod_balance(agent, day_t).unwrap_or(0.0);

        results.insert(
            agent.clone(),
            WindowRoi {
                agent_id: agent.clone(),
                window_days,
                roi_window_total: roi_window_total - 1.0,
                total_pnl_window: total_pnl,
                positive_days,
                negative_days,
                total_trades_window: total_trades,
                balance_current,
                daily_rois,
            },
        );
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::movement::{EodBalance, Movement};
    use crate::store::InMemoryMarketStore;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn build_store() -> InMemoryMarketStore {
        let mut store = InMemoryMarketStore::new();
        store.set_eod_balance("agent-c", d("2023-12-31"), EodBalance { balance: 1000.0 });
        store.add_movement(Movement {
            agent_id: "agent-c".into(),
            date: d("2024-01-01"),
            closed_pnl: 100.0,
            symbol: "X".into(),
            side: "long".into(),
        });
        store.set_eod_balance("agent-c", d("2024-01-01"), EodBalance { balance: 1100.0 });
        store.add_movement(Movement {
            agent_id: "agent-c".into(),
            date: d("2024-01-02"),
            closed_pnl: -55.0,
            symbol: "X".into(),
            side: "long".into(),
        });
        store.set_eod_balance("agent-c", d("2024-01-02"), EodBalance { balance: 1045.0 });
        store.add_movement(Movement {
            agent_id: "agent-c".into(),
            date: d("2024-01-03"),
            closed_pnl: 104.5,
            symbol: "X".into(),
            side: "long".into(),
        });
        store.set_eod_balance("agent-c", d("2024-01-03"), EodBalance { balance: 1149.5 });
        store
    }

    #[test]
    fn test_daily_roi_sentinel_on_missing_prior_balance() {
        let store = InMemoryMarketStore::new();
        let mut cache = DailyRoiCache::new();
        let row = cache.daily_roi(&store, "agent-z", d("2024-01-01"));
        assert_eq!(row.roi, 0.0);
    }

    #[test]
    fn test_window_roi_compounding_matches_scenario_s3() {
        let store = build_store();
        let mut cache = DailyRoiCache::new();
        let agents = vec!["agent-c".to_string()];
        let results = window_roi_bulk(&store, &mut cache, &agents, d("2024-01-03"), 3);
        let window = results.get("agent-c").unwrap();

        let expected = 1.10_f64 * 0.95 * 1.10 - 1.0;
        assert!((window.roi_window_total - expected).abs() < 1e-9);
        assert_eq!(window.positive_days, 2);
        assert_eq!(window.negative_days, 1);
    }

    #[test]
    fn test_daily_and_window_roi_agree() {
        let store = build_store();
        let mut cache = DailyRoiCache::new();
        let direct = cache.daily_roi(&store, "agent-c", d("2024-01-01"));

        let agents = vec!["agent-c".to_string()];
        let results = window_roi_bulk(&store, &mut cache, &agents, d("2024-01-03"), 3);
        let window = results.get("agent-c").unwrap();

        assert!((window.daily_rois[0] - direct.roi).abs() < 1e-12);
    }
}
