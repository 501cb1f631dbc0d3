//! Movement / Balance Store (C1, §4.1)
//!
//! Read-only access to historical per-day closed-PnL movements and
//! end-of-day balances, keyed by agent and date. Indexed by `(date,
//! agent_id)` so range scans over a window are O(window size), never
//! O(K·W) point lookups — the performance contract in §4.3.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::models::movement::{EodBalance, Movement};

/// Read-only collaborator supplying historical data to the engine.
pub trait MarketDataStore {
    fn movements_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        agent: Option<&str>,
    ) -> Vec<&Movement>;

    fn eod_balances_on(&self, day: NaiveDate) -> BTreeMap<&str, f64>;

    fn eod_balance(&self, agent: &str, day: NaiveDate) -> Option<f64>;

    fn agents_with_any_balance(&self, start: NaiveDate, end: NaiveDate) -> HashSet<String>;
}

/// In-memory reference implementation. Movements and balances are indexed
/// by `(date, agent_id)` in a `BTreeMap`, giving ordered range scans
/// (`BTreeMap::range`) without a linear pass over unrelated dates.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketStore {
    movements_by_date: BTreeMap<NaiveDate, Vec<Movement>>,
    balances_by_date: BTreeMap<NaiveDate, BTreeMap<String, f64>>,
}

impl InMemoryMarketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_movement(&mut self, movement: Movement) {
        self.movements_by_date
            .entry(movement.date)
            .or_default()
            .push(movement);
    }

    pub fn set_eod_balance(&mut self, agent_id: impl Into<String>, day: NaiveDate, balance: EodBalance) {
        self.balances_by_date
            .entry(day)
            .or_default()
            .insert(agent_id.into(), balance.balance);
    }
}

impl MarketDataStore for InMemoryMarketStore {
    fn movements_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        agent: Option<&str>,
    ) -> Vec<&Movement> {
        self.movements_by_date
            .range(start..=end)
            .flat_map(|(_, movements)| movements.iter())
            .filter(|movement| agent.map(|a| movement.agent_id == a).unwrap_or(true))
            .collect()
    }

    fn eod_balances_on(&self, day: NaiveDate) -> BTreeMap<&str, f64> {
        self.balances_by_date
            .get(&day)
            .map(|by_agent| by_agent.iter().map(|(k, v)| (k.as_str(), *v)).collect())
            .unwrap_or_default()
    }

    fn eod_balance(&self, agent: &str, day: NaiveDate) -> Option<f64> {
        self.balances_by_date.get(&day).and_then(|by_agent| by_agent.get(agent)).copied()
    }

    fn agents_with_any_balance(&self, start: NaiveDate, end: NaiveDate) -> HashSet<String> {
        self.balances_by_date
            .range(start..=end)
            .flat_map(|(_, by_agent)| by_agent.keys().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_movements_in_range_filters_by_agent_and_date() {
        let mut store = InMemoryMarketStore::new();
        store.add_movement(Movement {
            agent_id: "agent-1".into(),
            date: d("2024-01-01"),
            closed_pnl: 10.0,
            symbol: "BTC".into(),
            side: "long".into(),
        });
        store.add_movement(Movement {
            agent_id: "agent-2".into(),
            date: d("2024-01-01"),
            closed_pnl: 5.0,
            symbol: "ETH".into(),
            side: "short".into(),
        });
        store.add_movement(Movement {
            agent_id: "agent-1".into(),
            date: d("2024-01-10"),
            closed_pnl: 1.0,
            symbol: "BTC".into(),
            side: "long".into(),
        });

        let in_range = store.movements_in_range(d("2024-01-01"), d("2024-01-05"), Some("agent-1"));
        assert_eq!(in_range.len(), 1);
        assert_eq!(in_range[0].closed_pnl, 10.0);

        let all_in_range = store.movements_in_range(d("2024-01-01"), d("2024-01-05"), None);
        assert_eq!(all_in_range.len(), 2);
    }

    #[test]
    fn test_missing_balance_is_absent_not_zero() {
        let store = InMemoryMarketStore::new();
        assert_eq!(store.eod_balance("agent-1", d("2024-01-01")), None);
    }
}
