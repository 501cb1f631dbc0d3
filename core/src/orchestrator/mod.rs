//! Simulation Orchestrator (C9, §4.9): owns the per-day pipeline and the
//! Idle → Preparing → Running → Completed/Failed state machine.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::advance::advance_all;
use crate::error::{CoreError, CoreResult};
use crate::kpi;
use crate::models::account::ClientAccount;
use crate::models::agent_state::AgentState;
use crate::models::rank_change::RankChangeEntry;
use crate::models::rotation_log::RotationLogEntry;
use crate::models::simulation::{
    AggregateKpis, SimulationConfig, SimulationPhase, SimulationRecord, SimulationStatus,
};
use crate::models::snapshot::DailySnapshot;
use crate::models::topn::TopNEntry;
use crate::ranking::{rank_and_select, RankingInput, RankingStrategy};
use crate::redistribute::{initial_distribution, rebalance, transfer_all};
use crate::rng::CasterlyRng;
use crate::roi::{window_roi_bulk, DailyRoiCache};
use crate::rotation;
use crate::store::MarketDataStore;
use crate::time::CalendarClock;

pub struct Orchestrator<S: MarketDataStore> {
    config: SimulationConfig,
    simulation_id: Uuid,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    clock: CalendarClock,
    rng: CasterlyRng,
    store: S,
    daily_cache: DailyRoiCache,
    strategy: Box<dyn RankingStrategy>,

    universe: Vec<String>,
    accounts: Vec<ClientAccount>,
    agent_states: HashMap<String, AgentState>,
    last_three_daily_rois: HashMap<String, Vec<f64>>,
    last_ranks: HashMap<String, u32>,

    rotation_log: Vec<RotationLogEntry>,
    rank_changes: Vec<RankChangeEntry>,
    snapshots: Vec<DailySnapshot>,
    /// Equal-weighted mean of cohort members' daily ROI, one entry per day
    /// that had a non-empty cohort (§4.9: aggregate KPIs are computed from
    /// daily ROIs of cohort members on days they were in cohort, not from
    /// account-weighted portfolio balances).
    cohort_daily_rois: Vec<f64>,

    phase: SimulationPhase,
    status_message: String,
}

impl<S: MarketDataStore> Orchestrator<S> {
    pub fn new(
        config: SimulationConfig,
        name: impl Into<String>,
        description: impl Into<String>,
        universe: Vec<String>,
        accounts: Vec<ClientAccount>,
        store: S,
        strategy: Box<dyn RankingStrategy>,
    ) -> CoreResult<Self> {
        config.validate()?;
        if universe.is_empty() {
            return Err(CoreError::InvalidInput("agent universe must not be empty".to_string()));
        }

        let simulation_id = Uuid::new_v4();
        let rng = CasterlyRng::from_simulation_id(simulation_id);
        let clock = CalendarClock::new(config.start_date, config.end_date);
        let agent_states = universe
            .iter()
            .map(|id| (id.clone(), AgentState::new_cold(id.clone())))
            .collect();

        Ok(Self {
            config,
            simulation_id,
            name: name.into(),
            description: description.into(),
            created_at: Utc::now(),
            clock,
            rng,
            store,
            daily_cache: DailyRoiCache::new(),
            strategy,
            universe,
            accounts,
            agent_states,
            last_three_daily_rois: HashMap::new(),
            last_ranks: HashMap::new(),
            rotation_log: Vec::new(),
            rank_changes: Vec::new(),
            snapshots: Vec::new(),
            cohort_daily_rois: Vec::new(),
            phase: SimulationPhase::Preparing,
            status_message: "prepared, awaiting run".to_string(),
        })
    }

    pub fn status(&self) -> SimulationStatus {
        SimulationStatus {
            phase: self.phase,
            is_running: self.phase == SimulationPhase::Running,
            current_day: self.clock.day_index().max(0) as u32,
            total_days: self.clock.total_days() as u32,
            started_at: Some(self.created_at),
            updated_at: Utc::now(),
            message: self.status_message.clone(),
        }
    }

    /// Run the simulation to completion, polling `should_cancel` once per
    /// day (§5: synchronous execution, not async — a non-blocking
    /// long-running run is the CLI's concern, not the core's).
    pub fn run(&mut self, should_cancel: &dyn Fn() -> bool) -> CoreResult<SimulationRecord> {
        self.phase = SimulationPhase::Running;

        let window_days = self.config.window_days as i64;

        loop {
            if should_cancel() {
                self.phase = SimulationPhase::Failed;
                self.status_message = "cancelled".to_string();
                return Err(CoreError::Cancelled);
            }

            let today = self.clock.current_day();
            self.step(today, window_days)?;

            if !self.clock.advance() {
                break;
            }
        }

        self.phase = SimulationPhase::Completed;
        self.status_message = "completed".to_string();
        Ok(self.finalize())
    }

    fn step(&mut self, today: NaiveDate, window_days: i64) -> CoreResult<()> {
        let mut daily_rois = HashMap::with_capacity(self.universe.len());
        for agent_id in &self.universe {
            let row = self.daily_cache.daily_roi(&self.store, agent_id, today);
            let history = self.last_three_daily_rois.entry(agent_id.clone()).or_default();
            history.push(row.roi);
            if history.len() > 3 {
                history.remove(0);
            }
            daily_rois.insert(agent_id.clone(), row);
        }

        // Cold Top-N bootstrap on day=start: `window_roi_bulk` reads history
        // from before `start` via the store, so ranking and rotation run
        // from day one rather than waiting for `window_days` of simulated
        // history to accumulate (§4.9 PREPARING → RUNNING(day=start)).
        let windows = window_roi_bulk(&self.store, &mut self.daily_cache, &self.universe, today, window_days as u32);

        let inputs: HashMap<String, RankingInput> = self
            .universe
            .iter()
            .filter_map(|agent_id| {
                windows.get(agent_id).map(|window| {
                    (
                        agent_id.clone(),
                        RankingInput {
                            window,
                            agent_state: self.agent_states.get(agent_id),
                            last_three_daily_rois: self
                                .last_three_daily_rois
                                .get(agent_id)
                                .map(|v| v.as_slice())
                                .unwrap_or(&[]),
                        },
                    )
                })
            })
            .collect();

        let (top_n, full_ranked) = rank_and_select(
            &inputs,
            self.config.cohort_size,
            self.config.stop_loss_threshold,
            self.config.fall_threshold_streak,
            self.strategy.as_ref(),
        );

        self.apply_rotation(today, &top_n, window_days as u32);
        self.record_rank_changes(today, &full_ranked);

        advance_all(&mut self.accounts, &daily_rois);
        let mut today_cohort_rois = Vec::new();
        for agent_id in &self.universe {
            if let Some(state) = self.agent_states.get_mut(agent_id) {
                if state.is_in_casterly {
                    let roi = daily_rois.get(agent_id).map(|r| r.roi).unwrap_or(0.0);
                    state.accrue_day(roi);
                    today_cohort_rois.push(roi);
                }
            }
        }
        if !today_cohort_rois.is_empty() {
            let avg = today_cohort_rois.iter().sum::<f64>() / today_cohort_rois.len() as f64;
            self.cohort_daily_rois.push(avg);
        }

        let snapshot = crate::snapshot_writer::build_snapshot(today, &self.accounts);
        self.snapshots.push(snapshot);

        Ok(())
    }

    fn apply_rotation(&mut self, today: NaiveDate, top_n: &[TopNEntry], window_days: u32) {
        let was_bootstrapping = !self.agent_states.values().any(|s| s.is_in_casterly);

        if was_bootstrapping {
            let initial_cohort: Vec<String> = top_n.iter().map(|e| e.agent_id.clone()).collect();
            for agent_id in &initial_cohort {
                if let Some(state) = self.agent_states.get_mut(agent_id) {
                    state.enter_cohort(today);
                }
            }
            initial_distribution(&mut self.rng, &mut self.accounts, &initial_cohort, today);
            return;
        }

        let mut entries = rotation::detect(
            today,
            &self.agent_states,
            top_n,
            &self.last_three_daily_rois,
            self.config.stop_loss_threshold,
            self.config.fall_threshold_streak,
            window_days,
        );

        for entry in &entries {
            if let Some(agent_out) = &entry.agent_out {
                if let Some(state) = self.agent_states.get_mut(agent_out) {
                    state.exit_cohort();
                }
            }
            if let Some(agent_in) = &entry.agent_in {
                if let Some(state) = self.agent_states.get_mut(agent_in) {
                    state.enter_cohort(today);
                }
            }
        }

        // Membership is settled for the day (retained tenure-protected
        // incumbents included), so derive the redistribution target from
        // `agent_states` rather than `top_n` alone: a retained incumbent
        // need not appear in today's TopN at all.
        let current_cohort: Vec<String> = self
            .universe
            .iter()
            .filter(|id| self.agent_states.get(*id).map(|s| s.is_in_casterly).unwrap_or(false))
            .cloned()
            .collect();

        for entry in &entries {
            match (&entry.agent_out, &entry.agent_in) {
                (Some(out), Some(into)) => transfer_all(&mut self.accounts, out, into, today),
                (Some(_), None) | (None, Some(_)) => rebalance(&mut self.accounts, &current_cohort, today),
                (None, None) => {}
            }
        }

        // Populate post-redistribution assignment counts now that account
        // movement has settled, rather than the placeholder zero carried by
        // TopNEntry at ranking time (I6: Σ n_accounts = total accounts).
        for entry in entries.iter_mut() {
            if let Some(agent_in) = entry.agent_in.clone() {
                let assigned: Vec<&ClientAccount> = self
                    .accounts
                    .iter()
                    .filter(|a| a.current_agent_id.as_deref() == Some(agent_in.as_str()))
                    .collect();
                entry.n_accounts = assigned.len() as u32;
                entry.total_aum = assigned.iter().map(|a| a.current_balance).sum();
            }
        }

        self.rotation_log.extend(entries);
    }

    fn record_rank_changes(&mut self, today: NaiveDate, full_ranked: &[TopNEntry]) {
        for entry in full_ranked {
            if !entry.is_in_casterly {
                continue;
            }
            if let Some(&rank_yesterday) = self.last_ranks.get(&entry.agent_id) {
                if rank_yesterday != entry.rank {
                    self.rank_changes.push(RankChangeEntry {
                        date: today,
                        agent_id: entry.agent_id.clone(),
                        rank_yesterday,
                        rank_today: entry.rank,
                        rank_change: rank_yesterday as i32 - entry.rank as i32,
                    });
                }
            }
        }
        self.last_ranks = full_ranked.iter().map(|e| (e.agent_id.clone(), e.rank)).collect();
    }

    fn finalize(&self) -> SimulationRecord {
        // Aggregate KPIs are computed from the daily ROIs of cohort members
        // on days they were in cohort (§4.9), not from account-weighted
        // portfolio balances: `total_roi` is the compounded cohort ROI,
        // `avg_roi` the arithmetic mean of daily cohort-average ROIs.
        let total_roi = self
            .cohort_daily_rois
            .iter()
            .fold(1.0, |acc, &r| acc * (1.0 + r))
            - 1.0;
        let avg_roi = if self.cohort_daily_rois.is_empty() {
            0.0
        } else {
            self.cohort_daily_rois.iter().sum::<f64>() / self.cohort_daily_rois.len() as f64
        };
        let volatility = kpi::volatility(&self.cohort_daily_rois);

        // Equity curve `V_t = ∏_{u≤t}(1+ROI_u)` over the cohort-average
        // daily ROI series, per §4.9's max_drawdown formula.
        let mut equity = 1.0;
        let mut equity_curve = Vec::with_capacity(self.cohort_daily_rois.len() + 1);
        equity_curve.push(equity);
        for &r in &self.cohort_daily_rois {
            equity *= 1.0 + r;
            equity_curve.push(equity);
        }
        let max_drawdown = kpi::max_drawdown(&equity_curve);

        let win_rate = if self.cohort_daily_rois.is_empty() {
            0.0
        } else {
            self.cohort_daily_rois.iter().filter(|&&r| r > 0.0).count() as f64
                / self.cohort_daily_rois.len() as f64
        };
        let sharpe_ratio = kpi::sharpe_ratio(&self.cohort_daily_rois, 0.0);
        let risk_level = kpi::risk_level(volatility, max_drawdown);

        let final_cohort: Vec<TopNEntry> = self
            .last_ranks
            .iter()
            .map(|(agent_id, &rank)| TopNEntry {
                rank,
                agent_id: agent_id.clone(),
                roi_window: self
                    .agent_states
                    .get(agent_id)
                    .map(|s| s.roi_since_entry)
                    .unwrap_or(0.0),
                n_accounts: self
                    .accounts
                    .iter()
                    .filter(|a| a.current_agent_id.as_deref() == Some(agent_id.as_str()))
                    .count() as u32,
                total_aum: self
                    .accounts
                    .iter()
                    .filter(|a| a.current_agent_id.as_deref() == Some(agent_id.as_str()))
                    .map(|a| a.current_balance)
                    .sum(),
                is_in_casterly: self.agent_states.get(agent_id).map(|s| s.is_in_casterly).unwrap_or(false),
            })
            .collect();

        SimulationRecord {
            simulation_id: self.simulation_id,
            name: self.name.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            config: self.config.clone(),
            kpis: AggregateKpis {
                total_roi,
                avg_roi,
                volatility,
                max_drawdown,
                win_rate,
                sharpe_ratio,
                risk_level,
            },
            final_cohort,
            rotations: self.rotation_log.clone(),
        }
    }

    pub fn reset(&mut self) {
        self.clock = CalendarClock::new(self.config.start_date, self.config.end_date);
        self.daily_cache.clear();
        for account in self.accounts.iter_mut() {
            account.reset();
        }
        for agent_id in &self.universe {
            self.agent_states.insert(agent_id.clone(), AgentState::new_cold(agent_id.clone()));
        }
        self.last_three_daily_rois.clear();
        self.last_ranks.clear();
        self.rotation_log.clear();
        self.rank_changes.clear();
        self.snapshots.clear();
        self.cohort_daily_rois.clear();
        self.phase = SimulationPhase::Preparing;
        self.status_message = "reset, awaiting run".to_string();
    }

    pub fn snapshots(&self) -> &[DailySnapshot] {
        &self.snapshots
    }

    pub fn rank_changes(&self) -> &[RankChangeEntry] {
        &self.rank_changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::movement::{EodBalance, Movement};
    use crate::ranking::RoiStrategy;
    use crate::store::InMemoryMarketStore;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn build_store(agents: &[&str], days: &[&str]) -> InMemoryMarketStore {
        let mut store = InMemoryMarketStore::new();
        for agent in agents {
            store.set_eod_balance(*agent, d(days[0]).pred_opt().unwrap(), EodBalance { balance: 1000.0 });
            let mut balance = 1000.0;
            for (idx, day) in days.iter().enumerate() {
                let pnl = if idx % 2 == 0 { 20.0 } else { -5.0 };
                store.add_movement(Movement {
                    agent_id: (*agent).to_string(),
                    date: d(day),
                    closed_pnl: pnl,
                    symbol: "X".into(),
                    side: "long".into(),
                });
                balance += pnl;
                store.set_eod_balance(*agent, d(day), EodBalance { balance });
            }
        }
        store
    }

    #[test]
    fn test_orchestrator_runs_to_completion_and_produces_record() {
        let days = ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"];
        let store = build_store(&["agent-a", "agent-b"], &days);

        let config = SimulationConfig::new(d(days[0]), d(days[days.len() - 1]), 3);
        let accounts = vec![ClientAccount::new("CL0001", 1000.0), ClientAccount::new("CL0002", 1000.0)];
        let universe = vec!["agent-a".to_string(), "agent-b".to_string()];

        let mut orchestrator = Orchestrator::new(
            config,
            "sim-1",
            "test simulation",
            universe,
            accounts,
            store,
            Box::new(RoiStrategy),
        )
        .unwrap();

        let record = orchestrator.run(&|| false).unwrap();
        assert_eq!(record.config.window_days, 3);
        assert_eq!(orchestrator.snapshots().len(), 5);
    }

    #[test]
    fn test_run_honors_cancellation() {
        let days = ["2024-01-01", "2024-01-02", "2024-01-03"];
        let store = build_store(&["agent-a"], &days);
        let config = SimulationConfig::new(d(days[0]), d(days[2]), 3);
        let accounts = vec![ClientAccount::new("CL0001", 1000.0)];
        let universe = vec!["agent-a".to_string()];

        let mut orchestrator =
            Orchestrator::new(config, "sim-2", "", universe, accounts, store, Box::new(RoiStrategy)).unwrap();

        let result = orchestrator.run(&|| true);
        assert!(matches!(result, Err(CoreError::Cancelled)));
    }
}
