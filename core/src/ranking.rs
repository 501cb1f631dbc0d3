//! Ranking & Expulsion Engine (C4, §4.4).

use std::collections::HashMap;

use crate::models::agent_state::AgentState;
use crate::models::movement::WindowRoi;
use crate::models::simulation::MIN_AUM;
use crate::models::topn::TopNEntry;

/// Pluggable ranking key, mirroring the duck-typed ranking-strategy
/// hierarchy this engine is descended from (§9 design note, §4.4
/// supplement). `Send + Sync` so a future parallel fold over agents is a
/// non-breaking internal change.
pub trait RankingStrategy: Send + Sync {
    fn score(&self, window: &WindowRoi) -> f64;
    fn name(&self) -> &str;
}

pub struct RoiStrategy;
impl RankingStrategy for RoiStrategy {
    fn score(&self, window: &WindowRoi) -> f64 {
        window.roi_window_total
    }
    fn name(&self) -> &str {
        "roi"
    }
}

pub struct TotalPnlStrategy;
impl RankingStrategy for TotalPnlStrategy {
    fn score(&self, window: &WindowRoi) -> f64 {
        window.total_pnl_window
    }
    fn name(&self) -> &str {
        "total_pnl"
    }
}

pub struct WinRateStrategy;
impl RankingStrategy for WinRateStrategy {
    fn score(&self, window: &WindowRoi) -> f64 {
        if window.window_days == 0 {
            0.0
        } else {
            window.positive_days as f64 / window.window_days as f64
        }
    }
    fn name(&self) -> &str {
        "win_rate"
    }
}

pub struct SharpeRatioStrategy {
    pub risk_free_rate: f64,
}

impl RankingStrategy for SharpeRatioStrategy {
    fn score(&self, window: &WindowRoi) -> f64 {
        crate::kpi::sharpe_ratio(&window.daily_rois, self.risk_free_rate).unwrap_or(0.0)
    }
    fn name(&self) -> &str {
        "sharpe_ratio"
    }
}

/// Weighted combination of other strategies. Weights that do not sum to
/// 1.0 are normalized, mirroring the reference system's composite
/// strategy.
pub struct CompositeStrategy {
    strategies: Vec<(Box<dyn RankingStrategy>, f64)>,
}

impl CompositeStrategy {
    pub fn new(strategies: Vec<(Box<dyn RankingStrategy>, f64)>) -> Self {
        let total_weight: f64 = strategies.iter().map(|(_, w)| w).sum();
        if (total_weight - 1.0).abs() > 0.01 && total_weight > 0.0 {
            tracing::warn!(total_weight, "composite strategy weights do not sum to 1.0, normalizing");
            let normalized = strategies
                .into_iter()
                .map(|(s, w)| (s, w / total_weight))
                .collect();
            Self {
                strategies: normalized,
            }
        } else {
            Self { strategies }
        }
    }
}

impl RankingStrategy for CompositeStrategy {
    fn score(&self, window: &WindowRoi) -> f64 {
        self.strategies.iter().map(|(s, w)| s.score(window) * w).sum()
    }
    fn name(&self) -> &str {
        "composite"
    }
}

/// Examine up to the last three persisted Daily ROIs (chronological,
/// oldest first) and return whether the three-consecutive-loss counter
/// reaches the fall threshold. `roi < 0` increments, `roi > 0` resets to
/// zero, `roi == 0` leaves the counter unchanged (§4.4, Open Question
/// resolved in DESIGN.md: last-three-days only, never older history).
pub fn three_day_fall(last_three_daily_rois: &[f64], threshold: u32) -> bool {
    let mut counter = 0u32;
    for &roi in last_three_daily_rois {
        if roi < 0.0 {
            counter += 1;
        } else if roi > 0.0 {
            counter = 0;
        }
    }
    counter >= threshold
}

/// Per-agent inputs the engine needs beyond the Window ROI row: whether it
/// is currently a cohort member, its persisted `roi_since_entry`, and its
/// last up to three daily ROIs (chronological, oldest first) for the
/// three-day-fall check.
pub struct RankingInput<'a> {
    pub window: &'a WindowRoi,
    pub agent_state: Option<&'a AgentState>,
    pub last_three_daily_rois: &'a [f64],
}

/// Produce the day's ranked TopN output (§4.4). Returns `(top_n, full_ranked_list)`.
pub fn rank_and_select(
    inputs: &HashMap<String, RankingInput>,
    cohort_size: usize,
    stop_loss_threshold: f64,
    fall_threshold: u32,
    strategy: &dyn RankingStrategy,
) -> (Vec<TopNEntry>, Vec<TopNEntry>) {
    let mut eligible: Vec<(&String, &RankingInput, f64)> = Vec::new();

    for (agent_id, input) in inputs {
        if input.window.balance_current <= MIN_AUM {
            continue;
        }

        let in_cohort = input.agent_state.map(|s| s.is_in_casterly).unwrap_or(false);
        let stop_loss_hit = if in_cohort {
            input
                .agent_state
                .map(|s| s.roi_since_entry <= stop_loss_threshold)
                .unwrap_or(false)
        } else {
            input.window.roi_window_total < stop_loss_threshold
        };
        if stop_loss_hit {
            continue;
        }

        if three_day_fall(input.last_three_daily_rois, fall_threshold) {
            continue;
        }

        let score = strategy.score(input.window);
        eligible.push((agent_id, input, score));
    }

    let (mut positives, mut non_positives): (Vec<_>, Vec<_>) =
        eligible.into_iter().partition(|(_, _, score)| *score > 0.0);

    // Stable sort descending by score, agent_id ascending as the
    // deterministic tie-break (§4.4 tie-break resolution, DESIGN.md).
    let by_score_desc = |a: &(&String, &RankingInput, f64), b: &(&String, &RankingInput, f64)| {
        b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(b.0))
    };
    positives.sort_by(by_score_desc);
    non_positives.sort_by(by_score_desc);

    let mut ordered = positives;
    ordered.extend(non_positives);

    let full_ranked: Vec<TopNEntry> = ordered
        .into_iter()
        .enumerate()
        .map(|(idx, (agent_id, input, _))| TopNEntry {
            rank: (idx + 1) as u32,
            agent_id: agent_id.clone(),
            roi_window: input.window.roi_window_total,
            n_accounts: 0,
            total_aum: input.window.balance_current,
            is_in_casterly: input.agent_state.map(|s| s.is_in_casterly).unwrap_or(false),
        })
        .collect();

    let top_n = full_ranked.iter().take(cohort_size).cloned().collect();

    (top_n, full_ranked)
}
