//! Rotation Detector (C5, §4.5).

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::models::agent_state::AgentState;
use crate::models::rotation_log::{RotationLogEntry, RotationReason};
use crate::models::simulation::MIN_TENURE_DAYS;
use crate::models::topn::TopNEntry;
use crate::ranking::three_day_fall;

/// Diff yesterday's cohort against today's TopN, pair OUT/IN agents by
/// ascending agent_id (§4.5 tie-break), and classify each rotation's
/// reason. Agents below `MIN_TENURE_DAYS` tenure are exempt from
/// ranking-displacement rotation (§4.5 supplement) but never from
/// stop-loss or three-day-fall expulsion.
pub fn detect(
    date: NaiveDate,
    agent_states: &HashMap<String, AgentState>,
    today_top_n: &[TopNEntry],
    last_three_daily_rois: &HashMap<String, Vec<f64>>,
    stop_loss_threshold: f64,
    fall_threshold: u32,
    window_days: u32,
) -> Vec<RotationLogEntry> {
    let currently_in: HashSet<String> = agent_states
        .values()
        .filter(|s| s.is_in_casterly)
        .map(|s| s.agent_id.clone())
        .collect();

    let should_be_in: HashSet<String> = today_top_n.iter().map(|e| e.agent_id.clone()).collect();

    let mut forced_out: Vec<String> = Vec::new();
    for agent_id in &currently_in {
        let state = match agent_states.get(agent_id) {
            Some(s) => s,
            None => continue,
        };
        let stop_loss_hit = state.roi_since_entry <= stop_loss_threshold;
        let fall_hit = last_three_daily_rois
            .get(agent_id)
            .map(|rois| three_day_fall(rois, fall_threshold))
            .unwrap_or(false);
        if stop_loss_hit || fall_hit {
            forced_out.push(agent_id.clone());
        }
    }

    let mut out_set: Vec<String> = currently_in
        .iter()
        .filter(|a| !should_be_in.contains(*a))
        .filter(|a| {
            forced_out.contains(a)
                || agent_states
                    .get(*a)
                    .map(|s| s.tenure_days >= MIN_TENURE_DAYS)
                    .unwrap_or(true)
        })
        .cloned()
        .collect();
    out_set.sort();

    // Displacement-only incumbents under minimum tenure are retained in
    // today's cohort instead of entering OUT (§4.5 supplement), so the
    // same number of lowest-ranked IN candidates must be dropped: their
    // slot is not contested, and cohort cardinality must stay at N.
    let retained_due_to_tenure = currently_in
        .iter()
        .filter(|a| !should_be_in.contains(*a))
        .filter(|a| {
            !forced_out.contains(a)
                && agent_states
                    .get(a.as_str())
                    .map(|s| s.tenure_days < MIN_TENURE_DAYS)
                    .unwrap_or(false)
        })
        .count();

    let top_n_by_agent: HashMap<&str, &TopNEntry> =
        today_top_n.iter().map(|e| (e.agent_id.as_str(), e)).collect();

    let mut in_candidates: Vec<String> = should_be_in
        .iter()
        .filter(|a| !currently_in.contains(*a))
        .cloned()
        .collect();
    in_candidates.sort_by_key(|a| top_n_by_agent.get(a.as_str()).map(|e| e.rank).unwrap_or(u32::MAX));
    let keep = in_candidates.len().saturating_sub(retained_due_to_tenure);
    in_candidates.truncate(keep);

    let mut in_set = in_candidates;
    in_set.sort();

    let reason_for = |agent_id: &str| -> RotationReason {
        let state = agent_states.get(agent_id);
        let stop_loss_hit = state.map(|s| s.roi_since_entry <= stop_loss_threshold).unwrap_or(false);
        if stop_loss_hit {
            return RotationReason::StopLoss;
        }
        let fall_hit = last_three_daily_rois
            .get(agent_id)
            .map(|rois| three_day_fall(rois, fall_threshold))
            .unwrap_or(false);
        if fall_hit {
            return RotationReason::ThreeDaysFall;
        }
        RotationReason::RankingDisplacement
    };

    let mut entries = Vec::with_capacity(out_set.len().max(in_set.len()));
    let pairs = out_set.len().max(in_set.len());
    for idx in 0..pairs {
        let agent_out = out_set.get(idx).cloned();
        let agent_in = in_set.get(idx).cloned();

        let reason = agent_out
            .as_deref()
            .map(reason_for)
            .unwrap_or(RotationReason::RankingDisplacement);

        let roi_window_out = agent_out
            .as_deref()
            .and_then(|a| top_n_by_agent.get(a))
            .map(|e| e.roi_window)
            .unwrap_or_else(|| {
                agent_out
                    .as_deref()
                    .and_then(|a| agent_states.get(a))
                    .map(|s| s.roi_day)
                    .unwrap_or(0.0)
            });
        let roi_total_out = agent_out
            .as_deref()
            .and_then(|a| agent_states.get(a))
            .map(|s| s.roi_since_entry)
            .unwrap_or(0.0);
        let roi_window_in = agent_in
            .as_deref()
            .and_then(|a| top_n_by_agent.get(a))
            .map(|e| e.roi_window)
            .unwrap_or(0.0);
        let (n_accounts, total_aum) = agent_in
            .as_deref()
            .and_then(|a| top_n_by_agent.get(a))
            .map(|e| (e.n_accounts, e.total_aum))
            .unwrap_or((0, 0.0));

        entries.push(RotationLogEntry {
            date,
            agent_out,
            agent_in,
            reason,
            roi_window_out,
            roi_total_out,
            roi_window_in,
            n_accounts,
            total_aum,
            window_days,
        });
    }

    entries
}
