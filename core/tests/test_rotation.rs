//! Integration coverage for the Rotation Detector (C5).

use std::collections::HashMap;

use casterly_core::rotation::detect;
use casterly_core::{AgentState, RotationReason, TopNEntry};
use chrono::NaiveDate;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn member(in_cohort: bool, roi_since_entry: f64, tenure_days: u32) -> AgentState {
    let mut state = AgentState::new_cold("placeholder");
    if in_cohort {
        state.enter_cohort(d("2024-01-01"));
        state.roi_since_entry = roi_since_entry;
        state.tenure_days = tenure_days;
    }
    state
}

fn top_entry(agent_id: &str, roi_window: f64) -> TopNEntry {
    TopNEntry {
        rank: 1,
        agent_id: agent_id.to_string(),
        roi_window,
        n_accounts: 3,
        total_aum: 3000.0,
        is_in_casterly: true,
    }
}

#[test]
fn test_three_day_fall_forces_expulsion_regardless_of_tenure() {
    let mut states = HashMap::new();
    states.insert("agent-a".to_string(), {
        let mut s = member(true, 0.01, 1);
        s.agent_id = "agent-a".to_string();
        s
    });

    let mut history = HashMap::new();
    history.insert("agent-a".to_string(), vec![-0.01, -0.02, -0.01]);

    let today_top_n = vec![top_entry("agent-b", 0.03)];
    let entries = detect(d("2024-01-05"), &states, &today_top_n, &history, -0.10, 3, 5);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].reason, RotationReason::ThreeDaysFall);
    assert_eq!(entries[0].agent_out.as_deref(), Some("agent-a"));
}

#[test]
fn test_unequal_out_in_counts_pair_by_index_after_sort() {
    let mut states = HashMap::new();
    for (id, roi) in [("agent-a", -0.20), ("agent-c", -0.30)] {
        states.insert(id.to_string(), {
            let mut s = member(true, roi, 10);
            s.agent_id = id.to_string();
            s
        });
    }

    let today_top_n = vec![top_entry("agent-new", 0.02)];
    let history = HashMap::new();

    let entries = detect(d("2024-01-05"), &states, &today_top_n, &history, -0.10, 3, 5);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].agent_out.as_deref(), Some("agent-a"));
    assert_eq!(entries[0].agent_in.as_deref(), Some("agent-new"));
    assert_eq!(entries[1].agent_out.as_deref(), Some("agent-c"));
    assert_eq!(entries[1].agent_in, None);
}

#[test]
fn test_stable_cohort_member_produces_no_entry() {
    let mut states = HashMap::new();
    states.insert("agent-a".to_string(), {
        let mut s = member(true, 0.05, 10);
        s.agent_id = "agent-a".to_string();
        s
    });
    let today_top_n = vec![top_entry("agent-a", 0.05)];
    let history = HashMap::new();

    let entries = detect(d("2024-01-05"), &states, &today_top_n, &history, -0.10, 3, 5);
    assert!(entries.is_empty());
}
