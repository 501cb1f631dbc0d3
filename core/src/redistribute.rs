//! Account Redistributor (C6, §4.6).

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::account::ClientAccount;
use crate::rng::CasterlyRng;

/// Seed the initial roster: shuffle accounts with the simulation's RNG,
/// then assign round-robin across the starting cohort (§4.6, grounded in
/// the reference system's shuffle-then-`idx % num_agents` distribution).
pub fn initial_distribution(rng: &mut CasterlyRng, accounts: &mut [ClientAccount], agents: &[String], date: NaiveDate) {
    if agents.is_empty() {
        return;
    }
    rng.shuffle(accounts);
    for (idx, account) in accounts.iter_mut().enumerate() {
        account.assign(agents[idx % agents.len()].clone(), date);
    }
}

/// Move a single account to a new agent (C6 `transfer`).
pub fn transfer(account: &mut ClientAccount, new_agent_id: impl Into<String>, date: NaiveDate) {
    account.assign(new_agent_id, date);
}

/// Move every account currently assigned to `from_agent` onto `to_agent`,
/// in ascending `account_id` order for deterministic logging (§4.6,
/// grounded in the reference system's agent-replacement transfer step).
pub fn transfer_all(accounts: &mut [ClientAccount], from_agent: &str, to_agent: &str, date: NaiveDate) {
    let mut indices: Vec<usize> = accounts
        .iter()
        .enumerate()
        .filter(|(_, a)| a.current_agent_id.as_deref() == Some(from_agent))
        .map(|(idx, _)| idx)
        .collect();
    indices.sort_by_key(|&idx| accounts[idx].account_id.clone());
    for idx in indices {
        transfer(&mut accounts[idx], to_agent, date);
    }
}

/// Equalize account counts across `agents` to within one of each other,
/// moving the fewest accounts possible. Accounts are chosen for transfer
/// in ascending `account_id` order so a replay always redistributes the
/// same ones (§4.6 rebalance step).
pub fn rebalance(accounts: &mut [ClientAccount], agents: &[String], date: NaiveDate) {
    if agents.is_empty() {
        return;
    }

    let mut by_agent: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, account) in accounts.iter().enumerate() {
        if let Some(agent_id) = account.current_agent_id.as_deref() {
            if agents.iter().any(|a| a == agent_id) {
                by_agent.entry(agent_id.to_string()).or_default().push(idx);
            }
        }
    }
    for indices in by_agent.values_mut() {
        indices.sort_by_key(|&idx| accounts[idx].account_id.clone());
    }

    let total: usize = by_agent.values().map(|v| v.len()).sum();
    let base = total / agents.len();
    let remainder = total % agents.len();

    let mut sorted_agents = agents.clone();
    sorted_agents.sort();

    let mut target: HashMap<String, usize> = HashMap::new();
    for (idx, agent_id) in sorted_agents.iter().enumerate() {
        target.insert(agent_id.clone(), base + usize::from(idx < remainder));
    }

    loop {
        let over = sorted_agents
            .iter()
            .find(|a| by_agent.get(a.as_str()).map(|v| v.len()).unwrap_or(0) > target[a.as_str()])
            .cloned();
        let under = sorted_agents
            .iter()
            .find(|a| by_agent.get(a.as_str()).map(|v| v.len()).unwrap_or(0) < target[a.as_str()])
            .cloned();
        match (over, under) {
            (Some(over_agent), Some(under_agent)) => {
                let idx = by_agent.get_mut(&over_agent).unwrap().remove(0);
                transfer(&mut accounts[idx], under_agent.as_str(), date);
                by_agent.entry(under_agent).or_default().push(idx);
            }
            _ => break,
        }
    }
}
