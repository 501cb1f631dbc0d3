//! Aggregate KPI formulas (§4.9 supplement): volatility, Sharpe ratio,
//! max drawdown and the derived risk classification, grounded in the
//! reference system's risk-management domain service.

use crate::models::simulation::RiskLevel;

/// Sample standard deviation (denominator `n−1`) of a daily ROI series.
/// `0.0` for fewer than two observations.
pub fn volatility(daily_rois: &[f64]) -> f64 {
    if daily_rois.len() < 2 {
        return 0.0;
    }
    let mean = daily_rois.iter().sum::<f64>() / daily_rois.len() as f64;
    let variance =
        daily_rois.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (daily_rois.len() - 1) as f64;
    variance.sqrt()
}

/// Mean-excess-return-over-volatility Sharpe ratio. `None` when volatility
/// is zero (flat or single-point series) rather than dividing by zero.
pub fn sharpe_ratio(daily_rois: &[f64], risk_free_rate: f64) -> Option<f64> {
    if daily_rois.len() < 2 {
        return None;
    }
    let mean = daily_rois.iter().sum::<f64>() / daily_rois.len() as f64;
    let stdev = volatility(daily_rois);
    if stdev == 0.0 {
        return None;
    }
    Some((mean - risk_free_rate) / stdev)
}

/// Largest peak-to-trough decline over an equity/balance series, as a
/// non-positive fraction: `min_t ((V_t − peak_t) / peak_t)`. `-0.25` means a
/// 25% drawdown from the running peak; `0.0` when the series never drops
/// below its running peak.
pub fn max_drawdown(balances: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for &balance in balances {
        if balance > peak {
            peak = balance;
        }
        if peak > 0.0 {
            let drawdown = (balance - peak) / peak;
            if drawdown < worst {
                worst = drawdown;
            }
        }
    }
    worst
}

/// Classify overall risk from volatility and max drawdown. Thresholds
/// mirror the reference system's `calculate_risk_level` bands; `max_drawdown`
/// is taken by magnitude since it is carried as a non-positive fraction.
pub fn risk_level(volatility: f64, max_drawdown: f64) -> RiskLevel {
    let drawdown = max_drawdown.abs();
    if drawdown >= 0.30 || volatility >= 0.05 {
        RiskLevel::Critical
    } else if drawdown >= 0.15 || volatility >= 0.03 {
        RiskLevel::High
    } else if drawdown >= 0.05 || volatility >= 0.01 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
