//! Simulation configuration, terminal record, and the process-wide status
//! singleton (§3, §4.9, §6.2).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::rotation_log::RotationLogEntry;
use crate::models::topn::TopNEntry;

/// Window sizes the ranking/expulsion engine supports (§6.4).
pub const SUPPORTED_WINDOWS: [u32; 6] = [3, 5, 7, 10, 15, 30];

pub const STOP_LOSS_THRESHOLD: f64 = -0.10;
pub const FALL_THRESHOLD_STREAK: u32 = 3;
pub const MIN_AUM: f64 = 0.01;
pub const DEFAULT_COHORT_SIZE: usize = 16;
pub const DEFAULT_INITIAL_BALANCE: f64 = 1000.0;
pub const MIN_TENURE_DAYS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub window_days: u32,
    pub cohort_size: usize,
    pub stop_loss_threshold: f64,
    pub fall_threshold_streak: u32,
    pub initial_balance: f64,
}

impl SimulationConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, window_days: u32) -> Self {
        Self {
            start_date,
            end_date,
            window_days,
            cohort_size: DEFAULT_COHORT_SIZE,
            stop_loss_threshold: STOP_LOSS_THRESHOLD,
            fall_threshold_streak: FALL_THRESHOLD_STREAK,
            initial_balance: DEFAULT_INITIAL_BALANCE,
        }
    }

    /// Validate per §4.9 IDLE→PREPARING transition and §6.2 control
    /// surface: `end_date - start_date >= 2 days`, `window_days` supported.
    pub fn validate(&self) -> CoreResult<()> {
        if self.end_date < self.start_date {
            return Err(CoreError::InvalidInput(
                "end_date must not precede start_date".to_string(),
            ));
        }
        if (self.end_date - self.start_date).num_days() < 2 {
            return Err(CoreError::InvalidInput(
                "simulation range must span at least 3 days".to_string(),
            ));
        }
        if !SUPPORTED_WINDOWS.contains(&self.window_days) {
            return Err(CoreError::InvalidInput(format!(
                "unsupported window_days {}, expected one of {:?}",
                self.window_days, SUPPORTED_WINDOWS
            )));
        }
        if self.cohort_size == 0 {
            return Err(CoreError::InvalidInput(
                "cohort_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Informational risk classification attached to a completed simulation
/// (§4.9 supplement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateKpis {
    pub total_roi: f64,
    pub avg_roi: f64,
    pub volatility: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub sharpe_ratio: Option<f64>,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub simulation_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub config: SimulationConfig,
    pub kpis: AggregateKpis,
    pub final_cohort: Vec<TopNEntry>,
    pub rotations: Vec<RotationLogEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationPhase {
    Idle,
    Preparing,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStatus {
    pub phase: SimulationPhase,
    pub is_running: bool,
    pub current_day: u32,
    pub total_days: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub message: String,
}

impl SimulationStatus {
    pub fn idle() -> Self {
        Self {
            phase: SimulationPhase::Idle,
            is_running: false,
            current_day: 0,
            total_days: 0,
            started_at: None,
            updated_at: Utc::now(),
            message: String::new(),
        }
    }
}
