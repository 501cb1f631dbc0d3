//! Casterly Rock simulation core.
//!
//! A deterministic, calendar-day simulation of a Top-N trading-agent
//! rotation and cash-allocation scheme.
//!
//! # Architecture
//!
//! - **models**: Domain types (agents, accounts, ROI rows, rotation log)
//! - **store**: Read-only historical movement/balance access (C1)
//! - **roi**: Daily and Window ROI calculators (C2, C3)
//! - **ranking**: Ranking & Expulsion Engine (C4)
//! - **rotation**: Rotation Detector (C5)
//! - **redistribute**: Account Redistributor (C6)
//! - **advance**: Account Advancer (C7)
//! - **snapshot_writer**: Daily Snapshot aggregation (C8)
//! - **orchestrator**: Per-day pipeline and run/status/reset control surface (C9)
//! - **rng**: Deterministic xorshift64* random number generation
//!
//! # Critical invariants
//!
//! 1. All monetary and ROI values are `f64` (§6.4)
//! 2. All randomness is seeded from the simulation id (§4.6)
//! 3. A trailing window's ROI is always derived by compounding Daily ROI
//!    rows, never recomputed independently (I3)

pub mod advance;
pub mod error;
pub mod kpi;
pub mod models;
pub mod orchestrator;
pub mod ranking;
pub mod redistribute;
pub mod rng;
pub mod roi;
pub mod rotation;
pub mod snapshot_writer;
pub mod store;
pub mod time;

pub use error::{CoreError, CoreResult};
pub use models::{
    AgentSnapshotStats, AgentState, ClientAccount, DailyRoi, DailySnapshot, EodBalance, Movement,
    RankChangeEntry, RotationLogEntry, RotationReason, SimulationConfig, SimulationRecord,
    SimulationStatus, TopNEntry, WindowRoi,
};
pub use orchestrator::Orchestrator;
pub use ranking::{CompositeStrategy, RankingStrategy, RoiStrategy, SharpeRatioStrategy, TotalPnlStrategy, WinRateStrategy};
pub use rng::CasterlyRng;
pub use store::{InMemoryMarketStore, MarketDataStore};
pub use time::CalendarClock;
