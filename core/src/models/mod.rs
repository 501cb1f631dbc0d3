//! Domain model for the Casterly Rock rotation simulation (§3).

pub mod account;
pub mod agent_state;
pub mod movement;
pub mod rank_change;
pub mod rotation_log;
pub mod simulation;
pub mod snapshot;
pub mod topn;

pub use account::ClientAccount;
pub use agent_state::AgentState;
pub use movement::{DailyRoi, EodBalance, Movement, WindowRoi};
pub use rank_change::RankChangeEntry;
pub use rotation_log::{RotationLogEntry, RotationReason};
pub use simulation::{SimulationConfig, SimulationRecord, SimulationStatus};
pub use snapshot::{AgentSnapshotStats, DailySnapshot};
pub use topn::TopNEntry;
