pub mod agents;
pub mod budget;
pub mod consensus;
pub mod generative;
pub mod heuristic;
pub mod money;
pub mod narrative;
pub mod ranking;
pub mod settlement;

pub use agents::{AgentOutcome, AgentTask, Agents};
pub use budget::{calculate_per_diem, validate_total_budget, BudgetError};
pub use consensus::{build_consensus, ConsensusError};
pub use narrative::NarrativeService;
pub use ranking::RankingService;
pub use settlement::split;
