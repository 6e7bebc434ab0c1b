/// Capability-keyed task dispatch
///
/// Clients that drive the app as a set of agents send one envelope,
/// `{"capability": ..., "input": ...}`, and get back the capability's own
/// result type. Each capability routes to an independent service or pure
/// function; there is no shared agent state.
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    error::AppResult,
    models::{
        GroupConsensus, GroupConsensusRequest, ItineraryRequest, MemoryReelRequest,
        NarrativeDocument, PerDiemRequest, PerDiemResult, RecommendationRequest,
        RecommendationResponse, SplitRequest, SplitSummary,
    },
    services::{
        budget::{calculate_per_diem, validate_total_budget},
        consensus::build_consensus,
        narrative::NarrativeService,
        ranking::RankingService,
        settlement::split,
    },
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Discovery,
    Itinerary,
    Group,
    Budget,
    Memory,
}

impl Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Discovery => write!(f, "discovery"),
            Capability::Itinerary => write!(f, "itinerary"),
            Capability::Group => write!(f, "group"),
            Capability::Budget => write!(f, "budget"),
            Capability::Memory => write!(f, "memory"),
        }
    }
}

/// Budget work items
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum BudgetTask {
    CalculatePerDiem(PerDiemRequest),
    GetSplitSummary(SplitRequest),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "capability", content = "input", rename_all = "snake_case")]
pub enum AgentTask {
    Discovery(RecommendationRequest),
    Itinerary(ItineraryRequest),
    Group(GroupConsensusRequest),
    Budget(BudgetTask),
    Memory(MemoryReelRequest),
}

impl AgentTask {
    pub fn capability(&self) -> Capability {
        match self {
            AgentTask::Discovery(_) => Capability::Discovery,
            AgentTask::Itinerary(_) => Capability::Itinerary,
            AgentTask::Group(_) => Capability::Group,
            AgentTask::Budget(_) => Capability::Budget,
            AgentTask::Memory(_) => Capability::Memory,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AgentOutcome {
    Recommendations(RecommendationResponse),
    Narrative(NarrativeDocument),
    Consensus(GroupConsensus),
    PerDiem(PerDiemResult),
    Split(SplitSummary),
}

#[derive(Clone)]
pub struct Agents {
    ranking: RankingService,
    narrator: NarrativeService,
}

impl Agents {
    pub fn new(ranking: RankingService, narrator: NarrativeService) -> Self {
        Self { ranking, narrator }
    }

    #[instrument(skip(self, task), fields(capability = %task.capability()))]
    pub async fn execute(&self, task: &AgentTask) -> AppResult<AgentOutcome> {
        let outcome = match task {
            AgentTask::Discovery(request) => {
                AgentOutcome::Recommendations(self.ranking.rank(request).await?)
            }
            AgentTask::Itinerary(request) => {
                AgentOutcome::Narrative(self.narrator.itinerary(request).await?)
            }
            AgentTask::Memory(request) => {
                AgentOutcome::Narrative(self.narrator.memory_reel(request).await?)
            }
            AgentTask::Group(request) => {
                AgentOutcome::Consensus(build_consensus(&request.group_id, &request.member_swipes)?)
            }
            AgentTask::Budget(BudgetTask::CalculatePerDiem(request)) => {
                let total_budget = validate_total_budget(request.total_budget)?;
                AgentOutcome::PerDiem(calculate_per_diem(
                    total_budget,
                    &request.pre_booked_costs,
                    request.duration_days,
                )?)
            }
            AgentTask::Budget(BudgetTask::GetSplitSummary(request)) => {
                AgentOutcome::Split(split(&request.expenses))
            }
        };

        tracing::debug!("Agent task completed");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::error::AppError;
    use crate::services::budget::BudgetError;
    use crate::services::generative::DisabledModel;

    fn agents() -> Agents {
        let model = Arc::new(DisabledModel);
        Agents::new(
            RankingService::new(model.clone(), None, 60),
            NarrativeService::new(model, None, 60),
        )
    }

    fn task(value: serde_json::Value) -> AgentTask {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_envelope_deserializes_by_capability() {
        let parsed = task(json!({
            "capability": "budget",
            "input": {"task": "get_split_summary", "expenses": []}
        }));
        assert_eq!(parsed.capability(), Capability::Budget);
        assert!(matches!(
            parsed,
            AgentTask::Budget(BudgetTask::GetSplitSummary(_))
        ));
    }

    #[test]
    fn test_unknown_capability_is_rejected() {
        let parsed: Result<AgentTask, _> =
            serde_json::from_value(json!({"capability": "weather", "input": {}}));
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn test_budget_per_diem_dispatch() {
        let outcome = agents()
            .execute(&task(json!({
                "capability": "budget",
                "input": {
                    "task": "calculate_per_diem",
                    "total_budget": 10000,
                    "pre_booked_costs": [{"name": "Train", "amount": 4000}],
                    "duration_days": 3
                }
            })))
            .await
            .unwrap();

        match outcome {
            AgentOutcome::PerDiem(result) => assert_eq!(result.per_diem_estimate, dec!(2000)),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_budget_errors_are_structured() {
        let result = agents()
            .execute(&task(json!({
                "capability": "budget",
                "input": {"task": "calculate_per_diem", "total_budget": 100, "duration_days": 0}
            })))
            .await;
        assert!(matches!(
            result,
            Err(AppError::Budget(BudgetError::InvalidDuration { duration_days: 0 }))
        ));
    }

    #[tokio::test]
    async fn test_group_dispatch() {
        let outcome = agents()
            .execute(&task(json!({
                "capability": "group",
                "input": {
                    "group_id": "trip-7",
                    "member_swipes": {
                        "asha": [{"item_id": "goa", "liked": true}],
                        "ravi": [{"item_id": "goa", "liked": true}]
                    }
                }
            })))
            .await
            .unwrap();

        match outcome {
            AgentOutcome::Consensus(consensus) => {
                assert_eq!(consensus.final_selections, vec!["goa"]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_memory_without_model_is_an_error() {
        let result = agents()
            .execute(&task(json!({
                "capability": "memory",
                "input": {"photos": [{"photo_id": "img1.jpg"}]}
            })))
            .await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }
}
