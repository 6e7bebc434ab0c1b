pub mod budget;
pub mod content;
pub mod expense;
pub mod group;
pub mod narrative;

pub use budget::{PerDiemRequest, PerDiemResult, PreBookedCost};
pub use content::{
    ContentType, ModelRanking, RankedContent, RankingSource, RecommendationRequest, RecommendationResponse,
    SwipeAction, SwipeInteraction, TravelContent, TravelMode, TravelScope, UserProfile,
};
pub use expense::{Expense, SettlementTransaction, SplitRequest, SplitSummary};
pub use group::{ConsensusItem, GroupConsensus, GroupConsensusRequest, MemberSwipe};
pub use narrative::{
    ItineraryItem, ItineraryRequest, MemoryReelRequest, NarrativeDocument, NarrativeSource,
    PhotoMetadata, TravelPace,
};
