use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Kind of swipeable card
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Destination,
    Accommodation,
    Activity,
    Transportation,
}

impl Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Destination => write!(f, "destination"),
            ContentType::Accommodation => write!(f, "accommodation"),
            ContentType::Activity => write!(f, "activity"),
            ContentType::Transportation => write!(f, "transportation"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Pleasure,
    Business,
    Family,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelScope {
    #[default]
    India,
    International,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Dislike,
}

/// A travel card (destination, hotel, activity, ...) supplied by the content store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TravelContent {
    pub content_id: String,
    pub content_type: ContentType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price_min: f64,
    #[serde(default)]
    pub price_max: f64,
    /// 0.0 - 5.0
    #[serde(default)]
    pub rating: f64,
    /// 0.0 - 100.0
    #[serde(default)]
    pub popularity_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Traveller preferences used for ranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub budget_min: f64,
    #[serde(default)]
    pub budget_max: f64,
    #[serde(default = "default_group_size")]
    pub group_size: u32,
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,
    #[serde(default)]
    pub travel_mode: TravelMode,
    #[serde(default)]
    pub travel_scope: TravelScope,
}

fn default_group_size() -> u32 {
    1
}

fn default_duration_days() -> u32 {
    7
}

/// One past swipe on a card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwipeInteraction {
    pub content_id: String,
    pub action: SwipeAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Request to rank a pool of cards for one traveller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub user_profile: UserProfile,
    #[serde(default)]
    pub previous_swipes: Vec<SwipeInteraction>,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub exclude_content_ids: Vec<String>,
    pub available_content: Vec<TravelContent>,
    #[serde(default)]
    pub session_id: Option<String>,
}

fn default_batch_size() -> usize {
    20
}

/// Which ranking tier produced a response
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RankingSource {
    Model,
    Heuristic,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedContent {
    pub content: TravelContent,
    /// 0.0 - 1.0
    pub relevance_score: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub items: Vec<RankedContent>,
    pub total_available: usize,
    pub source: RankingSource,
    pub session_id: String,
    pub generated_at: DateTime<Utc>,
}

// ============================================================================
// Generative model wire types
// ============================================================================

/// One entry of the ranking array the model is asked to return
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelRanking {
    pub id: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub reason: Option<String>,
}
