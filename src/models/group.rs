use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A member's swipe on a candidate item during a group session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberSwipe {
    pub item_id: String,
    pub liked: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl MemberSwipe {
    pub fn new(item_id: &str, liked: bool) -> Self {
        Self {
            item_id: item_id.to_string(),
            liked,
            name: None,
            category: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConsensusRequest {
    pub group_id: String,
    /// Member id -> that member's swipes
    pub member_swipes: BTreeMap<String, Vec<MemberSwipe>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsensusItem {
    pub item_id: String,
    pub name: String,
    pub category: Option<String>,
    pub likes: usize,
    pub approval_score_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupConsensus {
    pub group_id: String,
    pub total_members: usize,
    pub top_items: Vec<ConsensusItem>,
    /// Items every member liked
    pub final_selections: Vec<String>,
    /// Items with both likes and dislikes
    pub conflict_items: Vec<String>,
    pub consensus_reached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
