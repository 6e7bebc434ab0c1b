use crate::models::{RankedContent, TravelContent, UserProfile};

pub const HEURISTIC_EXPLANATION: &str = "Recommended based on popularity and rating";

const BUDGET_WEIGHT: f64 = 0.5;
const RATING_WEIGHT: f64 = 0.3;
const POPULARITY_WEIGHT: f64 = 0.2;

/// Deterministic relevance score in `[0, 1]`.
///
/// Budget fit only counts when the price range overlaps the traveller's
/// budget; the rest comes from rating (out of 5) and popularity (out of 100).
pub fn heuristic_score(profile: &UserProfile, content: &TravelContent) -> f64 {
    let mut score: f64 = 0.0;

    let overlaps_budget =
        content.price_min <= profile.budget_max && content.price_max >= profile.budget_min;
    if overlaps_budget && profile.budget_max > 0.0 {
        let budget_fit = 1.0 - (content.price_min - profile.budget_min).abs() / profile.budget_max;
        score += budget_fit * BUDGET_WEIGHT;
    }

    score += (content.rating / 5.0) * RATING_WEIGHT;
    score += (content.popularity_score / 100.0) * POPULARITY_WEIGHT;

    score.clamp(0.0, 1.0)
}

/// Scores the whole pool and keeps the best `batch_size` entries.
/// Equal scores keep content id order.
pub fn rank_by_heuristic(
    profile: &UserProfile,
    pool: &[&TravelContent],
    batch_size: usize,
) -> Vec<RankedContent> {
    let mut ranked: Vec<RankedContent> = pool
        .iter()
        .map(|content| RankedContent {
            content: (*content).clone(),
            relevance_score: heuristic_score(profile, content),
            explanation: HEURISTIC_EXPLANATION.to_string(),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.relevance_score
            .total_cmp(&a.relevance_score)
            .then_with(|| a.content.content_id.cmp(&b.content.content_id))
    });
    ranked.truncate(batch_size);
    ranked
}
