use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    cached,
    db::{fingerprint, Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        ModelRanking, RankedContent, RankingSource, RecommendationRequest, RecommendationResponse,
        SwipeAction, TravelContent,
    },
    services::{
        generative::{parse_model_json, GenerationRequest, GenerativeModel},
        heuristic::rank_by_heuristic,
    },
};

pub const MAX_BATCH_SIZE: usize = 50;
/// Number of cards shown to the model per request
const MODEL_POOL_LIMIT: usize = 30;
const DESCRIPTION_LIMIT: usize = 200;
const RANKING_TEMPERATURE: f32 = 0.1;
const DEFAULT_MODEL_EXPLANATION: &str = "Matches your travel profile";

/// Two-tier recommendation ranking.
///
/// The generative model ranks the pool first. Any failure on that path
/// (transport, timeout, malformed output, no recognizable ids, cache errors)
/// drops to the deterministic heuristic, and the response says which tier
/// answered.
#[derive(Clone)]
pub struct RankingService {
    model: Arc<dyn GenerativeModel>,
    cache: Option<Cache>,
    cache_ttl: u64,
}

impl RankingService {
    pub fn new(model: Arc<dyn GenerativeModel>, cache: Option<Cache>, cache_ttl: u64) -> Self {
        Self {
            model,
            cache,
            cache_ttl,
        }
    }

    #[instrument(skip(self, request), fields(user_id = %request.user_profile.user_id))]
    pub async fn rank(&self, request: &RecommendationRequest) -> AppResult<RecommendationResponse> {
        if request.batch_size == 0 || request.batch_size > MAX_BATCH_SIZE {
            return Err(AppError::InvalidInput(format!(
                "batch_size must be between 1 and {} (got {})",
                MAX_BATCH_SIZE, request.batch_size
            )));
        }

        let pool = candidate_pool(request);
        let session_id = request
            .session_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let (items, source) = if pool.is_empty() {
            (Vec::new(), RankingSource::Heuristic)
        } else {
            match self.rank_with_model(request, &pool).await {
                Ok(items) => (items, RankingSource::Model),
                Err(e) => {
                    tracing::warn!(
                        model = self.model.name(),
                        error = %e,
                        "Model ranking failed, using heuristic ranking"
                    );
                    (
                        rank_by_heuristic(&request.user_profile, &pool, request.batch_size),
                        RankingSource::Heuristic,
                    )
                }
            }
        };

        tracing::info!(
            pool_size = pool.len(),
            returned = items.len(),
            source = ?source,
            "Recommendations ranked"
        );

        Ok(RecommendationResponse {
            items,
            total_available: pool.len(),
            source,
            session_id,
            generated_at: Utc::now(),
        })
    }

    async fn rank_with_model(
        &self,
        request: &RecommendationRequest,
        pool: &[&TravelContent],
    ) -> AppResult<Vec<RankedContent>> {
        let prompt = build_ranking_prompt(request, pool);

        let rankings = match &self.cache {
            Some(cache) => self.cached_rankings(cache, prompt, pool).await?,
            None => self.request_rankings(prompt, pool).await?,
        };

        let by_id: HashMap<&str, &TravelContent> = pool
            .iter()
            .map(|content| (content.content_id.as_str(), *content))
            .collect();

        let mut ranked: Vec<RankedContent> = rankings
            .into_iter()
            .filter_map(|ranking| {
                let content = by_id.get(ranking.id.as_str())?;
                Some(RankedContent {
                    content: (*content).clone(),
                    relevance_score: ranking.score.clamp(0.0, 1.0),
                    explanation: ranking
                        .reason
                        .filter(|reason| !reason.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_MODEL_EXPLANATION.to_string()),
                })
            })
            .collect();

        ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        ranked.truncate(request.batch_size);
        Ok(ranked)
    }

    async fn cached_rankings(
        &self,
        cache: &Cache,
        prompt: String,
        pool: &[&TravelContent],
    ) -> AppResult<Vec<ModelRanking>> {
        let key = CacheKey::Ranking(fingerprint(&prompt)?);
        cached!(cache, key, self.cache_ttl, self.request_rankings(prompt, pool))
    }

    /// Asks the model for rankings and keeps the entries that name a card
    /// from the pool, first occurrence wins
    async fn request_rankings(
        &self,
        prompt: String,
        pool: &[&TravelContent],
    ) -> AppResult<Vec<ModelRanking>> {
        let raw = self
            .model
            .generate(GenerationRequest::json(prompt, RANKING_TEMPERATURE))
            .await?;
        let rankings: Vec<ModelRanking> = parse_model_json(&raw)?;

        let known: HashSet<&str> = pool.iter().map(|c| c.content_id.as_str()).collect();
        let mut seen = HashSet::new();
        let recognized: Vec<ModelRanking> = rankings
            .into_iter()
            .filter(|r| known.contains(r.id.as_str()) && seen.insert(r.id.clone()))
            .collect();

        if recognized.is_empty() {
            return Err(AppError::Generation(
                "Model ranking named no known content ids".to_string(),
            ));
        }

        Ok(recognized)
    }
}

/// Cards eligible for this request: matching type, not excluded
fn candidate_pool(request: &RecommendationRequest) -> Vec<&TravelContent> {
    let excluded: HashSet<&str> = request
        .exclude_content_ids
        .iter()
        .map(String::as_str)
        .collect();

    request
        .available_content
        .iter()
        .filter(|content| {
            request
                .content_type
                .map_or(true, |wanted| content.content_type == wanted)
        })
        .filter(|content| !excluded.contains(content.content_id.as_str()))
        .collect()
}

fn build_ranking_prompt(request: &RecommendationRequest, pool: &[&TravelContent]) -> String {
    let profile = &request.user_profile;

    let content_data: Vec<Value> = pool
        .iter()
        .take(MODEL_POOL_LIMIT)
        .map(|content| {
            json!({
                "id": content.content_id,
                "type": content.content_type.to_string(),
                "title": content.title,
                "description": content.description.chars().take(DESCRIPTION_LIMIT).collect::<String>(),
                "price_range": format!("₹{}-₹{}", content.price_min, content.price_max),
                "location": content.location,
                "tags": content.tags,
                "rating": content.rating,
                "popularity": content.popularity_score,
            })
        })
        .collect();

    let swipes_of = |action: SwipeAction| {
        request
            .previous_swipes
            .iter()
            .filter(|swipe| swipe.action == action)
            .map(|swipe| swipe.content_id.as_str())
            .collect::<Vec<_>>()
    };

    format!(
        r#"You are an expert travel recommendation system. Rank travel content for this traveller.

USER PROFILE:
- Budget: ₹{budget_min:.0} - ₹{budget_max:.0}
- Group Size: {group_size} people
- Duration: {duration} days
- Travel Mode: {mode}
- Travel Scope: {scope}

PREVIOUSLY LIKED: {liked}
PREVIOUSLY DISLIKED: {disliked}

AVAILABLE CONTENT:
{content:#}

Rank ALL content by relevance considering budget fit first, then swipe history,
travel mode and group size, and content quality.

Return a JSON array: [{{"id": "content_id", "score": 0.95, "reason": "short explanation"}}]
Scores range from 0.0 to 1.0. Return only valid JSON, no additional text."#,
        budget_min = profile.budget_min,
        budget_max = profile.budget_max,
        group_size = profile.group_size,
        duration = profile.duration_days,
        mode = json!(profile.travel_mode),
        scope = json!(profile.travel_scope),
        liked = json!(swipes_of(SwipeAction::Like)),
        disliked = json!(swipes_of(SwipeAction::Dislike)),
        content = Value::Array(content_data),
    )
}
