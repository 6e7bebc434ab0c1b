use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::{
    cached,
    db::{fingerprint, Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        ItineraryItem, ItineraryRequest, MemoryReelRequest, NarrativeDocument, NarrativeSource,
        TravelPace,
    },
    services::generative::{parse_model_json, GenerationRequest, GenerativeModel},
};

const ITINERARY_TEMPERATURE: f32 = 0.7;
const REEL_TEMPERATURE: f32 = 0.9;

/// Generates itineraries and memory reel storyboards
#[derive(Clone)]
pub struct NarrativeService {
    model: Arc<dyn GenerativeModel>,
    cache: Option<Cache>,
    cache_ttl: u64,
}

impl NarrativeService {
    pub fn new(model: Arc<dyn GenerativeModel>, cache: Option<Cache>, cache_ttl: u64) -> Self {
        Self {
            model,
            cache,
            cache_ttl,
        }
    }

    /// Builds a day-by-day plan from liked items.
    ///
    /// A JSON reply is returned as-is. A free-text reply is parsed by its
    /// `Day N` headers. When the model is unreachable, or its text holds no
    /// days, the plan is laid out locally from the items and the pace.
    #[instrument(skip(self, request), fields(items = request.liked_items.len(), days = request.duration_days))]
    pub async fn itinerary(&self, request: &ItineraryRequest) -> AppResult<NarrativeDocument> {
        if request.liked_items.is_empty() {
            return Err(AppError::InvalidInput(
                "No liked items provided to create an itinerary.".to_string(),
            ));
        }
        if request.duration_days == 0 {
            return Err(AppError::InvalidInput(
                "duration_days must be at least 1".to_string(),
            ));
        }

        let generated = self
            .with_cache("itinerary", request, self.request_itinerary(request))
            .await;

        match generated {
            Ok(document) => Ok(document),
            Err(e) => {
                tracing::warn!(
                    model = self.model.name(),
                    error = %e,
                    "Itinerary generation failed, laying out locally"
                );
                Ok(NarrativeDocument {
                    source: NarrativeSource::Heuristic,
                    document: plan_itinerary(request),
                })
            }
        }
    }

    async fn request_itinerary(&self, request: &ItineraryRequest) -> AppResult<NarrativeDocument> {
        let raw = self
            .model
            .generate(GenerationRequest::json(
                build_itinerary_prompt(request),
                ITINERARY_TEMPERATURE,
            ))
            .await?;

        match parse_model_json::<Value>(&raw) {
            Ok(document) if document.is_object() => Ok(NarrativeDocument {
                source: NarrativeSource::Model,
                document,
            }),
            _ => {
                tracing::debug!("Itinerary reply is not a JSON object, parsing as text");
                let document = parse_text_itinerary(&raw).ok_or_else(|| {
                    AppError::Generation("Itinerary reply contained no days".to_string())
                })?;
                Ok(NarrativeDocument {
                    source: NarrativeSource::Text,
                    document,
                })
            }
        }
    }

    /// Produces a memory reel storyboard. There is no local fallback: a
    /// model failure is returned to the caller.
    #[instrument(skip(self, request), fields(photos = request.photos.len(), style = %request.reel_style))]
    pub async fn memory_reel(&self, request: &MemoryReelRequest) -> AppResult<NarrativeDocument> {
        if request.photos.is_empty() {
            return Err(AppError::InvalidInput(
                "No photos provided to create a memory reel.".to_string(),
            ));
        }

        self.with_cache("memory_reel", request, self.request_memory_reel(request))
            .await
    }

    async fn request_memory_reel(&self, request: &MemoryReelRequest) -> AppResult<NarrativeDocument> {
        let raw = self
            .model
            .generate(GenerationRequest::json(
                build_reel_prompt(request)?,
                REEL_TEMPERATURE,
            ))
            .await?;

        let mut document: Value = parse_model_json(&raw)?;
        let dropped = dedupe_storyboard(&mut document);
        if dropped > 0 {
            tracing::info!(dropped, "Removed storyboard scenes reusing a photo");
        }

        Ok(NarrativeDocument {
            source: NarrativeSource::Model,
            document,
        })
    }

    async fn with_cache<F>(
        &self,
        kind: &'static str,
        request: &impl Serialize,
        generate: F,
    ) -> AppResult<NarrativeDocument>
    where
        F: Future<Output = AppResult<NarrativeDocument>>,
    {
        let Some(cache) = &self.cache else {
            return generate.await;
        };
        let key = CacheKey::Narrative {
            kind,
            fingerprint: fingerprint(request)?,
        };
        cached!(cache, key, self.cache_ttl, generate)
    }
}

fn build_itinerary_prompt(request: &ItineraryRequest) -> String {
    let item_list: Vec<String> = request
        .liked_items
        .iter()
        .map(|item| {
            format!(
                "- Name: {}, Category: {}, Location: {}",
                item.name,
                item.category.as_deref().unwrap_or("N/A"),
                item.location.as_deref().unwrap_or("N/A")
            )
        })
        .collect();

    let pace = request.travel_pace.label();
    format!(
        r#"You are an expert travel planner. Create a logical, efficient and enjoyable itinerary.

Trip details:
- Origin: {origin}
- Base location (hotel): {base}
- Duration: {days} days
- Pace: {pace} (about {per_day} activities per day)

Liked places and activities:
{items}

Use ONLY the items above. Group items that are close together on the same day.
If an origin is given, suggest 2-3 sample flights from it.

Respond with a JSON object with keys "travel_suggestions" (an object with a "flights" list)
and "itinerary" (a list of days, each with "day", "theme" and "schedule"; each schedule
event has "time", "activity" and "description")."#,
        origin = request.origin_location.as_deref().unwrap_or("Not specified"),
        base = request
            .base_location
            .as_deref()
            .unwrap_or("Not specified, assume a central point"),
        days = request.duration_days,
        pace = pace,
        per_day = request.travel_pace.activities_per_day(),
        items = item_list.join("\n"),
    )
}

fn build_reel_prompt(request: &MemoryReelRequest) -> AppResult<String> {
    let photos = serde_json::to_string_pretty(&request.photos)
        .map_err(|e| AppError::Internal(format!("Failed to serialize photos: {}", e)))?;

    Ok(format!(
        r#"You are a creative video editor. Create a storyboard for a short memory reel of a trip.

Trip itinerary:
{itinerary:#}

Available photos with descriptions and quality scores:
{photos}

Reel style: {style}

Pick 5-8 unique photos, preferring high quality_score and a variety of locations.
Order them chronologically or thematically and write a short caption for each.

Respond with a JSON object with a "memory_reel" key holding "title", "style",
"music_suggestion" and "storyboard" (a list of scenes with "day", "location",
"photo_id" and "caption"). Every photo_id in the storyboard must be unique."#,
        itinerary = request.itinerary,
        photos = photos,
        style = request.reel_style,
    ))
}

/// Reads a free-text plan: each `Day N` line opens a day, and bullet or
/// `label: text` lines under it become entries
fn parse_text_itinerary(text: &str) -> Option<Value> {
    let mut days: Vec<(String, Vec<String>)> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let header = line.trim_start_matches(['#', '*', ' ']).trim_end_matches('*');
        if header.to_lowercase().starts_with("day ") {
            days.push((header.trim().to_string(), Vec::new()));
        } else if line.starts_with('-') || line.contains('*') || line.contains(':') {
            if let Some((_, entries)) = days.last_mut() {
                entries.push(line.to_string());
            }
        }
    }

    let days: Vec<Value> = days
        .into_iter()
        .filter(|(_, entries)| !entries.is_empty())
        .map(|(day, entries)| json!({ "day": day, "entries": entries }))
        .collect();

    (!days.is_empty()).then(|| json!({ "itinerary": days }))
}

fn time_slots(pace: TravelPace) -> &'static [&'static str] {
    match pace {
        TravelPace::Relaxed => &["Morning", "Afternoon"],
        TravelPace::Moderate => &["Morning", "Afternoon", "Evening"],
        TravelPace::Packed => &["Morning", "Midday", "Afternoon", "Evening"],
    }
}

/// Lays items out day by day, neighbouring locations together, at the
/// pace's activity count. Items past the last day are listed as unscheduled.
fn plan_itinerary(request: &ItineraryRequest) -> Value {
    let mut items: Vec<&ItineraryItem> = request.liked_items.iter().collect();
    items.sort_by(|a, b| {
        (a.location.is_none(), &a.location, &a.name).cmp(&(b.location.is_none(), &b.location, &b.name))
    });

    let slots = time_slots(request.travel_pace);
    let per_day = request.travel_pace.activities_per_day();
    let capacity = per_day * request.duration_days as usize;

    let days: Vec<Value> = items
        .iter()
        .take(capacity)
        .collect::<Vec<_>>()
        .chunks(per_day)
        .enumerate()
        .map(|(index, day_items)| {
            let theme = day_items
                .iter()
                .find_map(|item| item.location.as_deref())
                .map(|location| format!("Exploring {}", location))
                .unwrap_or_else(|| "Free exploration".to_string());

            let schedule: Vec<Value> = day_items
                .iter()
                .zip(slots.iter())
                .map(|(item, time)| {
                    json!({
                        "time": time,
                        "activity": item.name,
                        "description": describe(item),
                    })
                })
                .collect();

            json!({ "day": index + 1, "theme": theme, "schedule": schedule })
        })
        .collect();

    let unscheduled: Vec<&str> = items
        .iter()
        .skip(capacity)
        .map(|item| item.name.as_str())
        .collect();

    json!({
        "travel_suggestions": { "flights": [] },
        "itinerary": days,
        "unscheduled": unscheduled,
    })
}

fn describe(item: &ItineraryItem) -> String {
    match (item.category.as_deref(), item.location.as_deref()) {
        (Some(category), Some(location)) => format!("{} in {}", category, location),
        (Some(category), None) => category.to_string(),
        (None, Some(location)) => format!("Visit in {}", location),
        (None, None) => "Free time".to_string(),
    }
}

/// Drops storyboard scenes whose `photo_id` already appeared. Returns the
/// number of scenes removed.
fn dedupe_storyboard(document: &mut Value) -> usize {
    let path = if document.pointer("/memory_reel/storyboard").is_some() {
        "/memory_reel/storyboard"
    } else {
        "/storyboard"
    };
    let Some(scenes) = document.pointer_mut(path).and_then(Value::as_array_mut) else {
        return 0;
    };

    let before = scenes.len();
    let mut seen = HashSet::new();
    scenes.retain(|scene| match scene.get("photo_id").and_then(Value::as_str) {
        Some(photo_id) => seen.insert(photo_id.to_string()),
        None => true,
    });
    before - scenes.len()
}
