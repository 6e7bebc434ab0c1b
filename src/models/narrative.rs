use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Desired density of an itinerary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelPace {
    Relaxed,
    #[default]
    Moderate,
    Packed,
}

impl TravelPace {
    /// Activities scheduled per day when no model is available
    pub fn activities_per_day(&self) -> usize {
        match self {
            TravelPace::Relaxed => 2,
            TravelPace::Moderate => 3,
            TravelPace::Packed => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TravelPace::Relaxed => "Relaxed",
            TravelPace::Moderate => "Moderate",
            TravelPace::Packed => "Packed",
        }
    }
}

/// A liked card to be placed on the itinerary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryItem {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryRequest {
    pub liked_items: Vec<ItineraryItem>,
    pub duration_days: u32,
    #[serde(default)]
    pub travel_pace: TravelPace,
    #[serde(default)]
    pub base_location: Option<String>,
    #[serde(default)]
    pub origin_location: Option<String>,
}

/// Photo description produced by an upstream vision step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhotoMetadata {
    pub photo_id: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quality_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryReelRequest {
    #[serde(default)]
    pub itinerary: Value,
    pub photos: Vec<PhotoMetadata>,
    #[serde(default = "default_reel_style")]
    pub reel_style: String,
}

fn default_reel_style() -> String {
    "Upbeat and Fun".to_string()
}

/// How a narrative document was produced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeSource {
    /// Structured JSON returned by the model
    Model,
    /// Free text returned by the model, parsed line by line
    Text,
    /// Built locally without the model
    Heuristic,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NarrativeDocument {
    pub source: NarrativeSource,
    pub document: Value,
}
