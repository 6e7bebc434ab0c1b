use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use triplix_api::{
    error::{AppError, AppResult},
    routes::{create_router, AppState},
    services::generative::{GenerationRequest, GenerativeModel},
};

/// Model stand-in that answers every prompt with the same text, or fails
struct StubModel {
    reply: Option<String>,
}

#[async_trait::async_trait]
impl GenerativeModel for StubModel {
    async fn generate(&self, _request: GenerationRequest) -> AppResult<String> {
        self.reply
            .clone()
            .ok_or_else(|| AppError::ExternalApi("stub model offline".to_string()))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn create_test_server(reply: Option<&str>) -> TestServer {
    let model = Arc::new(StubModel {
        reply: reply.map(str::to_string),
    });
    let state = Arc::new(AppState::new(model, None, 60));
    TestServer::new(create_router(state)).unwrap()
}

fn travel_card(id: &str, rating: f64) -> Value {
    json!({
        "content_id": id,
        "content_type": "destination",
        "title": id,
        "description": "Sun, sand and seafood",
        "location": "Goa",
        "tags": ["beach"],
        "price_min": 8000,
        "price_max": 20000,
        "rating": rating,
        "popularity_score": 70
    })
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(None);
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server(None);
    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trip-req-1"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "trip-req-1");

    let response = server.get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_per_diem() {
    let server = create_test_server(None);
    let response = server
        .post("/api/v1/budget/per-diem")
        .json(&json!({
            "total_budget": 50000,
            "pre_booked_costs": [
                {"name": "Flights", "amount": 18000},
                {"name": "Hotel", "amount": "12000.00"},
                {"name": "Unknown"}
            ],
            "duration_days": 4
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["spent_on_bookings"], json!(30000.0));
    assert_eq!(body["remaining_for_trip"], json!(20000.0));
    assert_eq!(body["per_diem_estimate"], json!(5000.0));
}

#[tokio::test]
async fn test_per_diem_overrun() {
    let server = create_test_server(None);
    let response = server
        .post("/api/v1/budget/per-diem")
        .json(&json!({
            "total_budget": 10000,
            "pre_booked_costs": [{"name": "Resort", "amount": 15000}],
            "duration_days": 5
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["remaining_for_trip"], json!(-5000.0));
    assert_eq!(body["per_diem_estimate"], json!(0.0));
}

#[tokio::test]
async fn test_per_diem_rejects_bad_parameters() {
    let server = create_test_server(None);

    let response = server
        .post("/api/v1/budget/per-diem")
        .json(&json!({"total_budget": 1000, "duration_days": 0}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("duration_days"));

    let response = server
        .post("/api/v1/budget/per-diem")
        .json(&json!({"total_budget": -1, "duration_days": 3}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expense_split() {
    let server = create_test_server(None);
    let response = server
        .post("/api/v1/expenses/split")
        .json(&json!({
            "expenses": [
                {"amount": 2000, "payer": "Alice", "participants": ["Alice", "Bob"]},
                {"amount": 1500, "payer_id": "Bob", "participants": ["Alice", "Bob"]},
                {"amount": 0, "payer": "Carol", "participants": ["Carol"]}
            ]
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["balances"]["Alice"], json!(250.0));
    assert_eq!(body["balances"]["Bob"], json!(-250.0));
    assert_eq!(
        body["transactions"],
        json!([{"from": "Bob", "to": "Alice", "amount": 250.0}])
    );
    assert_eq!(body["skipped_expenses"], 1);
}

#[tokio::test]
async fn test_expense_split_empty_batch() {
    let server = create_test_server(None);
    let response = server
        .post("/api/v1/expenses/split")
        .json(&json!({"expenses": []}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "No expenses logged.");
    assert_eq!(body["transactions"], json!([]));
}

#[tokio::test]
async fn test_expense_split_skips_badly_typed_entries() {
    let server = create_test_server(None);
    let response = server
        .post("/api/v1/expenses/split")
        .json(&json!({
            "expenses": [
                {"amount": 2000, "payer": "Alice", "participants": ["Alice", "Bob"]},
                {"amount": 500, "payer": "Bob", "participants": null},
                {"amount": "abc", "payer": "Bob", "participants": ["Alice"]},
                {"amount": 500, "payer": 42, "participants": ["Alice"]},
                {"amount": 500, "payer": "Bob", "participants": "Alice"}
            ]
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["balances"]["Alice"], json!(1000.0));
    assert_eq!(body["balances"]["Bob"], json!(-1000.0));
    assert_eq!(body["skipped_expenses"], 4);
}

#[tokio::test]
async fn test_oversized_amounts_still_get_a_response() {
    let server = create_test_server(None);
    let response = server
        .post("/api/v1/expenses/split")
        .json(&json!({
            "expenses": [
                {"amount": 5e28, "payer": "A", "participants": ["B"]},
                {"amount": 5e28, "payer": "A", "participants": ["B"]}
            ]
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["skipped_expenses"], 1);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);

    let response = server
        .post("/api/v1/budget/per-diem")
        .json(&json!({
            "total_budget": 1000,
            "pre_booked_costs": [
                {"name": "Yacht", "amount": 5e28},
                {"name": "Island", "amount": 5e28}
            ],
            "duration_days": 3
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expense_split_rejects_malformed_body() {
    let server = create_test_server(None);
    let response = server
        .post("/api/v1/expenses/split")
        .json(&json!({"expenses": "not a list"}))
        .expect_failure()
        .await;
    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_group_consensus() {
    let server = create_test_server(None);
    let response = server
        .post("/api/v1/groups/consensus")
        .json(&json!({
            "group_id": "goa-gang",
            "member_swipes": {
                "asha": [{"item_id": "baga", "liked": true}, {"item_id": "fort", "liked": true}],
                "ravi": [{"item_id": "baga", "liked": true}, {"item_id": "fort", "liked": false}]
            }
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["final_selections"], json!(["baga"]));
    assert_eq!(body["conflict_items"], json!(["fort"]));
    assert_eq!(body["consensus_reached"], true);
    assert_eq!(body["top_items"][1]["approval_score_percent"], json!(50.0));
}

#[tokio::test]
async fn test_group_consensus_without_members() {
    let server = create_test_server(None);
    let response = server
        .post("/api/v1/groups/consensus")
        .json(&json!({"group_id": "empty", "member_swipes": {}}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_fall_back_when_model_offline() {
    let server = create_test_server(None);
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "user_profile": {"user_id": "u1", "budget_min": 5000, "budget_max": 50000},
            "available_content": [travel_card("calangute", 3.0), travel_card("palolem", 4.8)],
            "batch_size": 5
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "heuristic");
    assert_eq!(body["total_available"], 2);
    assert_eq!(body["items"][0]["content"]["content_id"], "palolem");
}

#[tokio::test]
async fn test_recommendations_from_model() {
    let server = create_test_server(Some(
        r#"[{"id": "calangute", "score": 0.92, "reason": "Lively beach within budget"}]"#,
    ));
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "user_profile": {"user_id": "u1", "budget_min": 5000, "budget_max": 50000},
            "available_content": [travel_card("calangute", 3.0), travel_card("palolem", 4.8)],
            "session_id": "s-1"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "model");
    assert_eq!(body["session_id"], "s-1");
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["explanation"], "Lively beach within budget");
}

#[tokio::test]
async fn test_itinerary_without_model_is_built_locally() {
    let server = create_test_server(None);
    let response = server
        .post("/api/v1/itineraries")
        .json(&json!({
            "liked_items": [
                {"name": "Baga Beach", "location": "North Goa"},
                {"name": "Dudhsagar Falls", "location": "Mollem"}
            ],
            "duration_days": 2,
            "travel_pace": "relaxed"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "heuristic");
    assert_eq!(body["document"]["itinerary"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_memory_reel_needs_model() {
    let server = create_test_server(None);
    let response = server
        .post("/api/v1/memory-reels")
        .json(&json!({"photos": [{"photo_id": "img1.jpg"}]}))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_agents_budget_dispatch() {
    let server = create_test_server(None);
    let response = server
        .post("/api/v1/agents")
        .json(&json!({
            "capability": "budget",
            "input": {
                "task": "get_split_summary",
                "expenses": [{"amount": 100, "payer": "D", "participants": ["A", "B", "C"]}]
            }
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["balances"]["D"], json!(100.0));
    assert_eq!(body["balances"]["A"], json!(-33.33));
    assert_eq!(body["transactions"].as_array().unwrap().len(), 3);
}
