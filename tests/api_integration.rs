//! Integration tests for the HTTP API
//!
//! Tests health, scoring, physics and oracle endpoints through the router.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use sovereign_core::core::{create_router, AppState, BeatBudgetPolicy, JudgeProvider};
use sovereign_core::types::{EmotionPhysicsTable, SovereignConfig};

fn create_test_router() -> axum::Router {
    let config = Arc::new(SovereignConfig::default());
    let physics = Arc::new(EmotionPhysicsTable::canonical());
    let judge = JudgeProvider::calc(
        Arc::clone(&config),
        Arc::clone(&physics),
        Arc::new(BeatBudgetPolicy::default()),
    );
    create_router(Arc::new(AppState::new(config, physics, judge)))
}

fn packet_json() -> Value {
    let quartile = |label: &str| {
        json!({
            "target": { (label): 1.0 },
            "valence": -0.5,
            "arousal": 0.6,
            "dominant": label,
        })
    };
    json!({
        "packet_id": "pkt-api",
        "scene_id": "scene-4",
        "language": "en",
        "intent": {
            "scene_goal": "The keeper does not answer",
            "conflict_type": "internal",
            "pov": "third",
            "tense": "past"
        },
        "emotion_curve": [quartile("anticipation"), quartile("fear"), quartile("fear"), quartile("sadness")],
        "beats": [
            { "beat_id": "b1", "kind": "action", "intensity": 0.6, "polarity": "rising" },
            { "beat_id": "b2", "kind": "revelation", "intensity": 0.9, "paragraph": 1 }
        ],
        "style": { "signature_words": ["lantern"] },
        "seed": "42"
    })
}

const PROSE: &str = "She climbed the stairs with the lantern, hoping.\n\n\
                     The door was locked. Fear came up her throat.\n\n\
                     She sat on the cold stone and wept.";

async fn post(uri: &str, body: Value) -> (StatusCode, Value) {
    let response = create_test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], sovereign_core::VERSION);
    assert_eq!(json["emotions"], 14);
}

#[tokio::test]
async fn test_score_endpoint() {
    let (status, json) = post("/score", json!({ "packet": packet_json(), "prose": PROSE })).await;

    assert_eq!(status, StatusCode::OK);
    let composite = json["composite"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&composite));
    assert!(json["verdict"] == "SEAL" || json["verdict"] == "REJECT");
    assert_eq!(json["content_hash"].as_str().unwrap().len(), 64);
    assert!(json["axes"]["emotion_coherence"]["score"].is_number());
}

#[tokio::test]
async fn test_score_is_stable_across_requests() {
    let body = json!({ "packet": packet_json(), "prose": PROSE });
    let (_, a) = post("/score", body.clone()).await;
    let (_, b) = post("/score", body).await;
    assert_eq!(a["content_hash"], b["content_hash"]);
}

#[tokio::test]
async fn test_physics_endpoint() {
    let (status, json) = post("/physics", json!({ "packet": packet_json(), "prose": PROSE })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["paragraph_count"], 3);
    assert_eq!(json["transitions"].as_array().unwrap().len(), 2);
    assert_eq!(json["transitions"][0]["beat_id"], "b2");
    let compliance = json["overall_compliance"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&compliance));
}

#[tokio::test]
async fn test_physics_empty_prose_is_vacuous() {
    let (status, json) = post("/physics", json!({ "packet": packet_json(), "prose": "" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["paragraph_count"], 0);
    assert_eq!(json["overall_compliance"], 1.0);
}

#[tokio::test]
async fn test_oracle_endpoint() {
    let (status, json) = post("/oracle", json!({ "packet": packet_json(), "prose": PROSE })).await;

    assert_eq!(status, StatusCode::OK);
    let candidates = json["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 3);
    let index = json["selection"]["selected_index"].as_u64().unwrap() as usize;
    assert!(index < 3);
    assert_eq!(json["selection"]["scores"].as_array().unwrap().len(), 3);
    assert_eq!(json["delta"]["axes"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn test_missing_physics_label_is_bad_request() {
    let mut packet = packet_json();
    packet["emotion_curve"][0]["dominant"] = json!("nostalgia");

    let (status, json) = post("/score", json!({ "packet": packet, "prose": PROSE })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("nostalgia"));
}

#[tokio::test]
async fn test_wrong_quartile_count_is_bad_request() {
    let mut packet = packet_json();
    packet["emotion_curve"].as_array_mut().unwrap().pop();

    let (status, json) = post("/physics", json!({ "packet": packet, "prose": PROSE })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let (status, _) = post("/score", json!({ "prose": PROSE })).await;
    assert!(status.is_client_error());
}
