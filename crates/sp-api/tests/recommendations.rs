use axum::{body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-api-key", "test-key")
        .header("content-type", "application/json")
        .header("x-request-id", "req-42")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let app = sp_api::create_router(sp_api::test_state("test-key"));
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn batch() -> Value {
    json!({
        "clients": [
            {
                "id": 1,
                "name": "Client A",
                "hulpvragen": ["angst", "depressie"],
                "urgency": "hoog",
                "preferred_language": "nl"
            },
            { "id": 2, "name": "Client B", "concerns": ["trauma"] }
        ],
        "therapists": [
            {
                "id": 11,
                "name": "Trauma specialist",
                "expertise": ["ptss", "trauma"],
                "available_slots": 3,
                "languages": ["nl"],
                "experience_years": 8
            },
            {
                "id": 10,
                "name": "Anxiety specialist",
                "expertise": ["anxiety", "depression"],
                "specializations": ["angst"],
                "available_slots": 5,
                "languages": ["Nederlands", "English"],
                "experience_years": 12,
                "success_rate": 0.9,
                "distance_km": 3.0
            },
            {
                "id": 12,
                "name": "Fully booked",
                "expertise": ["angst", "depressie"],
                "available_slots": 0,
                "languages": ["nl"]
            }
        ]
    })
}

#[tokio::test]
async fn batch_ranks_every_client() {
    let (status, body) = send(post("/api/recommendations", batch())).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["run_id"].as_str().unwrap().len(), 26);
    assert_eq!(body["config_version"].as_str().unwrap().len(), 16);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["client_id"], 1);
    assert_eq!(results[1]["client_id"], 2);

    let first = results[0]["recommendations"].as_array().unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first[0]["therapist_id"], 10);
    let scores: Vec<f64> = first
        .iter()
        .map(|r| r["score"].as_f64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert!(scores.iter().all(|s| (0.0..=100.0).contains(s)));

    let booked = first.iter().find(|r| r["therapist_id"] == 12).unwrap();
    assert_eq!(booked["needs_review"], true);
    assert_eq!(booked["factors"]["availability"], 0.0);

    let second = results[1]["recommendations"].as_array().unwrap();
    assert_eq!(second[0]["therapist_id"], 11);
}

#[tokio::test]
async fn batch_honours_limit_and_client_selection() {
    let mut request = batch();
    request["limit"] = json!(1);
    request["client_ids"] = json!([2]);

    let (status, body) = send(post("/api/recommendations", request)).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["client_id"], 2);
    assert_eq!(results[0]["recommendations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_therapists_are_rejected() {
    let mut request = batch();
    request["therapists"][1]["id"] = json!(11);

    let (status, body) = send(post("/api/recommendations", request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
    assert_eq!(body["request_id"], "req-42");
    assert!(body["message"].as_str().unwrap().contains("11"));
}

#[tokio::test]
async fn zero_weights_are_rejected() {
    let mut request = batch();
    request["weights"] = json!({
        "availability": 0.0,
        "concern_match": 0.0,
        "specialization": 0.0,
        "experience": 0.0,
        "success_rate": 0.0,
        "distance": 0.0,
        "language": 0.0,
        "gender": 0.0
    });

    let (status, _) = send(post("/api/recommendations", request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn single_pair_breakdown() {
    let request = json!({
        "client": { "id": 1, "concerns": ["burn-out"], "preferred_gender": "vrouw" },
        "therapist": {
            "id": 5,
            "expertise": ["burnout"],
            "available_slots": 5,
            "gender": "male"
        }
    });

    let (status, body) = send(post("/api/recommendations/score", request)).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["client_id"], 1);
    assert_eq!(body["therapist_id"], 5);
    assert_eq!(body["breakdown"]["concern_match"], 1.0);
    assert_eq!(body["breakdown"]["gender"], 0.0);
    assert_eq!(body["needs_review"], true);
    assert!(
        body["review_reasons"][0]
            .as_str()
            .unwrap()
            .contains("gender_mismatch")
    );
}

#[tokio::test]
async fn malformed_body_gets_error_envelope() {
    let mut request = batch();
    request["clients"][0]["urgency"] = json!("whenever");

    let (status, body) = send(post("/api/recommendations", request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
    assert_eq!(body["request_id"], "req-42");
    assert!(body["message"].as_str().unwrap().contains("urgency"), "{body}");
}

#[tokio::test]
async fn malformed_pair_body_gets_error_envelope() {
    let request = json!({
        "client": { "id": 1 },
        "therapist": { "id": 2, "available_slots": -3 }
    });

    let (status, body) = send(post("/api/recommendations/score", request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
    assert_eq!(body["request_id"], "req-42");
}

#[tokio::test]
async fn huge_weight_override_is_honoured() {
    let request = json!({
        "client": { "id": 1, "concerns": ["angst"] },
        "therapist": { "id": 2, "expertise": ["anxiety"], "available_slots": 0 },
        "weights": {
            "availability": 1e308,
            "concern_match": 1e308,
            "specialization": 0.15,
            "experience": 0.10,
            "success_rate": 0.10,
            "distance": 0.10,
            "language": 0.05,
            "gender": 0.05
        }
    });

    let (status, body) = send(post("/api/recommendations/score", request)).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let concern = body["applied_weights"]["concern_match"].as_f64().unwrap();
    assert!((concern - 0.5).abs() < 1e-9, "{body}");
    assert!((body["score"].as_f64().unwrap() - 50.0).abs() < 1e-6, "{body}");
}
