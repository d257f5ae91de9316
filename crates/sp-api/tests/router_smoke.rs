use axum::{body::Body, http::Request, http::StatusCode};
use tower::ServiceExt;

#[tokio::test]
async fn livez_healthy_and_pairing_requires_auth() {
    let state = sp_api::test_state("test-key");
    let app = sp_api::create_router(state);

    let livez_response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/livez")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(livez_response.status(), StatusCode::OK);
    assert!(livez_response.headers().contains_key("x-request-id"));

    let unauthorized = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/pairing/config")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);

    let wrong_key = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/recommendations")
                .header("x-api-key", "nope")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(wrong_key.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn pairing_config_is_served_to_admins() {
    let state = sp_api::test_state("test-key");
    let expected = state.pairing.fingerprint();
    let app = sp_api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/pairing/config")
                .header("x-api-key", "test-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["config_version"], expected);
    assert_eq!(json["availability_target_slots"], 5);
    assert!((json["weights"]["concern_match"].as_f64().unwrap() - 0.30).abs() < 1e-9);
}
