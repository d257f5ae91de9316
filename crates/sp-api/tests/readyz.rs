use axum::{body::Body, http::Request, http::StatusCode};
use std::sync::atomic::Ordering;
use tower::ServiceExt;

async fn get_status(app: axum::Router, uri: &str) -> StatusCode {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn readyz_returns_ok_while_serving() {
    let app = sp_api::create_router(sp_api::test_state("test-key"));

    assert_eq!(get_status(app.clone(), "/readyz").await, StatusCode::OK);
    assert_eq!(get_status(app, "/health").await, StatusCode::OK);
}

#[tokio::test]
async fn readyz_returns_service_unavailable_when_not_ready() {
    let state = sp_api::test_state("test-key");
    state.readiness.store(false, Ordering::SeqCst);
    let app = sp_api::create_router(state);

    assert_eq!(
        get_status(app, "/readyz").await,
        StatusCode::SERVICE_UNAVAILABLE
    );
}
