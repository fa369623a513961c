//! End-to-end journeys through the HTTP router with scripted collaborators.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tradepilot_web::{build_router, AppState, Collaborators};
use tradepilot_tests::{Arc, FixedPredictor, ScriptedOracle};

fn router(oracle: Arc<ScriptedOracle>, predictor: Arc<FixedPredictor>) -> Router {
    let state = AppState::new(Collaborators { oracle, predictor });
    build_router(Arc::new(state))
}

async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let body = body.map_or_else(Body::empty, |body| Body::from(body.to_string()));
    let response = router
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("router is infallible");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn investor_tracks_a_losing_position() {
    // Given: prices of 50 and 25 for the two purchases, then 30 at valuation
    let oracle = Arc::new(ScriptedOracle::prices(&[50.0, 25.0, 30.0]));
    let router = router(oracle.clone(), Arc::new(FixedPredictor::new(30.0)));

    let (status, agent) = call(
        &router,
        "POST",
        "/agents/dca",
        Some(json!({
            "asset_symbol": "bitcoin",
            "fiat_amount_per_purchase": 100.0,
            "frequency_label": "monthly"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = agent["id"].as_str().expect("agent id").to_owned();

    // When: two purchases are made and performance is requested
    for _ in 0..2 {
        let (status, _) = call(&router, "POST", &format!("/agents/dca/{id}/invest"), None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, summary) =
        call(&router, "GET", &format!("/agents/dca/{id}/performance"), None).await;

    // Then: 6 units cost 200 and are worth 180
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["status"], "AT_LOSS");
    assert_eq!(summary["total_units"], 6.0);
    assert_eq!(summary["current_value"], 180.0);
    assert_eq!(summary["unrealized_pl"], -20.0);
    assert_eq!(oracle.calls(), 3);
}

#[tokio::test]
async fn empty_agent_performance_skips_the_oracle() {
    let oracle = Arc::new(ScriptedOracle::prices(&[50.0]));
    let router = router(oracle.clone(), Arc::new(FixedPredictor::new(50.0)));

    let (_, agent) = call(
        &router,
        "POST",
        "/agents/dca",
        Some(json!({
            "asset_symbol": "ethereum",
            "fiat_amount_per_purchase": 10.0,
            "frequency_label": "daily"
        })),
    )
    .await;
    let id = agent["id"].as_str().expect("agent id").to_owned();

    let (status, summary) =
        call(&router, "GET", &format!("/agents/dca/{id}/performance"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["status"], "NO_INVESTMENTS");
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn market_maker_turns_forecast_into_sell_signal() {
    // Given: spot 100 and a forecast of 105 with a 3% sell threshold
    let oracle = Arc::new(ScriptedOracle::prices(&[100.0]));
    let router = router(oracle, Arc::new(FixedPredictor::new(105.0)));

    let (status, agent) = call(
        &router,
        "POST",
        "/agents/market-making",
        Some(json!({
            "asset_symbol": "bitcoin",
            "buy_threshold_ratio": 0.02,
            "sell_threshold_ratio": 0.03
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(agent["sell_threshold_ratio"], 0.03);
    let id = agent["id"].as_str().expect("agent id").to_owned();

    // When: a recommendation is requested
    let (status, signal) = call(
        &router,
        "GET",
        &format!("/agents/market-making/{id}/recommendation"),
        None,
    )
    .await;

    // Then: the router returns the SELL signal
    assert_eq!(status, StatusCode::OK);
    assert_eq!(signal["action"], "SELL");
    assert_eq!(signal["predicted_price"], 105.0);
}

#[tokio::test]
async fn invalid_asset_symbol_is_rejected_as_configuration_error() {
    let router = router(
        Arc::new(ScriptedOracle::prices(&[1.0])),
        Arc::new(FixedPredictor::new(1.0)),
    );

    let (status, body) = call(
        &router,
        "POST",
        "/agents/market-making",
        Some(json!({
            "asset_symbol": "9lives",
            "buy_threshold_ratio": 0.02,
            "sell_threshold_ratio": 0.03
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "strategy.invalid_configuration");
    assert!(body["error"]["message"].as_str().is_some_and(|m| !m.is_empty()));
}
