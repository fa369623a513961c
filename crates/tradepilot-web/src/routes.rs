use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use tradepilot_core::{AssetSymbol, UtcDateTime};
use tradepilot_strategies::{
    DcaConfig, PerformanceSummary, PurchaseRecord, Signal, SignalConfig, StrategyError,
};

use crate::error::ApiError;
use crate::state::{AppState, DcaAgent, MarketMakingAgent};

type SharedState = Arc<AppState>;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/prices/:asset", get(spot_price))
        .route("/predictions/:asset", get(prediction))
        .route("/agents/dca", post(create_dca).get(list_dca))
        .route("/agents/dca/:id/invest", post(invest))
        .route("/agents/dca/:id/purchases", get(purchases))
        .route("/agents/dca/:id/performance", get(performance))
        .route("/agents/dca/:id/schedule", delete(cancel_schedule))
        .route("/agents/market-making", post(create_market_maker))
        .route(
            "/agents/market-making/:id/recommendation",
            get(recommendation),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(Debug, Deserialize)]
pub struct CreateDcaRequest {
    pub asset_symbol: String,
    pub fiat_amount_per_purchase: f64,
    pub frequency_label: String,
    #[serde(default)]
    pub auto_invest: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvestRequest {
    pub occurred_at: Option<UtcDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMarketMakerRequest {
    pub asset_symbol: String,
    pub buy_threshold_ratio: f64,
    pub sell_threshold_ratio: f64,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    /// Defaults to the agent's configured asset.
    pub asset: Option<String>,
}

#[derive(Debug, Serialize)]
struct PriceView {
    asset: AssetSymbol,
    price: f64,
    as_of: UtcDateTime,
}

#[derive(Debug, Serialize)]
struct PredictionView {
    asset: AssetSymbol,
    predicted_price: f64,
    as_of: UtcDateTime,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn spot_price(
    State(state): State<SharedState>,
    Path(asset): Path<String>,
) -> Result<Json<PriceView>, ApiError> {
    let asset = path_asset(&asset)?;
    let price = state.oracle().spot_price(&asset).await?;
    Ok(Json(PriceView {
        asset,
        price,
        as_of: UtcDateTime::now(),
    }))
}

async fn prediction(
    State(state): State<SharedState>,
    Path(asset): Path<String>,
) -> Result<Json<PredictionView>, ApiError> {
    let asset = path_asset(&asset)?;
    let predicted_price = state.predictor().forecast(&asset).await?;
    Ok(Json(PredictionView {
        asset,
        predicted_price,
        as_of: UtcDateTime::now(),
    }))
}

async fn create_dca(
    State(state): State<SharedState>,
    payload: Result<Json<CreateDcaRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let asset = AssetSymbol::parse(&request.asset_symbol).map_err(StrategyError::from)?;
    let config = DcaConfig::new(
        asset,
        request.fiat_amount_per_purchase,
        request.frequency_label,
    )?;

    let agent = state.register_dca(config, request.auto_invest).await;
    Ok((StatusCode::CREATED, Json(state.dca_view(&agent))).into_response())
}

async fn list_dca(State(state): State<SharedState>) -> Response {
    let agents = state.dca_agents().await;
    let views: Vec<_> = agents.iter().map(|agent| state.dca_view(agent)).collect();
    Json(views).into_response()
}

async fn invest(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<PurchaseRecord>, ApiError> {
    let agent = dca_agent(&state, &id).await?;
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        InvestRequest::default()
    } else {
        serde_json::from_slice::<InvestRequest>(&body)
            .map_err(|error| ApiError::BadRequest(format!("invalid invest body: {error}")))?
    };

    let record = agent.ledger.record_purchase(request.occurred_at).await?;
    Ok(Json(record))
}

async fn purchases(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PurchaseRecord>>, ApiError> {
    let agent = dca_agent(&state, &id).await?;
    Ok(Json(agent.ledger.records().await))
}

async fn performance(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<PerformanceSummary>, ApiError> {
    let agent = dca_agent(&state, &id).await?;
    Ok(Json(agent.ledger.summarize().await?))
}

async fn cancel_schedule(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let agent = dca_agent(&state, &id).await?;
    if state.scheduler().cancel(&agent.id.to_string()) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("schedule", id))
    }
}

async fn create_market_maker(
    State(state): State<SharedState>,
    payload: Result<Json<CreateMarketMakerRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let asset = AssetSymbol::parse(&request.asset_symbol).map_err(StrategyError::from)?;
    let config = SignalConfig::new(
        asset,
        request.buy_threshold_ratio,
        request.sell_threshold_ratio,
    )?;

    let agent = state.register_market_maker(config).await;
    Ok((StatusCode::CREATED, Json(agent.view())).into_response())
}

async fn recommendation(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> Result<Json<Signal>, ApiError> {
    let agent = market_maker(&state, &id).await?;
    let Query(query) = query?;
    let asset = match query.asset {
        Some(asset) => AssetSymbol::parse(&asset).map_err(StrategyError::from)?,
        None => agent.generator.config().asset_symbol().clone(),
    };
    Ok(Json(agent.generator.evaluate(&asset).await?))
}

fn path_asset(raw: &str) -> Result<AssetSymbol, ApiError> {
    AssetSymbol::parse(raw).map_err(|error| ApiError::BadRequest(error.to_string()))
}

async fn dca_agent(state: &AppState, id: &str) -> Result<Arc<DcaAgent>, ApiError> {
    let not_found = || ApiError::not_found("dca agent", id);
    let uuid = Uuid::parse_str(id).map_err(|_| not_found())?;
    state.dca_agent(&uuid).await.ok_or_else(not_found)
}

async fn market_maker(state: &AppState, id: &str) -> Result<Arc<MarketMakingAgent>, ApiError> {
    let not_found = || ApiError::not_found("market-making agent", id);
    let uuid = Uuid::parse_str(id).map_err(|_| not_found())?;
    state.market_maker(&uuid).await.ok_or_else(not_found)
}
