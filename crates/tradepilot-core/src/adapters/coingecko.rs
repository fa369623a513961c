use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::oracle::{OracleError, OracleFuture, PriceHistory, PriceOracle};
use crate::retry::RetryPolicy;
use crate::throttling::RequestBudget;
use crate::{AssetSymbol, QuoteCurrency};

const UPSTREAM: &str = "coingecko";
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Connection and resilience settings for [`CoinGeckoOracle`].
#[derive(Debug, Clone, PartialEq)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    pub quote: QuoteCurrency,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub cache_ttl: Duration,
    pub requests_per_minute: u32,
    pub retry: RetryPolicy,
    pub circuit: CircuitBreakerConfig,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://api.coingecko.com/api/v3"),
            quote: QuoteCurrency::usd(),
            api_key: None,
            timeout_ms: 5_000,
            cache_ttl: Duration::from_secs(30),
            requests_per_minute: 30,
            retry: RetryPolicy::default(),
            circuit: CircuitBreakerConfig::default(),
        }
    }
}

/// Spot price and daily history from a CoinGecko-compatible API.
pub struct CoinGeckoOracle {
    http_client: Arc<dyn HttpClient>,
    config: CoinGeckoConfig,
    circuit_breaker: CircuitBreaker,
    cache: ResponseCache,
    budget: RequestBudget,
}

#[derive(Debug, Deserialize)]
struct MarketChartPayload {
    prices: Vec<(f64, f64)>,
}

impl CoinGeckoOracle {
    pub fn new(config: CoinGeckoConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), config)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: CoinGeckoConfig) -> Self {
        Self {
            http_client,
            circuit_breaker: CircuitBreaker::new(UPSTREAM, config.circuit),
            cache: ResponseCache::new(config.cache_ttl),
            budget: RequestBudget::per_minute(config.requests_per_minute),
            config,
        }
    }

    pub fn config(&self) -> &CoinGeckoConfig {
        &self.config
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    fn simple_price_url(&self, asset: &AssetSymbol) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(asset.as_str()),
            self.config.quote
        )
    }

    fn market_chart_url(&self, asset: &AssetSymbol, days: usize) -> String {
        format!(
            "{}/coins/{}/market_chart?vs_currency={}&days={}&interval=daily",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(asset.as_str()),
            self.config.quote,
            days
        )
    }

    /// Fetches `url`, consulting the cache first and retrying per policy.
    async fn fetch_body(&self, url: &str, asset: &AssetSymbol) -> Result<String, OracleError> {
        if let Some(body) = self.cache.get(url).await {
            debug!(%asset, "served price response from cache");
            return Ok(body);
        }

        let retry = &self.config.retry;
        let mut attempt = 0_u32;
        loop {
            if !self.circuit_breaker.allow_request() {
                return Err(OracleError::unavailable(
                    "coingecko circuit breaker is open; skipping upstream call",
                ));
            }
            if !self.budget.try_acquire() {
                return Err(OracleError::rate_limited(format!(
                    "coingecko request budget of {} per minute exhausted",
                    self.budget.limit()
                )));
            }

            let mut request = HttpRequest::get(url).with_timeout_ms(self.config.timeout_ms);
            if let Some(key) = &self.config.api_key {
                request = request.with_header(API_KEY_HEADER, key.as_str());
            }

            let (error, retryable) = match self.http_client.execute(request).await {
                Ok(response) if response.is_success() => {
                    self.circuit_breaker.record_success();
                    self.cache.put(url, response.body.clone()).await;
                    return Ok(response.body);
                }
                Ok(response) if response.status == 404 => {
                    self.circuit_breaker.record_success();
                    return Err(OracleError::unknown_asset(asset));
                }
                Ok(response) => {
                    let retryable = retry.should_retry_status(response.status);
                    if retryable {
                        self.circuit_breaker.record_failure();
                    }
                    let message = format!("coingecko upstream returned status {}", response.status);
                    let error = if response.status == 429 {
                        OracleError::rate_limited(message)
                    } else {
                        OracleError::unavailable(message)
                    };
                    (error, retryable)
                }
                Err(error) => {
                    self.circuit_breaker.record_failure();
                    let retryable = error.retryable();
                    (
                        OracleError::unavailable(format!(
                            "coingecko transport error: {}",
                            error.message()
                        )),
                        retryable,
                    )
                }
            };

            if !retryable || attempt >= retry.max_retries {
                warn!(%asset, attempts = attempt + 1, error = %error, "price request failed");
                return Err(error);
            }

            let delay = retry.delay_for_attempt(attempt);
            debug!(%asset, attempt, delay_ms = delay.as_millis() as u64, "retrying price request");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl PriceOracle for CoinGeckoOracle {
    fn spot_price<'a>(&'a self, asset: &'a AssetSymbol) -> OracleFuture<'a, f64> {
        Box::pin(async move {
            let url = self.simple_price_url(asset);
            let body = self.fetch_body(&url, asset).await?;
            parse_simple_price(&body, asset, &self.config.quote)
        })
    }
}

impl PriceHistory for CoinGeckoOracle {
    fn daily_closes<'a>(
        &'a self,
        asset: &'a AssetSymbol,
        days: usize,
    ) -> OracleFuture<'a, Vec<f64>> {
        Box::pin(async move {
            let url = self.market_chart_url(asset, days);
            let body = self.fetch_body(&url, asset).await?;
            parse_market_chart(&body, asset, days)
        })
    }
}

fn parse_simple_price(
    body: &str,
    asset: &AssetSymbol,
    quote: &QuoteCurrency,
) -> Result<f64, OracleError> {
    let payload: serde_json::Value = serde_json::from_str(body)
        .map_err(|error| OracleError::malformed(format!("invalid price payload: {error}")))?;
    let by_asset = payload
        .as_object()
        .ok_or_else(|| OracleError::malformed("price payload is not a JSON object"))?;
    let entry = by_asset
        .get(asset.as_str())
        .ok_or_else(|| OracleError::unknown_asset(asset))?;

    entry.get(quote.as_str()).and_then(serde_json::Value::as_f64).ok_or_else(|| {
        OracleError::malformed(format!(
            "price payload for '{asset}' has no numeric '{quote}' field"
        ))
    })
}

fn parse_market_chart(body: &str, asset: &AssetSymbol, days: usize) -> Result<Vec<f64>, OracleError> {
    let payload: MarketChartPayload = serde_json::from_str(body)
        .map_err(|error| OracleError::malformed(format!("invalid market chart payload: {error}")))?;
    if payload.prices.is_empty() {
        return Err(OracleError::malformed(format!(
            "market chart for '{asset}' contained no prices"
        )));
    }

    let skip = payload.prices.len().saturating_sub(days);
    Ok(payload
        .prices
        .into_iter()
        .skip(skip)
        .map(|(_, price)| price)
        .collect())
}
