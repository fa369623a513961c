//! Runtime configuration. Every flag falls back to a `TRADEPILOT_*`
//! environment variable.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::info;

use tradepilot_core::predictor::DEFAULT_WINDOW;
use tradepilot_core::{
    AssetSymbol, CoinGeckoConfig, CoinGeckoOracle, CoreError, DenseNetwork, PriceHistory,
    PriceOracle, PricePredictor, QuoteCurrency, RetryPolicy, StaticPriceOracle, ValidationError,
    WindowedNetworkPredictor,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("static price '{entry}' must look like '<asset>=<positive price>'")]
    InvalidStaticPrice { entry: String },

    #[error("failed to load predictor weights: {0}")]
    Weights(#[from] CoreError),

    #[error("invalid log filter '{filter}': {message}")]
    LogFilter { filter: String, message: String },
}

/// Where spot prices come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OracleMode {
    /// CoinGecko-compatible REST API.
    Coingecko,
    /// In-memory price table, no network access.
    Static,
}

/// DCA ledger and trade-signal API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "tradepilot", version, about = "DCA ledger and trade-signal API server")]
pub struct ServerConfig {
    /// Address the HTTP server listens on.
    #[arg(long, env = "TRADEPILOT_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    #[arg(long, env = "TRADEPILOT_ORACLE", value_enum, default_value_t = OracleMode::Coingecko)]
    pub oracle: OracleMode,

    #[arg(
        long,
        env = "TRADEPILOT_COINGECKO_URL",
        default_value = "https://api.coingecko.com/api/v3"
    )]
    pub coingecko_url: String,

    /// Sent as the `x-cg-demo-api-key` header when set.
    #[arg(long, env = "TRADEPILOT_COINGECKO_API_KEY", hide_env_values = true)]
    pub coingecko_api_key: Option<String>,

    #[arg(long, env = "TRADEPILOT_QUOTE_CURRENCY", default_value = "usd")]
    pub quote_currency: String,

    #[arg(long, env = "TRADEPILOT_TIMEOUT_MS", default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// Seconds a price response stays cached; 0 disables caching.
    #[arg(long, env = "TRADEPILOT_CACHE_TTL_SECS", default_value_t = 30)]
    pub cache_ttl_secs: u64,

    #[arg(long, env = "TRADEPILOT_RATE_LIMIT_PER_MINUTE", default_value_t = 30)]
    pub rate_limit_per_minute: u32,

    #[arg(long, env = "TRADEPILOT_MAX_RETRIES", default_value_t = 2)]
    pub max_retries: u32,

    /// JSON weights file for the forecasting network.
    #[arg(long, env = "TRADEPILOT_PREDICTOR_WEIGHTS")]
    pub predictor_weights: Option<PathBuf>,

    /// Daily closes fed to the moving-average network when no weights file is given.
    #[arg(long, env = "TRADEPILOT_PREDICTION_WINDOW", default_value_t = DEFAULT_WINDOW)]
    pub prediction_window: usize,

    /// `asset=price` pairs for the static oracle, e.g. `bitcoin=64000`.
    #[arg(
        long = "static-price",
        env = "TRADEPILOT_STATIC_PRICES",
        value_delimiter = ','
    )]
    pub static_prices: Vec<String>,

    /// tracing-subscriber `EnvFilter` directive.
    #[arg(long, env = "TRADEPILOT_LOG", default_value = "info")]
    pub log_filter: String,
}

/// Oracle and predictor handed to every agent the server creates.
pub struct Collaborators {
    pub oracle: Arc<dyn PriceOracle>,
    pub predictor: Arc<dyn PricePredictor>,
}

impl ServerConfig {
    pub fn coingecko_config(&self) -> Result<CoinGeckoConfig, ConfigError> {
        Ok(CoinGeckoConfig {
            base_url: self.coingecko_url.clone(),
            quote: QuoteCurrency::parse(&self.quote_currency)?,
            api_key: self.coingecko_api_key.clone(),
            timeout_ms: self.timeout_ms,
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            requests_per_minute: self.rate_limit_per_minute,
            retry: RetryPolicy::exponential(self.max_retries),
            ..CoinGeckoConfig::default()
        })
    }

    pub fn static_oracle(&self) -> Result<StaticPriceOracle, ConfigError> {
        if self.static_prices.is_empty() {
            return Ok(StaticPriceOracle::demo());
        }

        let prices = self
            .static_prices
            .iter()
            .map(|entry| parse_static_price(entry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StaticPriceOracle::new(prices))
    }

    pub fn network(&self) -> Result<DenseNetwork, ConfigError> {
        match &self.predictor_weights {
            Some(path) => {
                let network = DenseNetwork::from_file(path)?;
                info!(
                    path = %path.display(),
                    window = network.input_width(),
                    layers = network.layers().len(),
                    "loaded predictor weights"
                );
                Ok(network)
            }
            None => Ok(DenseNetwork::moving_average(self.prediction_window)?),
        }
    }

    pub fn build_collaborators(&self) -> Result<Collaborators, ConfigError> {
        let network = self.network()?;
        match self.oracle {
            OracleMode::Coingecko => {
                let oracle = Arc::new(CoinGeckoOracle::new(self.coingecko_config()?));
                info!(base_url = %self.coingecko_url, "using coingecko price oracle");
                Ok(collaborators(oracle, network))
            }
            OracleMode::Static => {
                let oracle = Arc::new(self.static_oracle()?);
                info!(assets = oracle.assets().count(), "using static price oracle");
                Ok(collaborators(oracle, network))
            }
        }
    }
}

fn collaborators<S>(source: Arc<S>, network: DenseNetwork) -> Collaborators
where
    S: PriceOracle + PriceHistory + 'static,
{
    let predictor = WindowedNetworkPredictor::new(source.clone(), network);
    Collaborators {
        oracle: source,
        predictor: Arc::new(predictor),
    }
}

fn parse_static_price(entry: &str) -> Result<(AssetSymbol, f64), ConfigError> {
    let invalid = || ConfigError::InvalidStaticPrice {
        entry: entry.to_owned(),
    };
    let (asset, price) = entry.split_once('=').ok_or_else(invalid)?;
    let asset = AssetSymbol::parse(asset)?;
    let price: f64 = price.trim().parse().map_err(|_| invalid())?;
    if !price.is_finite() || price <= 0.0 {
        return Err(invalid());
    }
    Ok((asset, price))
}
